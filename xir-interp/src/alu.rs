//! Scalar integer, bit-manipulation and scalar-conversion kernels.
//!
//! Narrow results are written zero-extended through the 64-bit slot
//! write so downstream kernels that read a full 64-bit source (e.g.
//! `Popcount`) see zeros above the declared width.

use xir_core::{CondCode, FcmpFlags, NodeId, Op};

use crate::{ir_fatal, ExecData};

#[inline]
fn gd(data: &mut ExecData<'_>, node: NodeId, value: u64) {
    data.ssa.write_u64(node, value);
}

pub(crate) fn constant(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    gd(data, node, op.constant_value());
}

pub(crate) fn entrypoint_offset(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let mask = if op.size == 4 { 0xFFFF_FFFF } else { !0u64 };
    let value = data
        .current_entry
        .wrapping_add(op.entrypoint_offset() as u64);
    gd(data, node, value & mask);
}

pub(crate) fn cycle_counter(_op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: clock_gettime only writes the timespec we hand it.
    unsafe {
        libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts);
    }
    gd(data, node, ts.tv_nsec as u64 + ts.tv_sec as u64 * 1_000_000_000);
}

pub(crate) fn add(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        4 => gd(data, node, (a as u32).wrapping_add(b as u32) as u64),
        8 => gd(data, node, a.wrapping_add(b)),
        size => ir_fatal!("unknown add size: {size}"),
    }
}

pub(crate) fn sub(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        4 => gd(data, node, (a as u32).wrapping_sub(b as u32) as u64),
        8 => gd(data, node, a.wrapping_sub(b)),
        size => ir_fatal!("unknown sub size: {size}"),
    }
}

pub(crate) fn neg(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let src = data.ssa.read_u64(op.args[0]);
    match op.size {
        4 => gd(data, node, (src as u32).wrapping_neg() as u64),
        8 => gd(data, node, src.wrapping_neg()),
        size => ir_fatal!("unknown neg size: {size}"),
    }
}

pub(crate) fn mul(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        4 => {
            let r = (a as i32 as i64).wrapping_mul(b as i32 as i64);
            gd(data, node, r as u64);
        }
        8 => gd(data, node, (a as i64).wrapping_mul(b as i64) as u64),
        16 => {
            let r = (data.ssa.read_u128(op.args[0]) as i128)
                .wrapping_mul(data.ssa.read_u128(op.args[1]) as i128);
            data.ssa.write_u128(node, r as u128);
        }
        size => ir_fatal!("unknown mul size: {size}"),
    }
}

pub(crate) fn umul(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        4 => gd(data, node, (a as u32).wrapping_mul(b as u32) as u64),
        8 => gd(data, node, a.wrapping_mul(b)),
        16 => {
            let r = data
                .ssa
                .read_u128(op.args[0])
                .wrapping_mul(data.ssa.read_u128(op.args[1]));
            data.ssa.write_u128(node, r);
        }
        size => ir_fatal!("unknown umul size: {size}"),
    }
}

pub(crate) fn mulh(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        4 => {
            let r = (a as i32 as i64).wrapping_mul(b as i32 as i64);
            gd(data, node, (r >> 32) as u64);
        }
        8 => {
            let r = (a as i64 as i128).wrapping_mul(b as i64 as i128);
            gd(data, node, (r >> 64) as u64);
        }
        size => ir_fatal!("unknown mulh size: {size}"),
    }
}

/// Upper 128 bits of an unsigned 128x128 -> 256-bit multiply, by
/// 64-bit limb decomposition.
fn umulh128(a: u128, b: u128) -> u128 {
    let (a0, a1) = (a as u64 as u128, a >> 64);
    let (b0, b1) = (b as u64 as u128, b >> 64);

    let lo = a0 * b0;
    let mid1 = a1 * b0;
    let mid2 = a0 * b1;
    let carry = ((lo >> 64) + (mid1 as u64 as u128) + (mid2 as u64 as u128)) >> 64;

    a1 * b1 + (mid1 >> 64) + (mid2 >> 64) + carry
}

pub(crate) fn umulh(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        4 => gd(data, node, (a * b) >> 32),
        8 => {
            let r = (a as u128) * (b as u128);
            gd(data, node, (r >> 64) as u64);
        }
        16 => {
            let r = umulh128(
                data.ssa.read_u128(op.args[0]),
                data.ssa.read_u128(op.args[1]),
            );
            data.ssa.write_u128(node, r);
        }
        size => ir_fatal!("unknown umulh size: {size}"),
    }
}

// The division kernels require a non-zero divisor; the executor emits
// guard opcodes before guest division, so a zero here is an IR bug.

pub(crate) fn div(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        1 => gd(data, node, ((a as i8 as i64) / (b as i8 as i64)) as u64),
        2 => gd(data, node, ((a as i16 as i64) / (b as i16 as i64)) as u64),
        4 => gd(data, node, ((a as i32 as i64) / (b as i32 as i64)) as u64),
        8 => gd(data, node, ((a as i64) / (b as i64)) as u64),
        16 => {
            let r = (data.ssa.read_u128(op.args[0]) as i128)
                / (data.ssa.read_u128(op.args[1]) as i128);
            data.ssa.write_u128(node, r as u128);
        }
        size => ir_fatal!("unknown div size: {size}"),
    }
}

pub(crate) fn udiv(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        1 => gd(data, node, (a as u8 as u64) / (b as u8 as u64)),
        2 => gd(data, node, (a as u16 as u64) / (b as u16 as u64)),
        4 => gd(data, node, (a as u32 as u64) / (b as u32 as u64)),
        8 => gd(data, node, a / b),
        16 => {
            let r = data.ssa.read_u128(op.args[0]) / data.ssa.read_u128(op.args[1]);
            data.ssa.write_u128(node, r);
        }
        size => ir_fatal!("unknown udiv size: {size}"),
    }
}

pub(crate) fn rem(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        1 => gd(data, node, ((a as i8 as i64) % (b as i8 as i64)) as u64),
        2 => gd(data, node, ((a as i16 as i64) % (b as i16 as i64)) as u64),
        4 => gd(data, node, ((a as i32 as i64) % (b as i32 as i64)) as u64),
        8 => gd(data, node, ((a as i64) % (b as i64)) as u64),
        16 => {
            let r = (data.ssa.read_u128(op.args[0]) as i128)
                % (data.ssa.read_u128(op.args[1]) as i128);
            data.ssa.write_u128(node, r as u128);
        }
        size => ir_fatal!("unknown rem size: {size}"),
    }
}

pub(crate) fn urem(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        1 => gd(data, node, (a as u8 as u64) % (b as u8 as u64)),
        2 => gd(data, node, (a as u16 as u64) % (b as u16 as u64)),
        4 => gd(data, node, (a as u32 as u64) % (b as u32 as u64)),
        8 => gd(data, node, a % b),
        16 => {
            let r = data.ssa.read_u128(op.args[0]) % data.ssa.read_u128(op.args[1]);
            data.ssa.write_u128(node, r);
        }
        size => ir_fatal!("unknown urem size: {size}"),
    }
}

// Long division: sources 1 and 2 are the low and high halves of a
// double-width dividend, source 3 the divisor. Only the low OpSize
// bytes of the quotient/remainder are kept.

pub(crate) fn ldiv(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    match op.size {
        2 => {
            let lo = data.ssa.read_u16(op.args[0]);
            let hi = data.ssa.read_u16(op.args[1]);
            let divisor = data.ssa.read_u16(op.args[2]) as i16;
            let source = (((hi as u32) << 16) | lo as u32) as i32;
            gd(data, node, (source / divisor as i32) as i16 as u64);
        }
        4 => {
            let lo = data.ssa.read_u32(op.args[0]);
            let hi = data.ssa.read_u32(op.args[1]);
            let divisor = data.ssa.read_u32(op.args[2]) as i32;
            let source = (((hi as u64) << 32) | lo as u64) as i64;
            gd(data, node, (source / divisor as i64) as i32 as u64);
        }
        8 => {
            let lo = data.ssa.read_u64(op.args[0]);
            let hi = data.ssa.read_u64(op.args[1]);
            let divisor = data.ssa.read_u64(op.args[2]) as i64;
            let source = (((hi as u128) << 64) | lo as u128) as i128;
            gd(data, node, (source / divisor as i128) as u64);
        }
        size => ir_fatal!("unknown ldiv size: {size}"),
    }
}

pub(crate) fn ludiv(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    match op.size {
        2 => {
            let lo = data.ssa.read_u16(op.args[0]);
            let hi = data.ssa.read_u16(op.args[1]);
            let divisor = data.ssa.read_u16(op.args[2]);
            let source = ((hi as u32) << 16) | lo as u32;
            gd(data, node, (source / divisor as u32) as u16 as u64);
        }
        4 => {
            let lo = data.ssa.read_u32(op.args[0]);
            let hi = data.ssa.read_u32(op.args[1]);
            let divisor = data.ssa.read_u32(op.args[2]);
            let source = ((hi as u64) << 32) | lo as u64;
            gd(data, node, (source / divisor as u64) as u32 as u64);
        }
        8 => {
            let lo = data.ssa.read_u64(op.args[0]);
            let hi = data.ssa.read_u64(op.args[1]);
            let divisor = data.ssa.read_u64(op.args[2]);
            let source = ((hi as u128) << 64) | lo as u128;
            gd(data, node, (source / divisor as u128) as u64);
        }
        size => ir_fatal!("unknown ludiv size: {size}"),
    }
}

pub(crate) fn lrem(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    match op.size {
        2 => {
            let lo = data.ssa.read_u16(op.args[0]);
            let hi = data.ssa.read_u16(op.args[1]);
            let divisor = data.ssa.read_u16(op.args[2]) as i16;
            let source = (((hi as u32) << 16) | lo as u32) as i32;
            gd(data, node, (source % divisor as i32) as i16 as u64);
        }
        4 => {
            let lo = data.ssa.read_u32(op.args[0]);
            let hi = data.ssa.read_u32(op.args[1]);
            let divisor = data.ssa.read_u32(op.args[2]) as i32;
            let source = (((hi as u64) << 32) | lo as u64) as i64;
            gd(data, node, (source % divisor as i64) as i32 as u64);
        }
        8 => {
            let lo = data.ssa.read_u64(op.args[0]);
            let hi = data.ssa.read_u64(op.args[1]);
            let divisor = data.ssa.read_u64(op.args[2]) as i64;
            let source = (((hi as u128) << 64) | lo as u128) as i128;
            gd(data, node, (source % divisor as i128) as u64);
        }
        size => ir_fatal!("unknown lrem size: {size}"),
    }
}

pub(crate) fn lurem(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    match op.size {
        2 => {
            let lo = data.ssa.read_u16(op.args[0]);
            let hi = data.ssa.read_u16(op.args[1]);
            let divisor = data.ssa.read_u16(op.args[2]);
            let source = ((hi as u32) << 16) | lo as u32;
            gd(data, node, (source % divisor as u32) as u16 as u64);
        }
        4 => {
            let lo = data.ssa.read_u32(op.args[0]);
            let hi = data.ssa.read_u32(op.args[1]);
            let divisor = data.ssa.read_u32(op.args[2]);
            let source = ((hi as u64) << 32) | lo as u64;
            gd(data, node, (source % divisor as u64) as u32 as u64);
        }
        8 => {
            let lo = data.ssa.read_u64(op.args[0]);
            let hi = data.ssa.read_u64(op.args[1]);
            let divisor = data.ssa.read_u64(op.args[2]);
            let source = ((hi as u128) << 64) | lo as u128;
            gd(data, node, (source % divisor as u128) as u64);
        }
        size => ir_fatal!("unknown lurem size: {size}"),
    }
}

pub(crate) fn or(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    match op.size {
        1 | 2 | 4 | 8 => {
            let a = data.ssa.read_u64(op.args[0]);
            let b = data.ssa.read_u64(op.args[1]);
            gd(data, node, a | b);
        }
        16 => {
            let r = data.ssa.read_u128(op.args[0]) | data.ssa.read_u128(op.args[1]);
            data.ssa.write_u128(node, r);
        }
        size => ir_fatal!("unknown or size: {size}"),
    }
}

pub(crate) fn and(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        1 | 2 | 4 | 8 => gd(data, node, a & b),
        size => ir_fatal!("unknown and size: {size}"),
    }
}

pub(crate) fn andn(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        1 => gd(data, node, (a as u8 & !(b as u8)) as u64),
        2 => gd(data, node, (a as u16 & !(b as u16)) as u64),
        4 => gd(data, node, (a as u32 & !(b as u32)) as u64),
        8 => gd(data, node, a & !b),
        size => ir_fatal!("unknown andn size: {size}"),
    }
}

pub(crate) fn xor(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        1 | 2 | 4 | 8 => gd(data, node, a ^ b),
        size => ir_fatal!("unknown xor size: {size}"),
    }
}

pub(crate) fn not(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let src = data.ssa.read_u64(op.args[0]);
    // Mask the inversion to the operand width so the zero-extension
    // convention holds.
    let mask = match op.size {
        1 => 0xFF,
        2 => 0xFFFF,
        4 => 0xFFFF_FFFF,
        8 => !0u64,
        size => ir_fatal!("unknown not size: {size}"),
    };
    gd(data, node, !src & mask);
}

pub(crate) fn lshl(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    let mask = op.size as u64 * 8 - 1;
    match op.size {
        4 => gd(data, node, ((a as u32) << (b & mask)) as u64),
        8 => gd(data, node, a << (b & mask)),
        size => ir_fatal!("unknown lshl size: {size}"),
    }
}

pub(crate) fn lshr(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    let mask = op.size as u64 * 8 - 1;
    match op.size {
        4 => gd(data, node, ((a as u32) >> (b & mask)) as u64),
        8 => gd(data, node, a >> (b & mask)),
        size => ir_fatal!("unknown lshr size: {size}"),
    }
}

pub(crate) fn ashr(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    let mask = op.size as u64 * 8 - 1;
    match op.size {
        4 => gd(data, node, ((a as i32) >> (b & mask)) as u32 as u64),
        8 => gd(data, node, ((a as i64) >> (b & mask)) as u64),
        size => ir_fatal!("unknown ashr size: {size}"),
    }
}

pub(crate) fn ror(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    match op.size {
        4 => gd(data, node, (a as u32).rotate_right(b as u32 & 31) as u64),
        8 => gd(data, node, a.rotate_right(b as u32 & 63)),
        size => ir_fatal!("unknown ror size: {size}"),
    }
}

pub(crate) fn extr(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    let lsb = op.lsb() as u32;
    match op.size {
        4 => {
            let wide = ((a as u32 as u64) << 32) | b as u32 as u64;
            gd(data, node, (wide >> lsb) as u32 as u64);
        }
        8 => {
            let wide = ((a as u128) << 64) | b as u128;
            gd(data, node, (wide >> lsb) as u64);
        }
        size => ir_fatal!("unknown extr size: {size}"),
    }
}

pub(crate) fn bfi(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let (lsb, width) = op.bitfield();
    let source_mask = if width == 64 {
        !0u64
    } else {
        (1u64 << width) - 1
    };
    let dest_mask = !(source_mask << lsb);
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);
    gd(data, node, (a & dest_mask) | ((b & source_mask) << lsb));
}

pub(crate) fn bfe(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    assert!(op.size <= 8, "bfe size too large: {}", op.size);
    let (lsb, width) = op.bitfield();
    let mut source_mask = if width == 64 {
        !0u64
    } else {
        (1u64 << width) - 1
    };
    source_mask <<= lsb;
    let src = data.ssa.read_u64(op.args[0]);
    gd(data, node, (src & source_mask) >> lsb);
}

pub(crate) fn sbfe(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    assert!(op.size <= 8, "sbfe size too large: {}", op.size);
    let (lsb, width) = op.bitfield();
    let src = data.ssa.read_u64(op.args[0]) as i64;
    let shift_left = 64 - (width as u32 + lsb as u32);
    let shift_right = shift_left + lsb as u32;
    gd(data, node, ((src << shift_left) >> shift_right) as u64);
}

pub(crate) fn pdep(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    if op.size != 4 && op.size != 8 {
        ir_fatal!("unknown pdep size: {}", op.size);
    }
    let (input, mut mask) = if op.size == 4 {
        (
            data.ssa.read_u32(op.args[0]) as u64,
            data.ssa.read_u32(op.args[1]) as u64,
        )
    } else {
        (data.ssa.read_u64(op.args[0]), data.ssa.read_u64(op.args[1]))
    };

    let mut result = 0u64;
    let mut index = 0u32;
    while mask > 0 {
        let offset = mask.trailing_zeros();
        mask &= mask - 1;
        result |= ((input >> index) & 1) << offset;
        index += 1;
    }
    gd(data, node, result);
}

pub(crate) fn pext(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    if op.size != 4 && op.size != 8 {
        ir_fatal!("unknown pext size: {}", op.size);
    }
    let (input, mut mask) = if op.size == 4 {
        (
            data.ssa.read_u32(op.args[0]) as u64,
            data.ssa.read_u32(op.args[1]) as u64,
        )
    } else {
        (data.ssa.read_u64(op.args[0]), data.ssa.read_u64(op.args[1]))
    };

    let mut result = 0u64;
    let mut offset = 0u32;
    while mask > 0 {
        let index = mask.trailing_zeros();
        mask &= mask - 1;
        result |= ((input >> index) & 1) << offset;
        offset += 1;
    }
    gd(data, node, result);
}

pub(crate) fn popcount(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    // Counts the full 64-bit source regardless of OpSize; producers
    // zero-extend, so the upper bits contribute nothing.
    let src = data.ssa.read_u64(op.args[0]);
    gd(data, node, src.count_ones() as u64);
}

pub(crate) fn find_lsb(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let src = data.ssa.read_u64(op.args[0]);
    // Position of the lowest set bit, 1-based, minus one; zero input
    // therefore wraps to all-ones.
    let first_set = if src == 0 {
        0u64
    } else {
        src.trailing_zeros() as u64 + 1
    };
    gd(data, node, first_set.wrapping_sub(1));
}

pub(crate) fn find_msb(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let lz = match op.size {
        1 => data.ssa.read_u8(op.args[0]).leading_zeros(),
        2 => data.ssa.read_u16(op.args[0]).leading_zeros(),
        4 => data.ssa.read_u32(op.args[0]).leading_zeros(),
        8 => data.ssa.read_u64(op.args[0]).leading_zeros(),
        size => ir_fatal!("unknown findmsb size: {size}"),
    };
    let bits = op.size as u64 * 8;
    gd(data, node, bits.wrapping_sub(lz as u64).wrapping_sub(1));
}

pub(crate) fn find_trailing_zeros(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let tz = match op.size {
        1 => data.ssa.read_u8(op.args[0]).trailing_zeros(),
        2 => data.ssa.read_u16(op.args[0]).trailing_zeros(),
        4 => data.ssa.read_u32(op.args[0]).trailing_zeros(),
        8 => data.ssa.read_u64(op.args[0]).trailing_zeros(),
        size => ir_fatal!("unknown findtrailingzeros size: {size}"),
    };
    gd(data, node, tz as u64);
}

pub(crate) fn count_leading_zeroes(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let lz = match op.size {
        1 => data.ssa.read_u8(op.args[0]).leading_zeros(),
        2 => data.ssa.read_u16(op.args[0]).leading_zeros(),
        4 => data.ssa.read_u32(op.args[0]).leading_zeros(),
        8 => data.ssa.read_u64(op.args[0]).leading_zeros(),
        size => ir_fatal!("unknown countleadingzeroes size: {size}"),
    };
    gd(data, node, lz as u64);
}

pub(crate) fn rev(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    match op.size {
        2 => gd(data, node, data.ssa.read_u16(op.args[0]).swap_bytes() as u64),
        4 => gd(data, node, data.ssa.read_u32(op.args[0]).swap_bytes() as u64),
        8 => gd(data, node, data.ssa.read_u64(op.args[0]).swap_bytes()),
        size => ir_fatal!("unknown rev size: {size}"),
    }
}

fn condition_true_32(cond: CondCode, a: u64, b: u64) -> bool {
    let (ua, ub) = (a as u32, b as u32);
    let (sa, sb) = (ua as i32, ub as i32);
    let (fa, fb) = (f32::from_bits(ua), f32::from_bits(ub));
    let unordered = fa.is_nan() || fb.is_nan();
    match cond {
        CondCode::Eq => ua == ub,
        CondCode::Neq => ua != ub,
        CondCode::Uge => ua >= ub,
        CondCode::Ult => ua < ub,
        CondCode::Ugt => ua > ub,
        CondCode::Ule => ua <= ub,
        CondCode::Sge => sa >= sb,
        CondCode::Slt => sa < sb,
        CondCode::Sgt => sa > sb,
        CondCode::Sle => sa <= sb,
        CondCode::Flu => fa < fb || unordered,
        CondCode::Fge => fa >= fb,
        CondCode::Fleu => fa <= fb || unordered,
        CondCode::Fgt => fa > fb,
        CondCode::Fu => unordered,
        CondCode::Fnu => !unordered,
    }
}

fn condition_true_64(cond: CondCode, a: u64, b: u64) -> bool {
    let (sa, sb) = (a as i64, b as i64);
    let (fa, fb) = (f64::from_bits(a), f64::from_bits(b));
    let unordered = fa.is_nan() || fb.is_nan();
    match cond {
        CondCode::Eq => a == b,
        CondCode::Neq => a != b,
        CondCode::Uge => a >= b,
        CondCode::Ult => a < b,
        CondCode::Ugt => a > b,
        CondCode::Ule => a <= b,
        CondCode::Sge => sa >= sb,
        CondCode::Slt => sa < sb,
        CondCode::Sgt => sa > sb,
        CondCode::Sle => sa <= sb,
        CondCode::Flu => fa < fb || unordered,
        CondCode::Fge => fa >= fb,
        CondCode::Fleu => fa <= fb || unordered,
        CondCode::Fgt => fa > fb,
        CondCode::Fu => unordered,
        CondCode::Fnu => !unordered,
    }
}

pub(crate) fn select(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u64(op.args[0]);
    let b = data.ssa.read_u64(op.args[1]);

    let (arg_true, arg_false) = if op.size == 4 {
        (
            data.ssa.read_u32(op.args[2]) as u64,
            data.ssa.read_u32(op.args[3]) as u64,
        )
    } else {
        (data.ssa.read_u64(op.args[2]), data.ssa.read_u64(op.args[3]))
    };

    let (cond, compare_size) = op.compare();
    let taken = if compare_size == 4 {
        condition_true_32(cond, a, b)
    } else {
        condition_true_64(cond, a, b)
    };

    gd(data, node, if taken { arg_true } else { arg_false });
}

pub(crate) fn fcmp(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let requested = op.fcmp_flags();
    let (lt, eq, unordered) = if op.elem_size == 4 {
        let a = data.ssa.read_f32(op.args[0]);
        let b = data.ssa.read_f32(op.args[1]);
        (a < b, a == b, a.is_nan() || b.is_nan())
    } else {
        let a = data.ssa.read_f64(op.args[0]);
        let b = data.ssa.read_f64(op.args[1]);
        (a < b, a == b, a.is_nan() || b.is_nan())
    };

    // Unordered forces LT and EQ on wherever they were requested.
    let mut result = FcmpFlags::empty();
    if requested.contains(FcmpFlags::LT) && (unordered || lt) {
        result |= FcmpFlags::LT;
    }
    if requested.contains(FcmpFlags::UNORDERED) && unordered {
        result |= FcmpFlags::UNORDERED;
    }
    if requested.contains(FcmpFlags::EQ) && (unordered || eq) {
        result |= FcmpFlags::EQ;
    }
    gd(data, node, result.bits() as u64);
}

pub(crate) fn float_to_gpr_zs(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    match (op.size, op.float_src_size()) {
        (8, 4) => gd(data, node, data.ssa.read_f32(op.args[0]).trunc() as i64 as u64),
        (8, 8) => gd(data, node, data.ssa.read_f64(op.args[0]).trunc() as i64 as u64),
        (4, 4) => {
            let r = data.ssa.read_f32(op.args[0]).trunc() as i32;
            data.ssa.write_u32(node, r as u32);
        }
        (4, 8) => {
            let r = data.ssa.read_f64(op.args[0]).trunc() as i32;
            data.ssa.write_u32(node, r as u32);
        }
        (size, src) => ir_fatal!("unknown float->gpr conversion: {size} <- {src}"),
    }
}

pub(crate) fn float_to_gpr_s(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    match (op.size, op.float_src_size()) {
        (8, 4) => {
            let r = data.ssa.read_f32(op.args[0]).round_ties_even() as i64;
            gd(data, node, r as u64);
        }
        (8, 8) => {
            let r = data.ssa.read_f64(op.args[0]).round_ties_even() as i64;
            gd(data, node, r as u64);
        }
        (4, 4) => {
            let r = data.ssa.read_f32(op.args[0]).round_ties_even() as i32;
            data.ssa.write_u32(node, r as u32);
        }
        (4, 8) => {
            let r = data.ssa.read_f64(op.args[0]).round_ties_even() as i32;
            data.ssa.write_u32(node, r as u32);
        }
        (size, src) => ir_fatal!("unknown float->gpr conversion: {size} <- {src}"),
    }
}

pub(crate) fn trunc_element_pair(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    match op.size {
        4 => {
            let src = data.ssa.bytes(op.args[0]);
            let lane0 = u64::from_le_bytes(src[..8].try_into().unwrap());
            let lane1 = u64::from_le_bytes(src[8..].try_into().unwrap());
            gd(data, node, (lane0 & 0xFFFF_FFFF) | (lane1 << 32));
        }
        size => ir_fatal!("unhandled truncation size: {size}"),
    }
}

pub(crate) fn vextract_to_gpr(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    assert!(op.size <= 16, "vextracttogpr size too large: {}", op.size);
    let source_size = data.block.op_size(op.args[0]);
    let elem = op.elem_size as u32;
    let shift = elem * op.lane_index() as u32 * 8;
    let mask = if elem == 8 {
        !0u64 as u128
    } else {
        (1u128 << (elem * 8)) - 1
    };

    if source_size == 16 {
        let src = (data.ssa.read_u128(op.args[0]) >> shift) & mask;
        let bytes = src.to_le_bytes();
        data.ssa.write_slice(node, &bytes[..op.elem_size as usize]);
    } else {
        let src = (data.ssa.read_u64(op.args[0]) >> shift) & mask as u64;
        gd(data, node, src);
    }
}
