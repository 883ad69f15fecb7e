//! Packed SIMD kernels: elementwise integer and float arithmetic,
//! saturating forms, shifts, compares, widen/narrow conversions and
//! shuffles over 1/2/4/8-byte lanes of 8- or 16-byte registers.
//!
//! Each kernel is a size-directed selector over one generic lane loop;
//! the loop monomorphises per element type. Kernels assemble results
//! in a 16-byte scratch buffer and write the declared OpSize back.

use xir_core::{NodeId, Op, Opcode};

use crate::{ir_fatal, ExecData};

/// A lane type: fixed width, little-endian packed in the slot.
pub(crate) trait Lane: Copy {
    const BYTES: usize;
    const BITS: u32;
    fn load(raw: &[u8]) -> Self;
    fn store(self, raw: &mut [u8]);
}

macro_rules! impl_lane {
    ($($t:ty),* $(,)?) => {$(
        impl Lane for $t {
            const BYTES: usize = std::mem::size_of::<$t>();
            const BITS: u32 = (std::mem::size_of::<$t>() * 8) as u32;
            fn load(raw: &[u8]) -> Self {
                Self::from_le_bytes(raw[..Self::BYTES].try_into().unwrap())
            }
            fn store(self, raw: &mut [u8]) {
                raw[..Self::BYTES].copy_from_slice(&self.to_le_bytes());
            }
        }
    )*};
}

impl_lane!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

// Size-directed selectors. Each arm binds the element type and runs
// the monomorphised body; an unlisted element size is an IR bug.

macro_rules! for_uint_lanes {
    ($es:expr, $T:ident => $body:expr) => {
        match $es {
            1 => {
                type $T = u8;
                $body
            }
            2 => {
                type $T = u16;
                $body
            }
            4 => {
                type $T = u32;
                $body
            }
            8 => {
                type $T = u64;
                $body
            }
            es => ir_fatal!("unknown element size: {es}"),
        }
    };
}

macro_rules! for_sint_lanes {
    ($es:expr, $T:ident => $body:expr) => {
        match $es {
            1 => {
                type $T = i8;
                $body
            }
            2 => {
                type $T = i16;
                $body
            }
            4 => {
                type $T = i32;
                $body
            }
            8 => {
                type $T = i64;
                $body
            }
            es => ir_fatal!("unknown element size: {es}"),
        }
    };
}

// Signed element type paired with its unsigned twin, for shifts that
// take an unsigned count but sign-fill.
macro_rules! for_int_lane_pairs {
    ($es:expr, $S:ident, $U:ident => $body:expr) => {
        match $es {
            1 => {
                type $S = i8;
                type $U = u8;
                $body
            }
            2 => {
                type $S = i16;
                type $U = u16;
                $body
            }
            4 => {
                type $S = i32;
                type $U = u32;
                $body
            }
            8 => {
                type $S = i64;
                type $U = u64;
                $body
            }
            es => ir_fatal!("unknown element size: {es}"),
        }
    };
}

macro_rules! for_float_lanes {
    ($es:expr, $T:ident => $body:expr) => {
        match $es {
            4 => {
                type $T = f32;
                $body
            }
            8 => {
                type $T = f64;
                $body
            }
            es => ir_fatal!("unknown element size: {es}"),
        }
    };
}

// -- Generic lane loops --

fn map1<T: Lane>(out: &mut [u8; 16], a: &[u8; 16], lanes: usize, f: impl Fn(T) -> T) {
    for i in 0..lanes {
        let off = i * T::BYTES;
        f(T::load(&a[off..])).store(&mut out[off..]);
    }
}

fn map2<T: Lane>(
    out: &mut [u8; 16],
    a: &[u8; 16],
    b: &[u8; 16],
    lanes: usize,
    f: impl Fn(T, T) -> T,
) {
    for i in 0..lanes {
        let off = i * T::BYTES;
        f(T::load(&a[off..]), T::load(&b[off..])).store(&mut out[off..]);
    }
}

/// Elementwise shift: lane values from `a`, per-lane counts from `b`
/// read as the unsigned twin.
fn shift2<T: Lane, C: Lane>(
    out: &mut [u8; 16],
    a: &[u8; 16],
    b: &[u8; 16],
    lanes: usize,
    f: impl Fn(T, C) -> T,
) {
    for i in 0..lanes {
        let off = i * T::BYTES;
        f(T::load(&a[off..]), C::load(&b[off..])).store(&mut out[off..]);
    }
}

/// Compare producing a mask: all-ones lane on true, zero on false.
fn mask2<T: Lane>(
    out: &mut [u8; 16],
    a: &[u8; 16],
    b: &[u8; 16],
    lanes: usize,
    pred: impl Fn(T, T) -> bool,
) {
    for i in 0..lanes {
        let off = i * T::BYTES;
        let fill = if pred(T::load(&a[off..]), T::load(&b[off..])) {
            0xFF
        } else {
            0
        };
        out[off..off + T::BYTES].fill(fill);
    }
}

/// Pairwise combine: adjacent pairs of `a` fill the low half of the
/// destination, adjacent pairs of `b` the high half.
fn pairwise<T: Lane>(
    out: &mut [u8; 16],
    a: &[u8; 16],
    b: &[u8; 16],
    half: usize,
    f: impl Fn(T, T) -> T,
) {
    for i in 0..half {
        let x = T::load(&a[(2 * i) * T::BYTES..]);
        let y = T::load(&a[(2 * i + 1) * T::BYTES..]);
        f(x, y).store(&mut out[i * T::BYTES..]);

        let x = T::load(&b[(2 * i) * T::BYTES..]);
        let y = T::load(&b[(2 * i + 1) * T::BYTES..]);
        f(x, y).store(&mut out[(half + i) * T::BYTES..]);
    }
}

/// Horizontal reduction to a single lane.
fn reduce<T: Lane>(a: &[u8; 16], lanes: usize, init: T, f: impl Fn(T, T) -> T) -> T {
    let mut acc = init;
    for i in 0..lanes {
        acc = f(acc, T::load(&a[i * T::BYTES..]));
    }
    acc
}

/// Widen one source: `lanes` narrow elements (from the low or high
/// half) mapped to wide destination lanes.
fn widen1<N: Lane, W: Lane>(
    out: &mut [u8; 16],
    a: &[u8; 16],
    lanes: usize,
    top: bool,
    f: impl Fn(N) -> W,
) {
    let base = if top { lanes * N::BYTES } else { 0 };
    for i in 0..lanes {
        let x = N::load(&a[base + i * N::BYTES..]);
        f(x).store(&mut out[i * W::BYTES..]);
    }
}

/// Widen two sources elementwise, e.g. the widening multiplies.
fn widen2<N: Lane, W: Lane>(
    out: &mut [u8; 16],
    a: &[u8; 16],
    b: &[u8; 16],
    lanes: usize,
    top: bool,
    f: impl Fn(N, N) -> W,
) {
    let base = if top { lanes * N::BYTES } else { 0 };
    for i in 0..lanes {
        let x = N::load(&a[base + i * N::BYTES..]);
        let y = N::load(&b[base + i * N::BYTES..]);
        f(x, y).store(&mut out[i * W::BYTES..]);
    }
}

/// Narrow `lanes` wide elements of `src` into the destination starting
/// at `dst_base` bytes.
fn narrow1<W: Lane, N: Lane>(
    out: &mut [u8; 16],
    src: &[u8; 16],
    lanes: usize,
    dst_base: usize,
    f: impl Fn(W) -> N,
) {
    for i in 0..lanes {
        let x = W::load(&src[i * W::BYTES..]);
        f(x).store(&mut out[dst_base + i * N::BYTES..]);
    }
}

// -- Data movement --

pub(crate) fn vector_zero(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let out = [0u8; 16];
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vector_imm(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let imm = op.immediate();
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => {
        let v = imm as T;
        for i in 0..n {
            v.store(&mut out[i * T::BYTES..]);
        }
    });
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn splat_vector(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    assert!(op.size <= 16, "can't handle a vector of size {}", op.size);
    let elements = match op.opcode {
        Opcode::SplatVector2 => 2,
        Opcode::SplatVector4 => 4,
        opcode => ir_fatal!("unknown splat opcode: {opcode}"),
    };
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let es = op.size as usize / elements;
    for i in 0..elements {
        out[i * es..(i + 1) * es].copy_from_slice(&a[..es]);
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vmov(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    out[..op.size as usize].copy_from_slice(&a[..op.size as usize]);
    // Moves zero the rest of the register.
    data.ssa.write_slice(node, &out);
}

pub(crate) fn vbitcast(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    data.ssa.write_slice(node, &a);
}

// -- Bitwise, full 128-bit register --

pub(crate) fn vand(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let r = data.ssa.read_u128(op.args[0]) & data.ssa.read_u128(op.args[1]);
    data.ssa.write_u128(node, r);
}

pub(crate) fn vbic(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let r = data.ssa.read_u128(op.args[0]) & !data.ssa.read_u128(op.args[1]);
    data.ssa.write_u128(node, r);
}

pub(crate) fn vor(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let r = data.ssa.read_u128(op.args[0]) | data.ssa.read_u128(op.args[1]);
    data.ssa.write_u128(node, r);
}

pub(crate) fn vxor(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let r = data.ssa.read_u128(op.args[0]) ^ data.ssa.read_u128(op.args[1]);
    data.ssa.write_u128(node, r);
}

pub(crate) fn vnot(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let r = !data.ssa.read_u128(op.args[0]);
    data.ssa.write_u128(node, r);
}

pub(crate) fn vbsl(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let mask = data.ssa.read_u128(op.args[0]);
    let a = data.ssa.read_u128(op.args[1]);
    let b = data.ssa.read_u128(op.args[2]);
    data.ssa.write_u128(node, (a & mask) | (b & !mask));
}

// -- Integer arithmetic --

pub(crate) fn vadd(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.wrapping_add(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsub(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.wrapping_sub(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vumul(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.wrapping_mul(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsmul(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.wrapping_mul(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vuqadd(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.saturating_add(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vuqsub(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.saturating_sub(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsqadd(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.saturating_add(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsqsub(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.saturating_sub(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vumin(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.min(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsmin(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.min(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vumax(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.max(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsmax(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x.max(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vuravg(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    match op.elem_size {
        1 => map2::<u8>(&mut out, &a, &b, n, |x, y| {
            ((x as u16 + y as u16 + 1) >> 1) as u8
        }),
        2 => map2::<u16>(&mut out, &a, &b, n, |x, y| {
            ((x as u32 + y as u32 + 1) >> 1) as u16
        }),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vneg(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => map1::<T>(&mut out, &a, n, |x| x.wrapping_neg()));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vabs(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => map1::<T>(&mut out, &a, n, |x| x.wrapping_abs()));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vpopcount(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => map1::<T>(&mut out, &a, n, |x| x.count_ones() as T));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vaddp(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let half = op.lanes() / 2;
    for_uint_lanes!(op.elem_size, T => pairwise::<T>(&mut out, &a, &b, half, |x, y| x.wrapping_add(y)));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vaddv(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => {
        let r = reduce::<T>(&a, n, 0, |acc, x| acc.wrapping_add(x));
        r.store(&mut out[..]);
    });
    data.ssa.write_slice(node, &out[..op.elem_size as usize]);
}

pub(crate) fn vuminv(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => {
        let r = reduce::<T>(&a, n, T::MAX, |acc, x| acc.min(x));
        r.store(&mut out[..]);
    });
    data.ssa.write_slice(node, &out[..op.elem_size as usize]);
}

// -- Widening multiplies and absolute difference --

pub(crate) fn vumull(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vumull_impl(op, data, node, false);
}

pub(crate) fn vumull2(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vumull_impl(op, data, node, true);
}

fn vumull_impl(op: &Op, data: &mut ExecData<'_>, node: NodeId, top: bool) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    match op.elem_size {
        2 => widen2::<u8, u16>(&mut out, &a, &b, n, top, |x, y| x as u16 * y as u16),
        4 => widen2::<u16, u32>(&mut out, &a, &b, n, top, |x, y| x as u32 * y as u32),
        8 => widen2::<u32, u64>(&mut out, &a, &b, n, top, |x, y| x as u64 * y as u64),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsmull(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vsmull_impl(op, data, node, false);
}

pub(crate) fn vsmull2(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vsmull_impl(op, data, node, true);
}

fn vsmull_impl(op: &Op, data: &mut ExecData<'_>, node: NodeId, top: bool) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    match op.elem_size {
        2 => widen2::<i8, i16>(&mut out, &a, &b, n, top, |x, y| x as i16 * y as i16),
        4 => widen2::<i16, i32>(&mut out, &a, &b, n, top, |x, y| x as i32 * y as i32),
        8 => widen2::<i32, i64>(&mut out, &a, &b, n, top, |x, y| x as i64 * y as i64),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vuabdl(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    match op.elem_size {
        2 => widen2::<u8, u16>(&mut out, &a, &b, n, false, |x, y| {
            (x as i16 - y as i16).unsigned_abs()
        }),
        4 => widen2::<u16, u32>(&mut out, &a, &b, n, false, |x, y| {
            (x as i32 - y as i32).unsigned_abs()
        }),
        8 => widen2::<u32, u64>(&mut out, &a, &b, n, false, |x, y| {
            (x as i64 - y as i64).unsigned_abs()
        }),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

// -- Shifts --

pub(crate) fn vushl(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => {
        map2::<T>(&mut out, &a, &b, n, |x, c| {
            if c as u64 >= T::BITS as u64 { 0 } else { x << c }
        })
    });
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vushr(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => {
        map2::<T>(&mut out, &a, &b, n, |x, c| {
            if c as u64 >= T::BITS as u64 { 0 } else { x >> c }
        })
    });
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsshr(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_int_lane_pairs!(op.elem_size, S, U => {
        shift2::<S, U>(&mut out, &a, &b, n, |x, c| {
            if c as u64 >= S::BITS as u64 {
                x >> (S::BITS - 1)
            } else {
                x >> c
            }
        })
    });
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vushls(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    match op.elem_size {
        16 => {
            let x = u128::from_le_bytes(a);
            let c = u128::from_le_bytes(b);
            let r = if c >= 128 { 0 } else { x << c };
            out = r.to_le_bytes();
        }
        es => {
            let n = op.lanes();
            for_uint_lanes!(es, T => {
                let c = T::load(&b[..]) as u64;
                map1::<T>(&mut out, &a, n, |x| {
                    if c >= T::BITS as u64 { 0 } else { x << c }
                });
            });
        }
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vushrs(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    match op.elem_size {
        16 => {
            let x = u128::from_le_bytes(a);
            let c = u128::from_le_bytes(b);
            let r = if c >= 128 { 0 } else { x >> c };
            out = r.to_le_bytes();
        }
        es => {
            let n = op.lanes();
            for_uint_lanes!(es, T => {
                let c = T::load(&b[..]) as u64;
                map1::<T>(&mut out, &a, n, |x| {
                    if c >= T::BITS as u64 { 0 } else { x >> c }
                });
            });
        }
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsshrs(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    match op.elem_size {
        16 => {
            let x = i128::from_le_bytes(a);
            let c = u128::from_le_bytes(b);
            let r = if c >= 128 { x >> 127 } else { x >> c };
            out = r.to_le_bytes();
        }
        es => {
            let n = op.lanes();
            for_int_lane_pairs!(es, S, U => {
                let c = <U as Lane>::load(&b[..]) as u64;
                map1::<S>(&mut out, &a, n, |x| {
                    if c >= S::BITS as u64 {
                        x >> (S::BITS - 1)
                    } else {
                        x >> c
                    }
                });
            });
        }
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vshli(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    let shift = op.bit_shift() as u32;
    for_uint_lanes!(op.elem_size, T => {
        map1::<T>(&mut out, &a, n, |x| if shift >= T::BITS { 0 } else { x << shift })
    });
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vushri(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    let shift = op.bit_shift() as u32;
    for_uint_lanes!(op.elem_size, T => {
        map1::<T>(&mut out, &a, n, |x| if shift >= T::BITS { 0 } else { x >> shift })
    });
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsshri(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    let shift = op.bit_shift() as u32;
    for_sint_lanes!(op.elem_size, T => {
        map1::<T>(&mut out, &a, n, |x| {
            if shift >= T::BITS {
                x >> (T::BITS - 1)
            } else {
                x >> shift
            }
        })
    });
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsli(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u128(op.args[0]);
    let shift = op.byte_shift() as u32;
    let r = if shift >= 16 { 0 } else { a << (shift * 8) };
    data.ssa.write_u128(node, r);
}

pub(crate) fn vsri(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = data.ssa.read_u128(op.args[0]);
    let shift = op.byte_shift() as u32;
    let r = if shift >= 16 { 0 } else { a >> (shift * 8) };
    data.ssa.write_u128(node, r);
}

pub(crate) fn vushrni(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.size as usize / (op.elem_size as usize * 2);
    let shift = op.bit_shift() as u32;
    match op.elem_size {
        1 => narrow1::<u16, u8>(&mut out, &a, n, 0, |x| {
            (if shift >= 16 { 0 } else { x >> shift }) as u8
        }),
        2 => narrow1::<u32, u16>(&mut out, &a, n, 0, |x| {
            (if shift >= 32 { 0 } else { x >> shift }) as u16
        }),
        4 => narrow1::<u64, u32>(&mut out, &a, n, 0, |x| {
            (if shift >= 64 { 0 } else { x >> shift }) as u32
        }),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vushrni2(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let half = op.size as usize / 2;
    let n = op.size as usize / (op.elem_size as usize * 2);
    let shift = op.bit_shift() as u32;
    // Lower half is carried through from source 1.
    out[..half].copy_from_slice(&a[..half]);
    match op.elem_size {
        1 => narrow1::<u16, u8>(&mut out, &b, n, half, |x| {
            (if shift >= 16 { 0 } else { x >> shift }) as u8
        }),
        2 => narrow1::<u32, u16>(&mut out, &b, n, half, |x| {
            (if shift >= 32 { 0 } else { x >> shift }) as u16
        }),
        4 => narrow1::<u64, u32>(&mut out, &b, n, half, |x| {
            (if shift >= 64 { 0 } else { x >> shift }) as u32
        }),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

// -- Integer compares --

pub(crate) fn vcmpeq(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => mask2::<T>(&mut out, &a, &b, n, |x, y| x == y));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vcmpeqz(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let zero = [0u8; 16];
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_uint_lanes!(op.elem_size, T => mask2::<T>(&mut out, &a, &zero, n, |x, y| x == y));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vcmpgt(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => mask2::<T>(&mut out, &a, &b, n, |x, y| x > y));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vcmpgtz(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let zero = [0u8; 16];
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => mask2::<T>(&mut out, &a, &zero, n, |x, y| x > y));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vcmpltz(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let zero = [0u8; 16];
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_sint_lanes!(op.elem_size, T => mask2::<T>(&mut out, &a, &zero, n, |x, y| x < y));
    data.ssa.write_sized(node, &out, op.size);
}

// -- Float compares --

/// Shared float-compare body. When OpSize equals ElementSize this is a
/// scalar compare: only the low lane is computed, the rest of the
/// register passes through from source 1.
fn float_mask(
    op: &Op,
    data: &mut ExecData<'_>,
    node: NodeId,
    p32: impl Fn(f32, f32) -> bool,
    p64: impl Fn(f64, f64) -> bool,
) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let scalar = op.elem_size == op.size;
    let n = if scalar {
        out = a;
        1
    } else {
        op.lanes()
    };
    match op.elem_size {
        4 => mask2::<f32>(&mut out, &a, &b, n, p32),
        8 => mask2::<f64>(&mut out, &a, &b, n, p64),
        es => ir_fatal!("unknown element size: {es}"),
    }
    if scalar {
        data.ssa.write_slice(node, &out);
    } else {
        data.ssa.write_sized(node, &out, op.size);
    }
}

pub(crate) fn vfcmpeq(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    float_mask(op, data, node, |x, y| x == y, |x, y| x == y);
}

pub(crate) fn vfcmpneq(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    float_mask(op, data, node, |x, y| x != y, |x, y| x != y);
}

pub(crate) fn vfcmplt(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    float_mask(op, data, node, |x, y| x < y, |x, y| x < y);
}

pub(crate) fn vfcmpgt(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    float_mask(op, data, node, |x, y| x > y, |x, y| x > y);
}

pub(crate) fn vfcmple(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    float_mask(op, data, node, |x, y| x <= y, |x, y| x <= y);
}

pub(crate) fn vfcmpord(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    float_mask(
        op,
        data,
        node,
        |x, y| !x.is_nan() && !y.is_nan(),
        |x, y| !x.is_nan() && !y.is_nan(),
    );
}

pub(crate) fn vfcmpuno(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    float_mask(
        op,
        data,
        node,
        |x, y| x.is_nan() || y.is_nan(),
        |x, y| x.is_nan() || y.is_nan(),
    );
}

// -- Float arithmetic --

pub(crate) fn vfadd(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x + y));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vfaddp(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let half = op.lanes() / 2;
    for_float_lanes!(op.elem_size, T => pairwise::<T>(&mut out, &a, &b, half, |x, y| x + y));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vfsub(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x - y));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vfmul(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x * y));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vfdiv(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => map2::<T>(&mut out, &a, &b, n, |x, y| x / y));
    data.ssa.write_sized(node, &out, op.size);
}

// Min/max keep the first operand on ties and on NaN in the second
// operand; a NaN first operand propagates.

pub(crate) fn vfmin(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => {
        map2::<T>(&mut out, &a, &b, n, |x, y| if y < x { y } else { x })
    });
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vfmax(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => {
        map2::<T>(&mut out, &a, &b, n, |x, y| if x < y { y } else { x })
    });
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vfrecp(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => map1::<T>(&mut out, &a, n, |x| 1.0 / x));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vfsqrt(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => map1::<T>(&mut out, &a, n, |x| x.sqrt()));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vfrsqrt(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => map1::<T>(&mut out, &a, n, |x| 1.0 / x.sqrt()));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vfneg(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    for_float_lanes!(op.elem_size, T => map1::<T>(&mut out, &a, n, |x| -x));
    data.ssa.write_sized(node, &out, op.size);
}

// -- Widen / narrow conversions --

pub(crate) fn vsxtl(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vsxtl_impl(op, data, node, false);
}

pub(crate) fn vsxtl2(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vsxtl_impl(op, data, node, true);
}

fn vsxtl_impl(op: &Op, data: &mut ExecData<'_>, node: NodeId, top: bool) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    match op.elem_size {
        2 => widen1::<i8, i16>(&mut out, &a, n, top, |x| x as i16),
        4 => widen1::<i16, i32>(&mut out, &a, n, top, |x| x as i32),
        8 => widen1::<i32, i64>(&mut out, &a, n, top, |x| x as i64),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vuxtl(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vuxtl_impl(op, data, node, false);
}

pub(crate) fn vuxtl2(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vuxtl_impl(op, data, node, true);
}

fn vuxtl_impl(op: &Op, data: &mut ExecData<'_>, node: NodeId, top: bool) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.lanes();
    match op.elem_size {
        2 => widen1::<u8, u16>(&mut out, &a, n, top, |x| x as u16),
        4 => widen1::<u16, u32>(&mut out, &a, n, top, |x| x as u32),
        8 => widen1::<u32, u64>(&mut out, &a, n, top, |x| x as u64),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsqxtn(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.size as usize / (op.elem_size as usize * 2);
    match op.elem_size {
        1 => narrow1::<i16, i8>(&mut out, &a, n, 0, |x| {
            x.clamp(i8::MIN as i16, i8::MAX as i16) as i8
        }),
        2 => narrow1::<i32, i16>(&mut out, &a, n, 0, |x| {
            x.clamp(i16::MIN as i32, i16::MAX as i32) as i16
        }),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsqxtn2(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let half = op.size as usize / 2;
    let n = op.size as usize / (op.elem_size as usize * 2);
    out[..half].copy_from_slice(&a[..half]);
    match op.elem_size {
        1 => narrow1::<i16, i8>(&mut out, &b, n, half, |x| {
            x.clamp(i8::MIN as i16, i8::MAX as i16) as i8
        }),
        2 => narrow1::<i32, i16>(&mut out, &b, n, half, |x| {
            x.clamp(i16::MIN as i32, i16::MAX as i32) as i16
        }),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsqxtun(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let n = op.size as usize / (op.elem_size as usize * 2);
    match op.elem_size {
        1 => narrow1::<i16, u8>(&mut out, &a, n, 0, |x| x.clamp(0, 0xFF) as u8),
        2 => narrow1::<i32, u16>(&mut out, &a, n, 0, |x| x.clamp(0, 0xFFFF) as u16),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vsqxtun2(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let half = op.size as usize / 2;
    let n = op.size as usize / (op.elem_size as usize * 2);
    out[..half].copy_from_slice(&a[..half]);
    match op.elem_size {
        1 => narrow1::<i16, u8>(&mut out, &b, n, half, |x| x.clamp(0, 0xFF) as u8),
        2 => narrow1::<i32, u16>(&mut out, &b, n, half, |x| x.clamp(0, 0xFFFF) as u16),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

// -- Shuffles --

fn zip_lanes<T: Lane>(out: &mut [u8; 16], a: &[u8; 16], b: &[u8; 16], half: usize, base: usize) {
    for i in 0..half {
        T::load(&a[(base + i) * T::BYTES..]).store(&mut out[(2 * i) * T::BYTES..]);
        T::load(&b[(base + i) * T::BYTES..]).store(&mut out[(2 * i + 1) * T::BYTES..]);
    }
}

fn unzip_lanes<T: Lane>(out: &mut [u8; 16], a: &[u8; 16], b: &[u8; 16], half: usize, start: usize) {
    for i in 0..half {
        T::load(&a[(start + 2 * i) * T::BYTES..]).store(&mut out[i * T::BYTES..]);
        T::load(&b[(start + 2 * i) * T::BYTES..]).store(&mut out[(half + i) * T::BYTES..]);
    }
}

pub(crate) fn vzip(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vzip_impl(op, data, node, false);
}

pub(crate) fn vzip2(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vzip_impl(op, data, node, true);
}

fn vzip_impl(op: &Op, data: &mut ExecData<'_>, node: NodeId, high: bool) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let half = op.lanes() / 2;
    let base = if high { half } else { 0 };
    for_uint_lanes!(op.elem_size, T => zip_lanes::<T>(&mut out, &a, &b, half, base));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vunzip(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vunzip_impl(op, data, node, 0);
}

pub(crate) fn vunzip2(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    vunzip_impl(op, data, node, 1);
}

fn vunzip_impl(op: &Op, data: &mut ExecData<'_>, node: NodeId, start: usize) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let half = op.lanes() / 2;
    for_uint_lanes!(op.elem_size, T => unzip_lanes::<T>(&mut out, &a, &b, half, start));
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vextr(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let s1 = data.ssa.read_u128(op.args[0]);
    let s2 = data.ssa.read_u128(op.args[1]);
    let op_bits = op.size as u32 * 8;
    let mut offset = op.lane_index() as u32 * op.elem_size as u32 * 8;

    let result = if offset >= op_bits {
        offset -= op_bits;
        if offset == 0 {
            s1
        } else if offset >= 128 {
            0
        } else {
            s1 >> offset
        }
    } else if offset == 0 {
        s2
    } else {
        (s1 << (op_bits - offset)) | (s2 >> offset)
    };

    let bytes = result.to_le_bytes();
    data.ssa.write_sized(node, &bytes, op.size);
}

pub(crate) fn vtbl1(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let table = *data.ssa.bytes(op.args[0]);
    let indices = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let size = op.size as usize;
    for i in 0..size {
        let index = indices[i] as usize;
        out[i] = if index >= size { 0 } else { table[index] };
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vrev64(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    // The working width is always a 64-bit chunk; ElementSize selects
    // the swap granularity within it.
    let n = op.size as usize / 8;
    match op.elem_size {
        1 => map1::<u64>(&mut out, &a, n, |x| x.swap_bytes()),
        2 => map1::<u64>(&mut out, &a, n, |x| {
            (x >> 48)
                | ((x >> 16) & 0xFFFF_0000)
                | ((x << 16) & 0xFFFF_0000_0000)
                | (x << 48)
        }),
        4 => map1::<u64>(&mut out, &a, n, |x| (x >> 32) | (x << 32)),
        es => ir_fatal!("unknown element size: {es}"),
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vdup_element(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    assert!(op.size <= 16, "vdupelement size too large: {}", op.size);
    let a = *data.ssa.bytes(op.args[0]);
    let mut out = [0u8; 16];
    let es = op.elem_size as usize;
    let index = op.lane_index() as usize;
    let lane = &a[index * es..(index + 1) * es];
    for i in 0..op.lanes() {
        out[i * es..(i + 1) * es].copy_from_slice(lane);
    }
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vextract_element(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    assert!(op.size <= 16, "vextractelement size too large: {}", op.size);
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
        data.ssa.write_u64(node, src);
    }
}

pub(crate) fn vins_element(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let size = op.size as usize;
    let es = op.elem_size as usize;
    let (dest, src) = op.insert_lanes();
    out[..size].copy_from_slice(&a[..size]);
    out[dest as usize * es..(dest as usize + 1) * es]
        .copy_from_slice(&b[src as usize * es..(src as usize + 1) * es]);
    data.ssa.write_sized(node, &out, op.size);
}

pub(crate) fn vins_scalar_element(op: &Op, data: &mut ExecData<'_>, node: NodeId) {
    let a = *data.ssa.bytes(op.args[0]);
    let b = *data.ssa.bytes(op.args[1]);
    let mut out = [0u8; 16];
    let size = op.size as usize;
    let es = op.elem_size as usize;
    let (dest, _) = op.insert_lanes();
    out[..size].copy_from_slice(&a[..size]);
    out[dest as usize * es..(dest as usize + 1) * es].copy_from_slice(&b[..es]);
    data.ssa.write_sized(node, &out, op.size);
}
