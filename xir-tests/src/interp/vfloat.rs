use xir_core::{Op, Opcode};

use super::{exec, pack_f32, pack_f64, unpack32, vec_binop, vec_unop};

fn unpack_f32(v: u128) -> [f32; 4] {
    unpack32(v).map(f32::from_bits)
}

fn unpack_f64(v: u128) -> [f64; 2] {
    [
        f64::from_bits(v as u64),
        f64::from_bits((v >> 64) as u64),
    ]
}

#[test]
fn elementwise_float_arithmetic() {
    let a = pack_f32([1.0, 2.5, -3.0, 0.5]);
    let b = pack_f32([2.0, 0.5, -1.0, 0.25]);
    assert_eq!(
        unpack_f32(vec_binop(Opcode::VFAdd, 16, 4, a, b)),
        [3.0, 3.0, -4.0, 0.75]
    );
    assert_eq!(
        unpack_f32(vec_binop(Opcode::VFSub, 16, 4, a, b)),
        [-1.0, 2.0, -2.0, 0.25]
    );
    assert_eq!(
        unpack_f32(vec_binop(Opcode::VFMul, 16, 4, a, b)),
        [2.0, 1.25, 3.0, 0.125]
    );
    assert_eq!(
        unpack_f32(vec_binop(Opcode::VFDiv, 16, 4, a, b)),
        [0.5, 5.0, 3.0, 2.0]
    );
}

#[test]
fn double_lanes() {
    let a = pack_f64([1.5, -2.0]);
    let b = pack_f64([0.5, 4.0]);
    assert_eq!(unpack_f64(vec_binop(Opcode::VFAdd, 16, 8, a, b)), [2.0, 2.0]);
    assert_eq!(
        unpack_f64(vec_binop(Opcode::VFDiv, 16, 8, a, b)),
        [3.0, -0.5]
    );
}

#[test]
fn vfaddp_pairwise() {
    let a = pack_f32([1.0, 2.0, 3.0, 4.0]);
    let b = pack_f32([10.0, 20.0, 30.0, 40.0]);
    assert_eq!(
        unpack_f32(vec_binop(Opcode::VFAddP, 16, 4, a, b)),
        [3.0, 7.0, 30.0, 70.0]
    );
}

#[test]
fn min_max_keep_first_operand_on_nan_in_second() {
    let a = pack_f32([1.0, f32::NAN, 5.0, -0.0]);
    let b = pack_f32([f32::NAN, 1.0, 2.0, 0.0]);

    let min = unpack_f32(vec_binop(Opcode::VFMin, 16, 4, a, b));
    // y < x is false against NaN, so the first operand survives;
    // a NaN first operand propagates.
    assert_eq!(min[0], 1.0);
    assert!(min[1].is_nan());
    assert_eq!(min[2], 2.0);

    let max = unpack_f32(vec_binop(Opcode::VFMax, 16, 4, a, b));
    assert_eq!(max[0], 1.0);
    assert!(max[1].is_nan());
    assert_eq!(max[2], 5.0);
}

#[test]
fn unary_float_kernels() {
    let a = pack_f32([4.0, 0.25, 1.0, 16.0]);
    assert_eq!(
        unpack_f32(vec_unop(Opcode::VFRecp, 16, 4, a)),
        [0.25, 4.0, 1.0, 0.0625]
    );
    assert_eq!(
        unpack_f32(vec_unop(Opcode::VFSqrt, 16, 4, a)),
        [2.0, 0.5, 1.0, 4.0]
    );
    assert_eq!(
        unpack_f32(vec_unop(Opcode::VFRSqrt, 16, 4, a)),
        [0.5, 2.0, 1.0, 0.25]
    );
    assert_eq!(
        unpack_f32(vec_unop(Opcode::VFNeg, 16, 4, a)),
        [-4.0, -0.25, -1.0, -16.0]
    );

    let d = pack_f64([9.0, -2.5]);
    assert_eq!(unpack_f64(vec_unop(Opcode::VFSqrt, 16, 8, pack_f64([9.0, 4.0]))), [3.0, 2.0]);
    assert_eq!(unpack_f64(vec_unop(Opcode::VFNeg, 16, 8, d)), [-9.0, 2.5]);
}

#[test]
fn vfcmpuno_flags_unordered_lanes() {
    let a = pack_f32([f32::NAN, 1.0, 1.0, 2.0]);
    let b = pack_f32([0.0, f32::NAN, 1.0, 2.0]);
    assert_eq!(
        unpack32(vec_binop(Opcode::VFCmpUno, 16, 4, a, b)),
        [0xFFFF_FFFF, 0xFFFF_FFFF, 0, 0]
    );
    assert_eq!(
        unpack32(vec_binop(Opcode::VFCmpOrd, 16, 4, a, b)),
        [0, 0, 0xFFFF_FFFF, 0xFFFF_FFFF]
    );
}

#[test]
fn float_compares_are_nan_aware() {
    let a = pack_f32([1.0, f32::NAN, 2.0, 1.0]);
    let b = pack_f32([1.0, 1.0, 1.0, 2.0]);

    // EQ is false for NaN, NEQ true.
    assert_eq!(
        unpack32(vec_binop(Opcode::VFCmpEq, 16, 4, a, b)),
        [0xFFFF_FFFF, 0, 0, 0]
    );
    assert_eq!(
        unpack32(vec_binop(Opcode::VFCmpNeq, 16, 4, a, b)),
        [0, 0xFFFF_FFFF, 0, 0]
    );
    assert_eq!(
        unpack32(vec_binop(Opcode::VFCmpLt, 16, 4, a, b)),
        [0, 0, 0, 0xFFFF_FFFF]
    );
    assert_eq!(
        unpack32(vec_binop(Opcode::VFCmpGt, 16, 4, a, b)),
        [0, 0, 0xFFFF_FFFF, 0]
    );
    assert_eq!(
        unpack32(vec_binop(Opcode::VFCmpLe, 16, 4, a, b)),
        [0xFFFF_FFFF, 0, 0, 0xFFFF_FFFF]
    );
}

#[test]
fn scalar_float_compare_passes_upper_lanes_through() {
    // OpSize == ElementSize: only the low lane is compared, the rest
    // comes from source 1.
    let a = pack_f32([1.0, 2.0, 3.0, 4.0]);
    let b = pack_f32([1.0, 9.0, 9.0, 9.0]);
    let out = exec(&[a, b], |ids| {
        Op::vector(Opcode::VFCmpEq, 4, 4, &[ids[0], ids[1]])
    });
    let lanes = unpack32(u128::from_le_bytes(out));
    assert_eq!(lanes[0], 0xFFFF_FFFF);
    assert_eq!(
        [lanes[1], lanes[2], lanes[3]],
        [(2.0f32).to_bits(), (3.0f32).to_bits(), (4.0f32).to_bits()]
    );

    let out = exec(&[a, b], |ids| {
        Op::vector(Opcode::VFCmpGt, 4, 4, &[ids[0], ids[1]])
    });
    assert_eq!(unpack32(u128::from_le_bytes(out))[0], 0);
}

#[test]
fn double_compares() {
    let a = pack_f64([1.0, f64::NAN]);
    let b = pack_f64([2.0, 1.0]);
    let r = vec_binop(Opcode::VFCmpLt, 16, 8, a, b);
    assert_eq!(r as u64, u64::MAX);
    assert_eq!((r >> 64) as u64, 0);

    let r = vec_binop(Opcode::VFCmpUno, 16, 8, a, b);
    assert_eq!(r as u64, 0);
    assert_eq!((r >> 64) as u64, u64::MAX);
}
