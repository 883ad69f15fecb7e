use xir_core::{Op, Opcode, Payload};

use super::{exec, exec_sized, pack16, pack32, pack64, unpack16, unpack32, vec_unop};

fn to_gpr(opcode: Opcode, size: u8, src_size: u8, bits: u64) -> u64 {
    let out = exec(&[bits as u128], |ids| {
        Op::new(opcode, size, 0, ids, Payload::FloatSource { src_size })
    });
    u64::from_le_bytes(out[..8].try_into().unwrap())
}

#[test]
fn float_to_gpr_truncates_toward_zero() {
    assert_eq!(to_gpr(Opcode::FloatToGprZS, 4, 4, (1.9f32).to_bits() as u64), 1);
    assert_eq!(
        to_gpr(Opcode::FloatToGprZS, 4, 4, (-1.9f32).to_bits() as u64) as u32,
        (-1i32) as u32
    );
    assert_eq!(
        to_gpr(Opcode::FloatToGprZS, 8, 8, (2.0e10f64).to_bits()),
        20_000_000_000
    );
    assert_eq!(
        to_gpr(Opcode::FloatToGprZS, 4, 8, (-7.5f64).to_bits()) as u32,
        (-7i32) as u32
    );
}

#[test]
fn float_to_gpr_rounds_to_nearest_even() {
    assert_eq!(to_gpr(Opcode::FloatToGprS, 4, 4, (2.5f32).to_bits() as u64), 2);
    assert_eq!(to_gpr(Opcode::FloatToGprS, 4, 4, (3.5f32).to_bits() as u64), 4);
    assert_eq!(
        to_gpr(Opcode::FloatToGprS, 8, 8, (-2.5f64).to_bits()),
        (-2i64) as u64
    );
}

#[test]
fn trunc_element_pair_packs_two_low_words() {
    let src = pack64([0xAAAA_BBBB_1111_2222, 0xCCCC_DDDD_3333_4444]);
    let out = exec(&[src], |ids| Op::scalar(Opcode::TruncElementPair, 4, &[ids[0]]));
    assert_eq!(
        u64::from_le_bytes(out[..8].try_into().unwrap()),
        0x3333_4444_1111_2222
    );
}

#[test]
fn vextract_to_gpr_by_source_width() {
    // 16-byte source: lane 5 of eight 16-bit lanes.
    let src = pack16([0, 1, 2, 3, 4, 0xBEEF, 6, 7]);
    let out = exec_sized(&[(src, 16)], |ids| {
        Op::new(
            Opcode::VExtractToGpr,
            8,
            2,
            &[ids[0]],
            Payload::Lane { index: 5 },
        )
    });
    assert_eq!(u16::from_le_bytes(out[..2].try_into().unwrap()), 0xBEEF);

    // 8-byte source: lane 1 of two 32-bit lanes.
    let out = exec_sized(&[(0x1122_3344_5566_7788, 8)], |ids| {
        Op::new(
            Opcode::VExtractToGpr,
            8,
            4,
            &[ids[0]],
            Payload::Lane { index: 1 },
        )
    });
    assert_eq!(
        u64::from_le_bytes(out[..8].try_into().unwrap()),
        0x1122_3344
    );
}

#[test]
fn vsxtl_widens_the_low_half_signed() {
    // Four i16 lanes from the low half, sign-extended to i32.
    let src = pack16([1, 0x8000, 0x7FFF, 0xFFFF, 9, 9, 9, 9]);
    let out = vec_unop(Opcode::VSxtl, 16, 4, src);
    assert_eq!(unpack32(out), [1, 0xFFFF_8000, 0x7FFF, (-1i32) as u32]);
}

#[test]
fn vsxtl2_takes_the_upper_half() {
    let src = pack16([9, 9, 9, 9, 2, 0xFFFE, 3, 0x8001]);
    let out = vec_unop(Opcode::VSxtl2, 16, 4, src);
    assert_eq!(unpack32(out), [2, (-2i32) as u32, 3, 0xFFFF_8001]);
}

#[test]
fn vuxtl_widens_zero_extended() {
    let src = pack16([0xFFFF, 1, 0x8000, 2, 9, 9, 9, 9]);
    let out = vec_unop(Opcode::VUxtl, 16, 4, src);
    assert_eq!(unpack32(out), [0xFFFF, 1, 0x8000, 2]);

    let src2 = pack16([9, 9, 9, 9, 0xFFFF, 0, 1, 2]);
    let out2 = vec_unop(Opcode::VUxtl2, 16, 4, src2);
    assert_eq!(unpack32(out2), [0xFFFF, 0, 1, 2]);
}

#[test]
fn vsqxtn_saturates_to_the_narrow_signed_range() {
    // Eight i16 lanes narrow to i8 with saturation; upper half zero.
    let src = pack16([
        200,
        (-200i16) as u16,
        127,
        (-128i16) as u16,
        1,
        0x7FFF,
        0x8000,
        0,
    ]);
    let out = vec_unop(Opcode::VSQXtn, 16, 1, src);
    let bytes = out.to_le_bytes();
    assert_eq!(
        &bytes[..8],
        &[
            127,
            (-128i8) as u8,
            127,
            (-128i8) as u8,
            1,
            127,
            (-128i8) as u8,
            0
        ]
    );
    assert_eq!(&bytes[8..], &[0; 8]);
}

#[test]
fn vsqxtn2_preserves_the_lower_half_from_source1() {
    let low = 0x1111_2222_3333_4444_5555_6666_7777_8888u128;
    let wide = pack16([300, (-300i16) as u16, 5, 6, 7, 8, 9, 10]);
    let out = exec(&[low, wide], |ids| {
        Op::vector(Opcode::VSQXtn2, 16, 1, &[ids[0], ids[1]])
    });
    let bytes = u128::from_le_bytes(out).to_le_bytes();
    assert_eq!(&bytes[..8], &low.to_le_bytes()[..8]);
    assert_eq!(
        &bytes[8..],
        &[127, (-128i8) as u8, 5, 6, 7, 8, 9, 10]
    );
}

#[test]
fn vsqxtun_clamps_negative_to_zero() {
    // Signed wide lanes narrow to an unsigned type.
    let src = pack32([300, (-5i32) as u32, 0xFFFF, 0x1_0000]);
    let out = vec_unop(Opcode::VSQXtun, 16, 2, src);
    assert_eq!(unpack16(out), [300, 0, 0xFFFF, 0xFFFF, 0, 0, 0, 0]);
}

#[test]
fn vsqxtun2_writes_the_upper_half() {
    let low = 0xAAAA_BBBB_CCCC_DDDD_EEEE_FFFF_0000_1111u128;
    let wide = pack32([70000, (-1i32) as u32, 2, 3]);
    let out = exec(&[low, wide], |ids| {
        Op::vector(Opcode::VSQXtun2, 16, 2, &[ids[0], ids[1]])
    });
    let lanes = unpack16(u128::from_le_bytes(out));
    assert_eq!(&lanes[4..], &[0xFFFF, 0, 2, 3]);
    assert_eq!(&lanes[..4], &unpack16(low)[..4]);
}
