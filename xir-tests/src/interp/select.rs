use xir_core::{CondCode, FcmpFlags, Op, Opcode, Payload};

use super::exec;

fn select(
    cond: CondCode,
    compare_size: u8,
    size: u8,
    a: u64,
    b: u64,
    if_true: u64,
    if_false: u64,
) -> u64 {
    let out = exec(
        &[a as u128, b as u128, if_true as u128, if_false as u128],
        |ids| {
            Op::new(
                Opcode::Select,
                size,
                0,
                ids,
                Payload::Compare { cond, compare_size },
            )
        },
    );
    u64::from_le_bytes(out[..8].try_into().unwrap())
}

fn fcmp(elem: u8, flags: FcmpFlags, a: u64, b: u64) -> FcmpFlags {
    let out = exec(&[a as u128, b as u128], |ids| {
        Op::new(Opcode::FCmp, 8, elem, ids, Payload::Fcmp { flags })
    });
    FcmpFlags::from_bits_truncate(u64::from_le_bytes(out[..8].try_into().unwrap()) as u32)
}

#[test]
fn select_unsigned_vs_signed() {
    // 0xFFFFFFFF vs 1: huge unsigned, negative signed.
    assert_eq!(
        select(CondCode::Ugt, 4, 8, 0xFFFF_FFFF, 1, 10, 20),
        10
    );
    assert_eq!(
        select(CondCode::Sgt, 4, 8, 0xFFFF_FFFF, 1, 10, 20),
        20
    );
}

#[test]
fn select_equality() {
    assert_eq!(select(CondCode::Eq, 8, 8, 7, 7, 1, 0), 1);
    assert_eq!(select(CondCode::Neq, 8, 8, 7, 7, 1, 0), 0);
}

#[test]
fn select_compare_width_is_independent_of_result_width() {
    // At a 4-byte compare only the low words are considered.
    let a = 0xFFFF_FFFF_0000_0005u64;
    let b = 0x0000_0000_0000_0005u64;
    assert_eq!(select(CondCode::Eq, 4, 8, a, b, 1, 0), 1);
    assert_eq!(select(CondCode::Eq, 8, 8, a, b, 1, 0), 0);
}

#[test]
fn select_narrow_result_reads_32_bit_values() {
    let out = exec(
        &[
            1,
            2,
            0xAAAA_AAAA_BBBB_BBBB,
            0xCCCC_CCCC_DDDD_DDDD,
        ],
        |ids| {
            Op::new(
                Opcode::Select,
                4,
                0,
                ids,
                Payload::Compare {
                    cond: CondCode::Ult,
                    compare_size: 8,
                },
            )
        },
    );
    assert_eq!(
        u64::from_le_bytes(out[..8].try_into().unwrap()),
        0xBBBB_BBBB
    );
}

#[test]
fn select_float_conditions() {
    let half = (0.5f32).to_bits() as u64;
    let one = (1.0f32).to_bits() as u64;
    let nan = f32::NAN.to_bits() as u64;

    assert_eq!(select(CondCode::Fgt, 4, 8, one, half, 1, 0), 1);
    assert_eq!(select(CondCode::Flu, 4, 8, half, one, 1, 0), 1);
    // "Less or unordered" holds for NaN, plain ordered compares do not.
    assert_eq!(select(CondCode::Flu, 4, 8, nan, one, 1, 0), 1);
    assert_eq!(select(CondCode::Fge, 4, 8, nan, one, 1, 0), 0);
    assert_eq!(select(CondCode::Fu, 4, 8, nan, one, 1, 0), 1);
    assert_eq!(select(CondCode::Fnu, 4, 8, nan, one, 1, 0), 0);

    let dhalf = (0.5f64).to_bits();
    let done = (1.0f64).to_bits();
    assert_eq!(select(CondCode::Fleu, 8, 8, dhalf, done, 1, 0), 1);
}

#[test]
fn fcmp_ordered_results() {
    let one = (1.0f32).to_bits() as u64;
    let two = (2.0f32).to_bits() as u64;
    let all = FcmpFlags::LT | FcmpFlags::EQ | FcmpFlags::UNORDERED;

    assert_eq!(fcmp(4, all, one, two), FcmpFlags::LT);
    assert_eq!(fcmp(4, all, two, one), FcmpFlags::empty());
    assert_eq!(fcmp(4, all, one, one), FcmpFlags::EQ);
}

#[test]
fn fcmp_unordered_sets_requested_lt_eq_and_unordered() {
    let nan = f64::NAN.to_bits();
    let one = (1.0f64).to_bits();
    let all = FcmpFlags::LT | FcmpFlags::EQ | FcmpFlags::UNORDERED;

    // Every requested bit fires on an unordered compare.
    assert_eq!(fcmp(8, all, nan, one), all);
    // Only the requested subset fires.
    assert_eq!(
        fcmp(8, FcmpFlags::LT | FcmpFlags::EQ, one, nan),
        FcmpFlags::LT | FcmpFlags::EQ
    );
    assert_eq!(fcmp(8, FcmpFlags::UNORDERED, nan, nan), FcmpFlags::UNORDERED);
    assert_eq!(fcmp(8, FcmpFlags::empty(), nan, nan), FcmpFlags::empty());
}
