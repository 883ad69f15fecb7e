use std::mem::{offset_of, size_of};

use xir_linux_user::ucontext::*;
use xir_linux_user::SigInfo32;

#[test]
fn sixty_four_bit_layout_sizes() {
    assert_eq!(size_of::<StackT64>(), 24);
    assert_eq!(size_of::<FpState64>(), 512);
    assert_eq!(size_of::<MContext64>(), 256);
    assert_eq!(size_of::<SigSet>(), 128);
    assert_eq!(size_of::<UContext64>(), 424);
}

#[test]
fn sixty_four_bit_layout_offsets() {
    assert_eq!(offset_of!(StackT64, ss_sp), 0);
    assert_eq!(offset_of!(StackT64, ss_flags), 8);
    assert_eq!(offset_of!(StackT64, ss_size), 16);

    assert_eq!(offset_of!(FpState64, fcw), 0);
    assert_eq!(offset_of!(FpState64, fsw), 2);
    assert_eq!(offset_of!(FpState64, ftw), 4);
    assert_eq!(offset_of!(FpState64, mxcsr), 24);
    assert_eq!(offset_of!(FpState64, st), 32);
    assert_eq!(offset_of!(FpState64, xmm), 160);

    assert_eq!(offset_of!(MContext64, gregs), 0);
    assert_eq!(offset_of!(MContext64, fpregs), 184);

    assert_eq!(offset_of!(UContext64, uc_flags), 0);
    assert_eq!(offset_of!(UContext64, uc_link), 8);
    assert_eq!(offset_of!(UContext64, uc_stack), 16);
    assert_eq!(offset_of!(UContext64, uc_mcontext), 40);
    assert_eq!(offset_of!(UContext64, uc_sigmask), 296);
}

#[test]
fn thirty_two_bit_layout_sizes() {
    assert_eq!(size_of::<StackT32>(), 12);
    assert_eq!(size_of::<MContext32>(), 88);
    assert_eq!(size_of::<FpReg32>(), 10);
    assert_eq!(size_of::<FpState32>(), 624);
    assert_eq!(size_of::<UContext32>(), 236);
    assert_eq!(size_of::<SigInfo32>(), 128);
}

#[test]
fn thirty_two_bit_layout_offsets() {
    assert_eq!(offset_of!(StackT32, ss_flags), 4);
    assert_eq!(offset_of!(StackT32, ss_size), 8);

    assert_eq!(offset_of!(MContext32, gregs), 0);
    assert_eq!(offset_of!(MContext32, fpregs), 76);
    assert_eq!(offset_of!(MContext32, oldmask), 80);
    assert_eq!(offset_of!(MContext32, cr2), 84);

    assert_eq!(offset_of!(FpState32, fcw), 0);
    assert_eq!(offset_of!(FpState32, fsw), 4);
    assert_eq!(offset_of!(FpState32, mxcsr), 152);
    assert_eq!(offset_of!(FpState32, xmm), 288);

    assert_eq!(offset_of!(UContext32, uc_flags), 0);
    assert_eq!(offset_of!(UContext32, uc_link), 4);
    assert_eq!(offset_of!(UContext32, uc_stack), 8);
    assert_eq!(offset_of!(UContext32, uc_mcontext), 20);
    assert_eq!(offset_of!(UContext32, uc_sigmask), 108);
}

#[test]
fn greg_orderings_match_the_kernel_abi() {
    assert_eq!(Greg64::R8 as usize, 0);
    assert_eq!(Greg64::Rdi as usize, 8);
    assert_eq!(Greg64::Rax as usize, 13);
    assert_eq!(Greg64::Rsp as usize, 15);
    assert_eq!(Greg64::Rip as usize, 16);
    assert_eq!(Greg64::Efl as usize, 17);
    assert_eq!(Greg64::Cr2 as usize, 22);
    assert_eq!(GREG64_COUNT, 23);

    assert_eq!(Greg32::Gs as usize, 0);
    assert_eq!(Greg32::Edi as usize, 4);
    assert_eq!(Greg32::Eax as usize, 11);
    assert_eq!(Greg32::Eip as usize, 14);
    assert_eq!(Greg32::Efl as usize, 16);
    assert_eq!(Greg32::Ss as usize, 18);
    assert_eq!(GREG32_COUNT, 19);
}

#[test]
fn uc_flag_bits() {
    assert_eq!(UcFlags::FP_XSTATE.bits(), 1);
    assert_eq!(UcFlags::SIGCONTEXT_SS.bits(), 2);
    assert_eq!(UcFlags::STRICT_RESTORE_SS.bits(), 4);
}
