//! Guest signal-frame layouts for 64-bit and 32-bit x86, and the
//! conversions between them and the internal machine state.
//!
//! Every struct here is guest ABI: the layouts are bit-exact and
//! guarded by compile-time size/offset assertions. If a definition
//! drifts, the build fails; there is no runtime recovery path.

use std::mem::{offset_of, size_of};

use bitflags::bitflags;
use tracing::warn;

use crate::cpu::{reg, CpuState};

bitflags! {
    /// `uc_flags` bits. The SS bits exist only for 64-bit guests.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UcFlags: u64 {
        const FP_XSTATE = 1 << 0;
        const SIGCONTEXT_SS = 1 << 1;
        const STRICT_RESTORE_SS = 1 << 2;
    }
}

// ---------------------------------------------------------------
// 64-bit guest layouts
// ---------------------------------------------------------------

/// Signal-frame GPR ordering for 64-bit guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Greg64 {
    R8 = 0,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    Rdi,
    Rsi,
    Rbp,
    Rbx,
    Rdx,
    Rax,
    Rcx,
    Rsp,
    Rip,
    Efl,
    Csgsfs,
    Err,
    Trapno,
    Oldmask,
    Cr2,
}

pub const GREG64_COUNT: usize = 23;
const _: () = assert!(Greg64::Cr2 as usize == 22);

/// Alternate-stack descriptor, 64-bit guest. Four bytes of implicit
/// padding follow `ss_flags`.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct StackT64 {
    pub ss_sp: u64,
    pub ss_flags: i32,
    pub ss_size: u64,
}

const _: () = assert!(size_of::<StackT64>() == 24);
const _: () = assert!(offset_of!(StackT64, ss_flags) == 8);
const _: () = assert!(offset_of!(StackT64, ss_size) == 16);

/// FXSAVE-format floating point state, 64-bit guest.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct FpState64 {
    pub fcw: u16,
    pub fsw: u16,
    pub ftw: u16,
    pub fop: u16,
    pub fip: u64,
    pub fdp: u64,
    pub mxcsr: u32,
    pub mxcsr_mask: u32,
    pub st: [u128; 8],
    pub xmm: [u128; 16],
    pub reserved: [u32; 24],
}

const _: () = assert!(size_of::<FpState64>() == 512);
const _: () = assert!(offset_of!(FpState64, fsw) == 2);
const _: () = assert!(offset_of!(FpState64, ftw) == 4);
const _: () = assert!(offset_of!(FpState64, mxcsr) == 24);
const _: () = assert!(offset_of!(FpState64, st) == 32);
const _: () = assert!(offset_of!(FpState64, xmm) == 160);

impl FpState64 {
    pub fn zeroed() -> Self {
        Self {
            fcw: 0,
            fsw: 0,
            ftw: 0,
            fop: 0,
            fip: 0,
            fdp: 0,
            mxcsr: 0,
            mxcsr_mask: 0,
            st: [0; 8],
            xmm: [0; 16],
            reserved: [0; 24],
        }
    }
}

/// Machine context, 64-bit guest. `fpregs` is a guest pointer to the
/// [`FpState64`] block on the signal frame.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct MContext64 {
    pub gregs: [u64; GREG64_COUNT],
    pub fpregs: u64,
    pub reserved: [u64; 8],
}

const _: () = assert!(size_of::<MContext64>() == 256);
const _: () = assert!(offset_of!(MContext64, fpregs) == 184);

/// Signal mask; the same 128-byte layout on both guest widths.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct SigSet {
    pub val: [u64; 16],
}

const _: () = assert!(size_of::<SigSet>() == 128);

impl SigSet {
    pub fn empty() -> Self {
        Self { val: [0; 16] }
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct UContext64 {
    pub uc_flags: u64,
    pub uc_link: u64,
    pub uc_stack: StackT64,
    pub uc_mcontext: MContext64,
    pub uc_sigmask: SigSet,
}

const _: () = assert!(size_of::<UContext64>() == 424);
const _: () = assert!(offset_of!(UContext64, uc_stack) == 16);
const _: () = assert!(offset_of!(UContext64, uc_mcontext) == 40);
const _: () = assert!(offset_of!(UContext64, uc_sigmask) == 296);

impl UContext64 {
    pub fn zeroed() -> Self {
        Self {
            uc_flags: 0,
            uc_link: 0,
            uc_stack: StackT64 {
                ss_sp: 0,
                ss_flags: 0,
                ss_size: 0,
            },
            uc_mcontext: MContext64 {
                gregs: [0; GREG64_COUNT],
                fpregs: 0,
                reserved: [0; 8],
            },
            uc_sigmask: SigSet::empty(),
        }
    }
}

// ---------------------------------------------------------------
// 32-bit guest layouts
// ---------------------------------------------------------------

/// Signal-frame GPR ordering for 32-bit guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Greg32 {
    Gs = 0,
    Fs,
    Es,
    Ds,
    Edi,
    Esi,
    Ebp,
    Esp,
    Ebx,
    Edx,
    Ecx,
    Eax,
    Trapno,
    Err,
    Eip,
    Cs,
    Efl,
    Uesp,
    Ss,
}

pub const GREG32_COUNT: usize = 19;
const _: () = assert!(Greg32::Ss as usize == 18);

/// Alternate-stack descriptor, 32-bit guest. `ss_sp` is a guest
/// pointer.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct StackT32 {
    pub ss_sp: u32,
    pub ss_flags: i32,
    pub ss_size: u32,
}

const _: () = assert!(size_of::<StackT32>() == 12);
const _: () = assert!(offset_of!(StackT32, ss_flags) == 4);
const _: () = assert!(offset_of!(StackT32, ss_size) == 8);

/// Machine context, 32-bit guest. `fpregs` is a guest pointer to the
/// extended [`FpState32`] block.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct MContext32 {
    pub gregs: [u32; GREG32_COUNT],
    pub fpregs: u32,
    pub oldmask: u32,
    pub cr2: u32,
}

const _: () = assert!(size_of::<MContext32>() == 88);
const _: () = assert!(offset_of!(MContext32, fpregs) == 76);
const _: () = assert!(offset_of!(MContext32, oldmask) == 80);
const _: () = assert!(offset_of!(MContext32, cr2) == 84);

/// One legacy x87 register slot in the 32-bit FP state: an 80-bit
/// value as four significand words plus the sign/exponent word.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct FpReg32 {
    pub significand: [u16; 4],
    pub exponent: u16,
}

const _: () = assert!(size_of::<FpReg32>() == 10);

/// Extended floating point state, 32-bit guest: the legacy area
/// followed by the FXSR extension carrying MXCSR and the first eight
/// XMM registers.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct FpState32 {
    pub fcw: u32,
    pub fsw: u32,
    pub ftw: u32,
    pub fop: u32,
    pub cssel: u32,
    pub dataoff: u32,
    pub datasel: u32,
    pub st: [FpReg32; 8],
    pub status: u32,
    pub pad: [u32; 10],
    pub mxcsr: u32,
    pub reserved: u32,
    pub st_pad: [u128; 8],
    pub xmm: [u128; 8],
    pub pad2: [u32; 52],
}

const _: () = assert!(size_of::<FpState32>() == 624);
const _: () = assert!(offset_of!(FpState32, fsw) == 4);
const _: () = assert!(offset_of!(FpState32, st) == 28);
const _: () = assert!(offset_of!(FpState32, mxcsr) == 152);
const _: () = assert!(offset_of!(FpState32, xmm) == 288);

impl FpState32 {
    pub fn zeroed() -> Self {
        Self {
            fcw: 0,
            fsw: 0,
            ftw: 0,
            fop: 0,
            cssel: 0,
            dataoff: 0,
            datasel: 0,
            st: [FpReg32 {
                significand: [0; 4],
                exponent: 0,
            }; 8],
            status: 0,
            pad: [0; 10],
            mxcsr: 0,
            reserved: 0,
            st_pad: [0; 8],
            xmm: [0; 8],
            pad2: [0; 52],
        }
    }
}

/// The 32-bit `ucontext`. The sigmask bytes match [`SigSet`] but are
/// stored as words to keep the struct 4-byte aligned as the guest ABI
/// demands.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct UContext32 {
    pub uc_flags: u32,
    pub uc_link: u32,
    pub uc_stack: StackT32,
    pub uc_mcontext: MContext32,
    pub uc_sigmask: [u32; 32],
}

const _: () = assert!(size_of::<UContext32>() == 236);
const _: () = assert!(offset_of!(UContext32, uc_stack) == 8);
const _: () = assert!(offset_of!(UContext32, uc_mcontext) == 20);
const _: () = assert!(offset_of!(UContext32, uc_sigmask) == 108);

impl UContext32 {
    pub fn zeroed() -> Self {
        Self {
            uc_flags: 0,
            uc_link: 0,
            uc_stack: StackT32 {
                ss_sp: 0,
                ss_flags: 0,
                ss_size: 0,
            },
            uc_mcontext: MContext32 {
                gregs: [0; GREG32_COUNT],
                fpregs: 0,
                oldmask: 0,
                cr2: 0,
            },
            uc_sigmask: [0; 32],
        }
    }
}

fn sigset_to_words(mask: &SigSet) -> [u32; 32] {
    let mut words = [0u32; 32];
    for (i, v) in mask.val.iter().enumerate() {
        words[i * 2] = *v as u32;
        words[i * 2 + 1] = (*v >> 32) as u32;
    }
    words
}

fn sigset_from_words(words: &[u32; 32]) -> SigSet {
    let mut mask = SigSet::empty();
    for i in 0..16 {
        mask.val[i] = words[i * 2] as u64 | ((words[i * 2 + 1] as u64) << 32);
    }
    mask
}

// ---------------------------------------------------------------
// Pack / unpack
// ---------------------------------------------------------------

/// Build the 64-bit guest signal frame contents from the internal
/// state. `fpstate_addr` is the guest address the FP block will be
/// written to; it lands in `mcontext.fpregs`.
pub fn pack_ucontext64(
    state: &CpuState,
    mask: &SigSet,
    stack: &StackT64,
    fpstate_addr: u64,
) -> (UContext64, FpState64) {
    let mut uc = UContext64::zeroed();
    uc.uc_flags =
        (UcFlags::FP_XSTATE | UcFlags::SIGCONTEXT_SS | UcFlags::STRICT_RESTORE_SS).bits();
    uc.uc_link = 0;
    uc.uc_stack = *stack;
    uc.uc_sigmask = *mask;

    let g = &mut uc.uc_mcontext.gregs;
    g[Greg64::R8 as usize] = state.gregs[reg::R8];
    g[Greg64::R9 as usize] = state.gregs[reg::R9];
    g[Greg64::R10 as usize] = state.gregs[reg::R10];
    g[Greg64::R11 as usize] = state.gregs[reg::R11];
    g[Greg64::R12 as usize] = state.gregs[reg::R12];
    g[Greg64::R13 as usize] = state.gregs[reg::R13];
    g[Greg64::R14 as usize] = state.gregs[reg::R14];
    g[Greg64::R15 as usize] = state.gregs[reg::R15];
    g[Greg64::Rdi as usize] = state.gregs[reg::RDI];
    g[Greg64::Rsi as usize] = state.gregs[reg::RSI];
    g[Greg64::Rbp as usize] = state.gregs[reg::RBP];
    g[Greg64::Rbx as usize] = state.gregs[reg::RBX];
    g[Greg64::Rdx as usize] = state.gregs[reg::RDX];
    g[Greg64::Rax as usize] = state.gregs[reg::RAX];
    g[Greg64::Rcx as usize] = state.gregs[reg::RCX];
    g[Greg64::Rsp as usize] = state.gregs[reg::RSP];
    g[Greg64::Rip as usize] = state.rip;
    g[Greg64::Efl as usize] = state.rflags;
    g[Greg64::Csgsfs as usize] =
        state.cs as u64 | ((state.gs as u64) << 16) | ((state.fs as u64) << 32);

    uc.uc_mcontext.fpregs = fpstate_addr;

    let mut fp = FpState64::zeroed();
    fp.fcw = state.fcw;
    fp.fsw = state.fsw;
    fp.ftw = state.ftw;
    fp.fop = state.fop;
    fp.mxcsr = state.mxcsr;
    fp.mxcsr_mask = 0xFFFF;
    fp.st = state.mm;
    fp.xmm = state.xmm;

    (uc, fp)
}

/// Restore internal state from a 64-bit guest frame at sigreturn. The
/// handler may have rewritten any of it.
pub fn unpack_ucontext64(uc: &UContext64, fp: &FpState64, state: &mut CpuState) {
    if UcFlags::from_bits(uc.uc_flags).is_none() {
        warn!(flags = uc.uc_flags, "unknown uc_flags bits on sigreturn");
    }

    let g = &uc.uc_mcontext.gregs;
    state.gregs[reg::R8] = g[Greg64::R8 as usize];
    state.gregs[reg::R9] = g[Greg64::R9 as usize];
    state.gregs[reg::R10] = g[Greg64::R10 as usize];
    state.gregs[reg::R11] = g[Greg64::R11 as usize];
    state.gregs[reg::R12] = g[Greg64::R12 as usize];
    state.gregs[reg::R13] = g[Greg64::R13 as usize];
    state.gregs[reg::R14] = g[Greg64::R14 as usize];
    state.gregs[reg::R15] = g[Greg64::R15 as usize];
    state.gregs[reg::RDI] = g[Greg64::Rdi as usize];
    state.gregs[reg::RSI] = g[Greg64::Rsi as usize];
    state.gregs[reg::RBP] = g[Greg64::Rbp as usize];
    state.gregs[reg::RBX] = g[Greg64::Rbx as usize];
    state.gregs[reg::RDX] = g[Greg64::Rdx as usize];
    state.gregs[reg::RAX] = g[Greg64::Rax as usize];
    state.gregs[reg::RCX] = g[Greg64::Rcx as usize];
    state.gregs[reg::RSP] = g[Greg64::Rsp as usize];
    state.rip = g[Greg64::Rip as usize];
    state.rflags = g[Greg64::Efl as usize];

    let csgsfs = g[Greg64::Csgsfs as usize];
    state.cs = csgsfs as u16;
    state.gs = (csgsfs >> 16) as u16;
    state.fs = (csgsfs >> 32) as u16;

    state.fcw = fp.fcw;
    state.fsw = fp.fsw;
    state.ftw = fp.ftw;
    state.fop = fp.fop;
    state.mxcsr = fp.mxcsr;
    state.mm = fp.st;
    state.xmm = fp.xmm;
}

/// Build the 32-bit guest signal frame contents from the internal
/// state. Addresses truncate to the guest's 32-bit view.
pub fn pack_ucontext32(
    state: &CpuState,
    mask: &SigSet,
    stack: &StackT32,
    fpstate_addr: u32,
) -> (UContext32, FpState32) {
    let mut uc = UContext32::zeroed();
    uc.uc_flags = UcFlags::FP_XSTATE.bits() as u32;
    uc.uc_link = 0;
    uc.uc_stack = *stack;
    uc.uc_sigmask = sigset_to_words(mask);

    let g = &mut uc.uc_mcontext.gregs;
    g[Greg32::Gs as usize] = state.gs as u32;
    g[Greg32::Fs as usize] = state.fs as u32;
    g[Greg32::Es as usize] = state.es as u32;
    g[Greg32::Ds as usize] = state.ds as u32;
    g[Greg32::Edi as usize] = state.gregs[reg::RDI] as u32;
    g[Greg32::Esi as usize] = state.gregs[reg::RSI] as u32;
    g[Greg32::Ebp as usize] = state.gregs[reg::RBP] as u32;
    g[Greg32::Esp as usize] = state.gregs[reg::RSP] as u32;
    g[Greg32::Ebx as usize] = state.gregs[reg::RBX] as u32;
    g[Greg32::Edx as usize] = state.gregs[reg::RDX] as u32;
    g[Greg32::Ecx as usize] = state.gregs[reg::RCX] as u32;
    g[Greg32::Eax as usize] = state.gregs[reg::RAX] as u32;
    g[Greg32::Eip as usize] = state.rip as u32;
    g[Greg32::Cs as usize] = state.cs as u32;
    g[Greg32::Efl as usize] = state.rflags as u32;
    g[Greg32::Uesp as usize] = state.gregs[reg::RSP] as u32;
    g[Greg32::Ss as usize] = state.ss as u32;

    uc.uc_mcontext.fpregs = fpstate_addr;

    let mut fp = FpState32::zeroed();
    fp.fcw = state.fcw as u32;
    fp.fsw = state.fsw as u32;
    fp.ftw = state.ftw as u32;
    fp.fop = state.fop as u32;
    for (i, slot) in fp.st.iter_mut().enumerate() {
        let m = state.mm[i];
        slot.significand = [
            m as u16,
            (m >> 16) as u16,
            (m >> 32) as u16,
            (m >> 48) as u16,
        ];
        slot.exponent = (m >> 64) as u16;
    }
    fp.mxcsr = state.mxcsr;
    fp.xmm.copy_from_slice(&state.xmm[..8]);

    (uc, fp)
}

/// Restore internal state from a 32-bit guest frame at sigreturn.
pub fn unpack_ucontext32(uc: &UContext32, fp: &FpState32, state: &mut CpuState) {
    let g = &uc.uc_mcontext.gregs;
    state.gs = g[Greg32::Gs as usize] as u16;
    state.fs = g[Greg32::Fs as usize] as u16;
    state.es = g[Greg32::Es as usize] as u16;
    state.ds = g[Greg32::Ds as usize] as u16;
    state.gregs[reg::RDI] = g[Greg32::Edi as usize] as u64;
    state.gregs[reg::RSI] = g[Greg32::Esi as usize] as u64;
    state.gregs[reg::RBP] = g[Greg32::Ebp as usize] as u64;
    state.gregs[reg::RSP] = g[Greg32::Esp as usize] as u64;
    state.gregs[reg::RBX] = g[Greg32::Ebx as usize] as u64;
    state.gregs[reg::RDX] = g[Greg32::Edx as usize] as u64;
    state.gregs[reg::RCX] = g[Greg32::Ecx as usize] as u64;
    state.gregs[reg::RAX] = g[Greg32::Eax as usize] as u64;
    state.rip = g[Greg32::Eip as usize] as u64;
    state.cs = g[Greg32::Cs as usize] as u16;
    state.rflags = g[Greg32::Efl as usize] as u64;
    state.ss = g[Greg32::Ss as usize] as u16;

    state.fcw = fp.fcw as u16;
    state.fsw = fp.fsw as u16;
    state.ftw = fp.ftw as u16;
    state.fop = fp.fop as u16;
    for (i, slot) in fp.st.iter().enumerate() {
        state.mm[i] = slot.significand[0] as u128
            | ((slot.significand[1] as u128) << 16)
            | ((slot.significand[2] as u128) << 32)
            | ((slot.significand[3] as u128) << 48)
            | ((slot.exponent as u128) << 64);
    }
    state.mxcsr = fp.mxcsr;
    state.xmm[..8].copy_from_slice(&fp.xmm);
}

/// Recover the 64-bit-shaped mask from a 32-bit frame's word array.
pub fn sigmask_of_ucontext32(uc: &UContext32) -> SigSet {
    sigset_from_words(&uc.uc_sigmask)
}
