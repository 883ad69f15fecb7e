//! Guest signal-context marshalling for 32-bit and 64-bit x86 guests.
//!
//! The guest-facing `ucontext`/`mcontext`/FP-state/`siginfo` layouts
//! are ABI with the guest: bit-exact, compile-time checked. Packing
//! happens when the runtime delivers a signal to a guest handler,
//! unpacking at `sigreturn`, and the `siginfo` translation in both
//! directions around them.

pub mod cpu;
pub mod siginfo;
pub mod ucontext;

pub use cpu::{reg, CpuState};
pub use siginfo::{
    siginfo_guest32_to_host, siginfo_guest64_to_host, siginfo_host_to_guest32,
    siginfo_host_to_guest64, SigChld32, SigInfo32, SigTimer32,
};
pub use ucontext::{
    pack_ucontext32, pack_ucontext64, sigmask_of_ucontext32, unpack_ucontext32,
    unpack_ucontext64, FpReg32, FpState32, FpState64, Greg32, Greg64, MContext32, MContext64,
    SigSet, StackT32, StackT64, UContext32, UContext64, UcFlags, GREG32_COUNT, GREG64_COUNT,
};
