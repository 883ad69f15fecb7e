//! Reference interpreter for the value-producing IR opcodes.
//!
//! Executes one block at a time: straight-line, program order, one
//! kernel per opcode chosen through a dense table. Kernels are pure —
//! sources in, destination slot out — which is what lets a native
//! backend claim bit-exactness against this implementation. Branches,
//! memory access and syscalls are block terminators handled by the
//! surrounding executor, which also reads terminator inputs back out
//! of the value store after the run.

use xir_core::{Block, NodeId, Op, Opcode, ValueStore};

mod alu;
mod vector;

/// An IR-consistency failure: the builder handed us something the
/// interpreter was never taught. Not recoverable at runtime.
macro_rules! ir_fatal {
    ($($arg:tt)*) => {{
        tracing::error!($($arg)*);
        panic!($($arg)*);
    }};
}
pub(crate) use ir_fatal;

/// Per-thread execution data handed to every kernel.
pub struct ExecData<'a> {
    /// Result table for the block being executed.
    pub ssa: &'a mut ValueStore,
    /// The block, for source-width lookups by element extracts.
    pub block: &'a Block,
    /// Guest RIP of the block head; `EntrypointOffset` is relative to it.
    pub current_entry: u64,
}

impl<'a> ExecData<'a> {
    pub fn new(ssa: &'a mut ValueStore, block: &'a Block, current_entry: u64) -> Self {
        Self {
            ssa,
            block,
            current_entry,
        }
    }
}

type Kernel = fn(&Op, &mut ExecData<'_>, NodeId);

fn nop(_op: &Op, _data: &mut ExecData<'_>, _node: NodeId) {}

/// Dense opcode → kernel table, indexed by `Opcode as usize`.
///
/// Entries appear in declaration order of [`Opcode`]; the dispatch
/// test in the workspace test crate cross-checks the mapping.
static KERNELS: [Kernel; Opcode::Count as usize] = [
    // Meta
    alu::constant,
    nop, // InlineConstant
    alu::entrypoint_offset,
    nop, // InlineEntrypointOffset
    alu::cycle_counter,
    // Scalar integer ALU
    alu::add,
    alu::sub,
    alu::neg,
    alu::mul,
    alu::umul,
    alu::mulh,
    alu::umulh,
    alu::div,
    alu::udiv,
    alu::rem,
    alu::urem,
    alu::ldiv,
    alu::ludiv,
    alu::lrem,
    alu::lurem,
    alu::or,
    alu::and,
    alu::andn,
    alu::xor,
    alu::not,
    // Shifts and bit manipulation
    alu::lshl,
    alu::lshr,
    alu::ashr,
    alu::ror,
    alu::extr,
    alu::bfi,
    alu::bfe,
    alu::sbfe,
    alu::pdep,
    alu::pext,
    alu::popcount,
    alu::find_lsb,
    alu::find_msb,
    alu::find_trailing_zeros,
    alu::count_leading_zeroes,
    alu::rev,
    // Selects and conversions
    alu::select,
    alu::fcmp,
    alu::float_to_gpr_zs,
    alu::float_to_gpr_s,
    alu::trunc_element_pair,
    alu::vextract_to_gpr,
    // Vector data movement
    vector::vector_zero,
    vector::vector_imm,
    vector::splat_vector,
    vector::splat_vector,
    vector::vmov,
    vector::vbitcast,
    // Vector bitwise
    vector::vand,
    vector::vbic,
    vector::vor,
    vector::vxor,
    vector::vnot,
    vector::vbsl,
    // Vector integer arithmetic
    vector::vadd,
    vector::vsub,
    vector::vumul,
    vector::vsmul,
    vector::vuqadd,
    vector::vuqsub,
    vector::vsqadd,
    vector::vsqsub,
    vector::vumin,
    vector::vsmin,
    vector::vumax,
    vector::vsmax,
    vector::vuravg,
    vector::vneg,
    vector::vabs,
    vector::vpopcount,
    vector::vaddp,
    vector::vaddv,
    vector::vuminv,
    vector::vumull,
    vector::vsmull,
    vector::vumull2,
    vector::vsmull2,
    vector::vuabdl,
    // Vector shifts
    vector::vushl,
    vector::vushr,
    vector::vsshr,
    vector::vushls,
    vector::vushrs,
    vector::vsshrs,
    vector::vshli,
    vector::vushri,
    vector::vsshri,
    vector::vsli,
    vector::vsri,
    vector::vushrni,
    vector::vushrni2,
    // Vector compares
    vector::vcmpeq,
    vector::vcmpeqz,
    vector::vcmpgt,
    vector::vcmpgtz,
    vector::vcmpltz,
    vector::vfcmpeq,
    vector::vfcmpneq,
    vector::vfcmplt,
    vector::vfcmpgt,
    vector::vfcmple,
    vector::vfcmpord,
    vector::vfcmpuno,
    // Vector float arithmetic
    vector::vfadd,
    vector::vfaddp,
    vector::vfsub,
    vector::vfmul,
    vector::vfdiv,
    vector::vfmin,
    vector::vfmax,
    vector::vfrecp,
    vector::vfsqrt,
    vector::vfrsqrt,
    vector::vfneg,
    // Vector widen / narrow
    vector::vsxtl,
    vector::vsxtl2,
    vector::vuxtl,
    vector::vuxtl2,
    vector::vsqxtn,
    vector::vsqxtn2,
    vector::vsqxtun,
    vector::vsqxtun2,
    // Vector shuffles
    vector::vzip,
    vector::vzip2,
    vector::vunzip,
    vector::vunzip2,
    vector::vextr,
    vector::vtbl1,
    vector::vrev64,
    vector::vdup_element,
    vector::vextract_element,
    vector::vins_element,
    vector::vins_scalar_element,
];

/// Execute `block` from `start` to its end, in program order.
///
/// Every source a kernel reads must already have been written — the
/// builder guarantees topological order, and callers that restart
/// mid-block (after writing the live-in slots themselves) must pick a
/// `start` that preserves it.
pub fn run_block(data: &mut ExecData<'_>, start: NodeId) {
    let block = data.block;
    for (node, op) in block.iter().skip(start.index()) {
        KERNELS[op.opcode as usize](op, data, node);
    }
}

/// Convenience wrapper: fresh value store, full block, result store
/// returned for terminator read-back.
pub fn execute(block: &Block, current_entry: u64) -> ValueStore {
    let mut ssa = ValueStore::for_block(block);
    let mut data = ExecData::new(&mut ssa, block, current_entry);
    run_block(&mut data, NodeId(0));
    ssa
}
