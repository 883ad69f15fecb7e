//! Typed-SSA IR model for the x86 translator core.
//!
//! A block is an immutable straight-line list of operation headers in
//! topological order; each header names its sources by dense node id
//! and carries its result width, per-lane width, and opcode-specific
//! immediates. Results land in a per-block [`ssa::ValueStore`] of
//! 16-byte slots, one per node, reused for the next block.

pub mod block;
pub mod op;
pub mod opcode;
pub mod ssa;
pub mod types;

pub use block::{Block, NodeId};
pub use op::{Op, Payload, MAX_SRC_ARGS};
pub use opcode::{OpDef, OpFlags, Opcode, OPCODE_DEFS};
pub use ssa::{Slot, ValueStore};
pub use types::{CondCode, FcmpFlags};
