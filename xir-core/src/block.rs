use std::fmt;

use crate::op::Op;

/// Index of an operation within its block.
///
/// Dense and block-local: node ids are only meaningful against the
/// block that produced them, and double as the slot index into the
/// block's SSA value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// An immutable straight-line sequence of operation headers.
///
/// Blocks are built once by the IR builder, in topological order (every
/// source precedes its users), then executed and discarded. The block
/// terminator lives with the surrounding executor, not here.
#[derive(Debug, Clone, Default)]
pub struct Block {
    ops: Vec<Op>,
}

impl Block {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Append an operation, returning the node id its result will
    /// occupy in the value store.
    pub fn push(&mut self, op: Op) -> NodeId {
        let id = NodeId(self.ops.len() as u32);
        self.ops.push(op);
        id
    }

    pub fn get(&self, id: NodeId) -> &Op {
        &self.ops[id.index()]
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Result byte width of the operation at `id`. Kernels whose
    /// semantics depend on a source's declared width look it up here.
    pub fn op_size(&self, id: NodeId) -> u8 {
        self.ops[id.index()].size
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Op)> {
        self.ops
            .iter()
            .enumerate()
            .map(|(i, op)| (NodeId(i as u32), op))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, op) in self.iter() {
            writeln!(f, "  {id} = {op}")?;
        }
        Ok(())
    }
}
