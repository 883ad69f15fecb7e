use std::fmt;

use crate::block::NodeId;
use crate::opcode::Opcode;
use crate::types::{CondCode, FcmpFlags};

/// Maximum number of source arguments per operation (`Select` carries
/// two compare sources plus two selectable values).
pub const MAX_SRC_ARGS: usize = 4;

/// Opcode-specific immediate fields.
///
/// Headers are not self-describing: the opcode selects which payload
/// variant is meaningful. The typed accessors on [`Op`] enforce this at
/// the use site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    None,
    /// `Constant`
    Constant { value: u64 },
    /// `EntrypointOffset`
    EntrypointOffset { offset: i64 },
    /// `Extr` — bit position to extract from the concatenation.
    Lsb { lsb: u8 },
    /// `Bfi` / `Bfe` / `Sbfe` — field position and width in bits.
    Bitfield { lsb: u8, width: u8 },
    /// Shift-by-immediate vector shifts, in bits.
    BitShift { shift: u8 },
    /// `VSli` / `VSri` — whole-register shift in bytes.
    ByteShift { shift: u8 },
    /// Element-indexed shuffles (`VDupElement`, `VExtr`, extracts).
    Lane { index: u8 },
    /// `VInsElement` / `VInsScalarElement`.
    InsertLanes { dest: u8, src: u8 },
    /// `VectorImm` — broadcast immediate, sign-extended per lane.
    Immediate { value: i8 },
    /// `Select` — condition and the width the compare runs at.
    Compare { cond: CondCode, compare_size: u8 },
    /// `FloatToGprZS` / `FloatToGprS` — source float width (4 or 8).
    FloatSource { src_size: u8 },
    /// `FCmp` — which condition bits the kernel must produce.
    Fcmp { flags: FcmpFlags },
}

/// A single IR operation header.
///
/// Carries the opcode tag, the result byte width, the per-lane byte
/// width (vector opcodes only), the source node ids, and the
/// opcode-specific immediates.
#[derive(Debug, Clone)]
pub struct Op {
    pub opcode: Opcode,
    /// Result width in bytes: 1, 2, 4, 8 or 16.
    pub size: u8,
    /// Per-lane width in bytes for vector opcodes; 0 otherwise.
    pub elem_size: u8,
    pub args: [NodeId; MAX_SRC_ARGS],
    pub nargs: u8,
    pub payload: Payload,
}

impl Op {
    pub fn new(
        opcode: Opcode,
        size: u8,
        elem_size: u8,
        args: &[NodeId],
        payload: Payload,
    ) -> Self {
        assert!(
            args.len() <= MAX_SRC_ARGS,
            "too many args ({}) for {opcode}",
            args.len()
        );
        let mut inline = [NodeId(0); MAX_SRC_ARGS];
        inline[..args.len()].copy_from_slice(args);
        Self {
            opcode,
            size,
            elem_size,
            args: inline,
            nargs: args.len() as u8,
            payload,
        }
    }

    /// Scalar operation with no immediates.
    pub fn scalar(opcode: Opcode, size: u8, args: &[NodeId]) -> Self {
        Self::new(opcode, size, 0, args, Payload::None)
    }

    /// Vector operation with no immediates.
    pub fn vector(opcode: Opcode, size: u8, elem_size: u8, args: &[NodeId]) -> Self {
        Self::new(opcode, size, elem_size, args, Payload::None)
    }

    pub fn constant(size: u8, value: u64) -> Self {
        Self::new(Opcode::Constant, size, 0, &[], Payload::Constant { value })
    }

    /// Number of lanes a vector header describes.
    pub fn lanes(&self) -> usize {
        debug_assert!(self.elem_size != 0, "{}: not a vector op", self.opcode);
        self.size as usize / self.elem_size as usize
    }

    pub fn arg_slice(&self) -> &[NodeId] {
        &self.args[..self.nargs as usize]
    }

    // -- Typed payload accessors; wrong-variant access is an IR bug. --

    pub fn constant_value(&self) -> u64 {
        match self.payload {
            Payload::Constant { value } => value,
            p => panic!("{}: expected Constant payload, got {p:?}", self.opcode),
        }
    }

    pub fn entrypoint_offset(&self) -> i64 {
        match self.payload {
            Payload::EntrypointOffset { offset } => offset,
            p => panic!("{}: expected EntrypointOffset payload, got {p:?}", self.opcode),
        }
    }

    pub fn lsb(&self) -> u8 {
        match self.payload {
            Payload::Lsb { lsb } => lsb,
            p => panic!("{}: expected Lsb payload, got {p:?}", self.opcode),
        }
    }

    pub fn bitfield(&self) -> (u8, u8) {
        match self.payload {
            Payload::Bitfield { lsb, width } => (lsb, width),
            p => panic!("{}: expected Bitfield payload, got {p:?}", self.opcode),
        }
    }

    pub fn bit_shift(&self) -> u8 {
        match self.payload {
            Payload::BitShift { shift } => shift,
            p => panic!("{}: expected BitShift payload, got {p:?}", self.opcode),
        }
    }

    pub fn byte_shift(&self) -> u8 {
        match self.payload {
            Payload::ByteShift { shift } => shift,
            p => panic!("{}: expected ByteShift payload, got {p:?}", self.opcode),
        }
    }

    pub fn lane_index(&self) -> u8 {
        match self.payload {
            Payload::Lane { index } => index,
            p => panic!("{}: expected Lane payload, got {p:?}", self.opcode),
        }
    }

    pub fn insert_lanes(&self) -> (u8, u8) {
        match self.payload {
            Payload::InsertLanes { dest, src } => (dest, src),
            p => panic!("{}: expected InsertLanes payload, got {p:?}", self.opcode),
        }
    }

    pub fn immediate(&self) -> i8 {
        match self.payload {
            Payload::Immediate { value } => value,
            p => panic!("{}: expected Immediate payload, got {p:?}", self.opcode),
        }
    }

    pub fn compare(&self) -> (CondCode, u8) {
        match self.payload {
            Payload::Compare { cond, compare_size } => (cond, compare_size),
            p => panic!("{}: expected Compare payload, got {p:?}", self.opcode),
        }
    }

    pub fn float_src_size(&self) -> u8 {
        match self.payload {
            Payload::FloatSource { src_size } => src_size,
            p => panic!("{}: expected FloatSource payload, got {p:?}", self.opcode),
        }
    }

    pub fn fcmp_flags(&self) -> FcmpFlags {
        match self.payload {
            Payload::Fcmp { flags } => flags,
            p => panic!("{}: expected Fcmp payload, got {p:?}", self.opcode),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.opcode, self.size)?;
        if self.elem_size != 0 {
            write!(f, "x{}", self.elem_size)?;
        }
        for (i, arg) in self.arg_slice().iter().enumerate() {
            if i == 0 {
                write!(f, " ")?;
            } else {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        Ok(())
    }
}
