use bitflags::bitflags;

/// Comparison conditions for `Select`.
///
/// The integer conditions compare the sources at the header's
/// `CompareSize`; the `F*` conditions reinterpret them as float or
/// double at the same width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CondCode {
    Eq = 0,
    Neq,
    // Unsigned
    Uge,
    Ult,
    Ugt,
    Ule,
    // Signed
    Sge,
    Slt,
    Sgt,
    Sle,
    // Float: "U" suffix means the condition also holds when unordered.
    Flu,
    Fge,
    Fleu,
    Fgt,
    Fu,
    Fnu,
}

impl CondCode {
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            CondCode::Flu
                | CondCode::Fge
                | CondCode::Fleu
                | CondCode::Fgt
                | CondCode::Fu
                | CondCode::Fnu
        )
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            CondCode::Sge | CondCode::Slt | CondCode::Sgt | CondCode::Sle
        )
    }
}

bitflags! {
    /// Condition bits requested from / produced by `FCmp`.
    ///
    /// The request mask in the header selects which bits the kernel
    /// computes; an unordered compare forces `LT` and `EQ` on wherever
    /// the mask requested them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FcmpFlags: u32 {
        const LT = 1 << 0;
        const UNORDERED = 1 << 1;
        const EQ = 1 << 2;
    }
}

/// Result widths an operation header may carry, in bytes.
pub const VALID_OP_SIZES: [u8; 5] = [1, 2, 4, 8, 16];

/// Per-lane widths a vector header may carry, in bytes.
pub const VALID_ELEMENT_SIZES: [u8; 4] = [1, 2, 4, 8];
