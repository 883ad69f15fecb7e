use std::fmt;

/// Value-producing IR opcodes.
///
/// Every opcode here writes exactly one result slot. Control flow,
/// guest memory access and syscalls are block terminators owned by the
/// surrounding executor and never appear in this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    // -- Meta --
    Constant = 0,
    InlineConstant,
    EntrypointOffset,
    InlineEntrypointOffset,
    CycleCounter,

    // -- Scalar integer ALU --
    Add,
    Sub,
    Neg,
    Mul,
    UMul,
    MulH,
    UMulH,
    Div,
    UDiv,
    Rem,
    URem,
    // "Long" division: dividend split across two sources.
    LDiv,
    LUDiv,
    LRem,
    LURem,
    Or,
    And,
    Andn,
    Xor,
    Not,

    // -- Shifts and bit manipulation --
    Lshl,
    Lshr,
    Ashr,
    Ror,
    Extr,
    Bfi,
    Bfe,
    Sbfe,
    PDep,
    PExt,
    Popcount,
    FindLsb,
    FindMsb,
    FindTrailingZeros,
    CountLeadingZeroes,
    Rev,

    // -- Selects and conversions --
    Select,
    FCmp,
    FloatToGprZS,
    FloatToGprS,
    TruncElementPair,
    VExtractToGpr,

    // -- Vector data movement --
    VectorZero,
    VectorImm,
    SplatVector2,
    SplatVector4,
    VMov,
    VBitcast,

    // -- Vector bitwise (full 128-bit register) --
    VAnd,
    VBic,
    VOr,
    VXor,
    VNot,
    VBsl,

    // -- Vector integer arithmetic --
    VAdd,
    VSub,
    VUMul,
    VSMul,
    VUQAdd,
    VUQSub,
    VSQAdd,
    VSQSub,
    VUMin,
    VSMin,
    VUMax,
    VSMax,
    VURAvg,
    VNeg,
    VAbs,
    VPopcount,
    VAddP,
    VAddV,
    VUMinV,
    VUMull,
    VSMull,
    VUMull2,
    VSMull2,
    VUABDL,

    // -- Vector shifts --
    VUShl,
    VUShr,
    VSShr,
    VUShlS,
    VUShrS,
    VSShrS,
    VShlI,
    VUShrI,
    VSShrI,
    VSli,
    VSri,
    VUShrNI,
    VUShrNI2,

    // -- Vector compares (mask results) --
    VCmpEq,
    VCmpEqZ,
    VCmpGt,
    VCmpGtZ,
    VCmpLtZ,
    VFCmpEq,
    VFCmpNeq,
    VFCmpLt,
    VFCmpGt,
    VFCmpLe,
    VFCmpOrd,
    VFCmpUno,

    // -- Vector float arithmetic --
    VFAdd,
    VFAddP,
    VFSub,
    VFMul,
    VFDiv,
    VFMin,
    VFMax,
    VFRecp,
    VFSqrt,
    VFRSqrt,
    VFNeg,

    // -- Vector widen / narrow --
    VSxtl,
    VSxtl2,
    VUxtl,
    VUxtl2,
    VSQXtn,
    VSQXtn2,
    VSQXtun,
    VSQXtun2,

    // -- Vector shuffles --
    VZip,
    VZip2,
    VUnZip,
    VUnZip2,
    VExtr,
    VTbl1,
    VRev64,
    VDupElement,
    VExtractElement,
    VInsElement,
    VInsScalarElement,

    // Sentinel — must be last
    Count,
}

/// Flags describing properties of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpFlags(u8);

impl OpFlags {
    pub const NONE: OpFlags = OpFlags(0);
    /// Operates elementwise over lanes; ElementSize is meaningful.
    pub const VECTOR: OpFlags = OpFlags(0x01);
    /// Interprets lanes (or scalar sources) as float/double.
    pub const FLOAT: OpFlags = OpFlags(0x02);
    /// No work at interpretation time; consumers inline the value.
    pub const NOP: OpFlags = OpFlags(0x04);
    /// Observes host state (clock); cannot be constant-folded.
    pub const SIDE_EFFECTS: OpFlags = OpFlags(0x08);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: OpFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Static definition of an opcode — source-argument count and flags.
#[derive(Debug, Clone, Copy)]
pub struct OpDef {
    pub name: &'static str,
    pub nargs: u8,
    pub flags: OpFlags,
}

const N: OpFlags = OpFlags::NONE;
const V: OpFlags = OpFlags::VECTOR;
const F: OpFlags = OpFlags::FLOAT;
const NOP: OpFlags = OpFlags::NOP;
const SE: OpFlags = OpFlags::SIDE_EFFECTS;

// Helper to combine flags in const context.
const fn f(a: OpFlags, b: OpFlags) -> OpFlags {
    OpFlags(a.0 | b.0)
}

// Helper to keep the table one line per opcode.
const fn d(name: &'static str, nargs: u8, flags: OpFlags) -> OpDef {
    OpDef { name, nargs, flags }
}

/// Static opcode definition table, indexed by `Opcode as usize`.
pub static OPCODE_DEFS: [OpDef; Opcode::Count as usize] = [
    // Meta
    d("constant", 0, N),
    d("inline_constant", 0, NOP),
    d("entrypoint_offset", 0, N),
    d("inline_entrypoint_offset", 0, NOP),
    d("cycle_counter", 0, SE),
    // Scalar integer ALU
    d("add", 2, N),
    d("sub", 2, N),
    d("neg", 1, N),
    d("mul", 2, N),
    d("umul", 2, N),
    d("mulh", 2, N),
    d("umulh", 2, N),
    d("div", 2, N),
    d("udiv", 2, N),
    d("rem", 2, N),
    d("urem", 2, N),
    d("ldiv", 3, N),
    d("ludiv", 3, N),
    d("lrem", 3, N),
    d("lurem", 3, N),
    d("or", 2, N),
    d("and", 2, N),
    d("andn", 2, N),
    d("xor", 2, N),
    d("not", 1, N),
    // Shifts and bit manipulation
    d("lshl", 2, N),
    d("lshr", 2, N),
    d("ashr", 2, N),
    d("ror", 2, N),
    d("extr", 2, N),
    d("bfi", 2, N),
    d("bfe", 1, N),
    d("sbfe", 1, N),
    d("pdep", 2, N),
    d("pext", 2, N),
    d("popcount", 1, N),
    d("findlsb", 1, N),
    d("findmsb", 1, N),
    d("findtrailingzeros", 1, N),
    d("countleadingzeroes", 1, N),
    d("rev", 1, N),
    // Selects and conversions
    d("select", 4, N),
    d("fcmp", 2, F),
    d("float_togpr_zs", 1, F),
    d("float_togpr_s", 1, F),
    d("truncelementpair", 1, N),
    d("vextracttogpr", 1, V),
    // Vector data movement
    d("vectorzero", 0, V),
    d("vectorimm", 0, V),
    d("splatvector2", 1, V),
    d("splatvector4", 1, V),
    d("vmov", 1, V),
    d("vbitcast", 1, V),
    // Vector bitwise
    d("vand", 2, V),
    d("vbic", 2, V),
    d("vor", 2, V),
    d("vxor", 2, V),
    d("vnot", 1, V),
    d("vbsl", 3, V),
    // Vector integer arithmetic
    d("vadd", 2, V),
    d("vsub", 2, V),
    d("vumul", 2, V),
    d("vsmul", 2, V),
    d("vuqadd", 2, V),
    d("vuqsub", 2, V),
    d("vsqadd", 2, V),
    d("vsqsub", 2, V),
    d("vumin", 2, V),
    d("vsmin", 2, V),
    d("vumax", 2, V),
    d("vsmax", 2, V),
    d("vuravg", 2, V),
    d("vneg", 1, V),
    d("vabs", 1, V),
    d("vpopcount", 1, V),
    d("vaddp", 2, V),
    d("vaddv", 1, V),
    d("vuminv", 1, V),
    d("vumull", 2, V),
    d("vsmull", 2, V),
    d("vumull2", 2, V),
    d("vsmull2", 2, V),
    d("vuabdl", 2, V),
    // Vector shifts
    d("vushl", 2, V),
    d("vushr", 2, V),
    d("vsshr", 2, V),
    d("vushls", 2, V),
    d("vushrs", 2, V),
    d("vsshrs", 2, V),
    d("vshli", 1, V),
    d("vushri", 1, V),
    d("vsshri", 1, V),
    d("vsli", 1, V),
    d("vsri", 1, V),
    d("vushrni", 1, V),
    d("vushrni2", 2, V),
    // Vector compares
    d("vcmpeq", 2, V),
    d("vcmpeqz", 1, V),
    d("vcmpgt", 2, V),
    d("vcmpgtz", 1, V),
    d("vcmpltz", 1, V),
    d("vfcmpeq", 2, f(V, F)),
    d("vfcmpneq", 2, f(V, F)),
    d("vfcmplt", 2, f(V, F)),
    d("vfcmpgt", 2, f(V, F)),
    d("vfcmple", 2, f(V, F)),
    d("vfcmpord", 2, f(V, F)),
    d("vfcmpuno", 2, f(V, F)),
    // Vector float arithmetic
    d("vfadd", 2, f(V, F)),
    d("vfaddp", 2, f(V, F)),
    d("vfsub", 2, f(V, F)),
    d("vfmul", 2, f(V, F)),
    d("vfdiv", 2, f(V, F)),
    d("vfmin", 2, f(V, F)),
    d("vfmax", 2, f(V, F)),
    d("vfrecp", 1, f(V, F)),
    d("vfsqrt", 1, f(V, F)),
    d("vfrsqrt", 1, f(V, F)),
    d("vfneg", 1, f(V, F)),
    // Vector widen / narrow
    d("vsxtl", 1, V),
    d("vsxtl2", 1, V),
    d("vuxtl", 1, V),
    d("vuxtl2", 1, V),
    d("vsqxtn", 1, V),
    d("vsqxtn2", 2, V),
    d("vsqxtun", 1, V),
    d("vsqxtun2", 2, V),
    // Vector shuffles
    d("vzip", 2, V),
    d("vzip2", 2, V),
    d("vunzip", 2, V),
    d("vunzip2", 2, V),
    d("vextr", 2, V),
    d("vtbl1", 2, V),
    d("vrev64", 1, V),
    d("vdupelement", 1, V),
    d("vextractelement", 1, V),
    d("vinselement", 2, V),
    d("vinsscalarelement", 2, V),
];

impl Opcode {
    /// Look up the static definition for this opcode.
    pub fn def(self) -> &'static OpDef {
        &OPCODE_DEFS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn is_vector(self) -> bool {
        self.def().flags.contains(OpFlags::VECTOR)
    }

    pub fn is_float(self) -> bool {
        self.def().flags.contains(OpFlags::FLOAT)
    }

    pub fn is_nop(self) -> bool {
        self.def().flags.contains(OpFlags::NOP)
    }
}

// Display via the definition table so IR dumps and panic messages use
// the canonical lowercase spelling.
impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
