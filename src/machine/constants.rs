// Constants for the Universal Machine

/// Number of general-purpose registers
pub const REGISTER_COUNT: usize = 8;

/// Identifier of the program array (the only array instructions are fetched from)
pub const PROGRAM_ARRAY: u32 = 0;

/// Opcode lives in the top four bits of every instruction
pub const OPCODE_SHIFT: u32 = 28;

/// Shifts of the A, B and C register selectors in the operate form
pub const REG_A_SHIFT: u32 = 6;
pub const REG_B_SHIFT: u32 = 3;
pub const REG_C_SHIFT: u32 = 0;

/// Mask of a three-bit register selector
pub const REG_MASK: u32 = 0b111;

/// Target register shift of the orthography (immediate load) form
pub const ORTHOGRAPHY_REG_SHIFT: u32 = 25;

/// Mask of the 25-bit immediate of the orthography form
pub const ORTHOGRAPHY_VALUE_MASK: u32 = (1 << 25) - 1;

/// Value placed in the input register once input has ended
pub const END_OF_INPUT: u32 = 0xFFFF_FFFF;

/// Instructions executed per slice between TUI redraws
pub const DEFAULT_SLICE_CYCLES: u64 = 200_000;
