//! Instruction decoding and encoding
//!
//! Every instruction is a single 32-bit platter. Two layouts exist:
//!
//! ```text
//! operate form        [ op:4 | unused:19 | A:3 | B:3 | C:3 ]
//! orthography (13)    [ 13:4 | A:3 | value:25           ]
//! ```
//!
//! Decoding produces an [`Instruction`] carrying only the operands its operator
//! reads, so dispatch is a plain `match` over a closed set of 14 variants.

use super::constants::{
    OPCODE_SHIFT, ORTHOGRAPHY_REG_SHIFT, ORTHOGRAPHY_VALUE_MASK, REG_A_SHIFT, REG_B_SHIFT,
    REG_C_SHIFT, REG_MASK,
};
use super::errors::MachineError;
use std::fmt;

/// A decoded instruction. Register operands are indices 0-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ConditionalMove { a: usize, b: usize, c: usize },
    ArrayIndex { a: usize, b: usize, c: usize },
    ArrayAmendment { a: usize, b: usize, c: usize },
    Addition { a: usize, b: usize, c: usize },
    Multiplication { a: usize, b: usize, c: usize },
    Division { a: usize, b: usize, c: usize },
    NotAnd { a: usize, b: usize, c: usize },
    Halt,
    Allocation { b: usize, c: usize },
    Abandonment { c: usize },
    Output { c: usize },
    Input { c: usize },
    LoadProgram { b: usize, c: usize },
    Orthography { a: usize, value: u32 },
}

fn field(word: u32, shift: u32) -> usize {
    ((word >> shift) & REG_MASK) as usize
}

impl Instruction {
    /// Decode one platter
    pub fn decode(word: u32) -> Result<Self, MachineError> {
        let opcode = word >> OPCODE_SHIFT;
        let a = field(word, REG_A_SHIFT);
        let b = field(word, REG_B_SHIFT);
        let c = field(word, REG_C_SHIFT);

        let instruction = match opcode {
            0 => Instruction::ConditionalMove { a, b, c },
            1 => Instruction::ArrayIndex { a, b, c },
            2 => Instruction::ArrayAmendment { a, b, c },
            3 => Instruction::Addition { a, b, c },
            4 => Instruction::Multiplication { a, b, c },
            5 => Instruction::Division { a, b, c },
            6 => Instruction::NotAnd { a, b, c },
            7 => Instruction::Halt,
            8 => Instruction::Allocation { b, c },
            9 => Instruction::Abandonment { c },
            10 => Instruction::Output { c },
            11 => Instruction::Input { c },
            12 => Instruction::LoadProgram { b, c },
            13 => Instruction::Orthography {
                a: field(word, ORTHOGRAPHY_REG_SHIFT),
                value: word & ORTHOGRAPHY_VALUE_MASK,
            },
            _ => return Err(MachineError::InvalidOpcode { opcode, word }),
        };

        Ok(instruction)
    }

    /// The 4-bit opcode of this instruction
    pub fn opcode(&self) -> u32 {
        match self {
            Instruction::ConditionalMove { .. } => 0,
            Instruction::ArrayIndex { .. } => 1,
            Instruction::ArrayAmendment { .. } => 2,
            Instruction::Addition { .. } => 3,
            Instruction::Multiplication { .. } => 4,
            Instruction::Division { .. } => 5,
            Instruction::NotAnd { .. } => 6,
            Instruction::Halt => 7,
            Instruction::Allocation { .. } => 8,
            Instruction::Abandonment { .. } => 9,
            Instruction::Output { .. } => 10,
            Instruction::Input { .. } => 11,
            Instruction::LoadProgram { .. } => 12,
            Instruction::Orthography { .. } => 13,
        }
    }

    /// Encode back into a platter.
    ///
    /// Register operands are masked to three bits and the orthography value to
    /// 25 bits, so out-of-range operands are truncated rather than rejected.
    pub fn encode(&self) -> u32 {
        let op = self.opcode() << OPCODE_SHIFT;
        let abc = |a: usize, b: usize, c: usize| {
            op | ((a as u32 & REG_MASK) << REG_A_SHIFT)
                | ((b as u32 & REG_MASK) << REG_B_SHIFT)
                | ((c as u32 & REG_MASK) << REG_C_SHIFT)
        };

        match *self {
            Instruction::ConditionalMove { a, b, c }
            | Instruction::ArrayIndex { a, b, c }
            | Instruction::ArrayAmendment { a, b, c }
            | Instruction::Addition { a, b, c }
            | Instruction::Multiplication { a, b, c }
            | Instruction::Division { a, b, c }
            | Instruction::NotAnd { a, b, c } => abc(a, b, c),
            Instruction::Halt => op,
            Instruction::Allocation { b, c } | Instruction::LoadProgram { b, c } => abc(0, b, c),
            Instruction::Abandonment { c } | Instruction::Output { c } | Instruction::Input { c } => {
                abc(0, 0, c)
            }
            Instruction::Orthography { a, value } => {
                op | ((a as u32 & REG_MASK) << ORTHOGRAPHY_REG_SHIFT)
                    | (value & ORTHOGRAPHY_VALUE_MASK)
            }
        }
    }

    /// Mnemonic used by diagnostics and the machine pane
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::ConditionalMove { .. } => "cmov",
            Instruction::ArrayIndex { .. } => "index",
            Instruction::ArrayAmendment { .. } => "amend",
            Instruction::Addition { .. } => "add",
            Instruction::Multiplication { .. } => "mul",
            Instruction::Division { .. } => "div",
            Instruction::NotAnd { .. } => "nand",
            Instruction::Halt => "halt",
            Instruction::Allocation { .. } => "alloc",
            Instruction::Abandonment { .. } => "free",
            Instruction::Output { .. } => "out",
            Instruction::Input { .. } => "in",
            Instruction::LoadProgram { .. } => "load",
            Instruction::Orthography { .. } => "ortho",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.mnemonic();
        match *self {
            Instruction::ConditionalMove { a, b, c }
            | Instruction::ArrayIndex { a, b, c }
            | Instruction::ArrayAmendment { a, b, c }
            | Instruction::Addition { a, b, c }
            | Instruction::Multiplication { a, b, c }
            | Instruction::Division { a, b, c }
            | Instruction::NotAnd { a, b, c } => write!(f, "{} r{}, r{}, r{}", name, a, b, c),
            Instruction::Halt => write!(f, "{}", name),
            Instruction::Allocation { b, c } | Instruction::LoadProgram { b, c } => {
                write!(f, "{} r{}, r{}", name, b, c)
            }
            Instruction::Abandonment { c } | Instruction::Output { c } | Instruction::Input { c } => {
                write!(f, "{} r{}", name, c)
            }
            Instruction::Orthography { a, value } => write!(f, "{} r{}, {}", name, a, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_operate_fields() {
        // opcode 3, A=1, B=2, C=3
        let word = (3 << 28) | (1 << 6) | (2 << 3) | 3;
        assert_eq!(
            Instruction::decode(word),
            Ok(Instruction::Addition { a: 1, b: 2, c: 3 })
        );
    }

    #[test]
    fn test_decode_ignores_unused_bits() {
        let word = (10 << 28) | 0x00FF_FE00 | 5;
        assert_eq!(Instruction::decode(word), Ok(Instruction::Output { c: 5 }));
    }

    #[test]
    fn test_decode_orthography() {
        let word = (13 << 28) | (7 << 25) | 0x1FF_FFFF;
        assert_eq!(
            Instruction::decode(word),
            Ok(Instruction::Orthography {
                a: 7,
                value: 0x1FF_FFFF
            })
        );
    }

    #[test]
    fn test_decode_rejects_unknown_opcodes() {
        for opcode in [14u32, 15] {
            let word = (opcode << 28) | 0x1234;
            assert_eq!(
                Instruction::decode(word),
                Err(MachineError::InvalidOpcode { opcode, word })
            );
        }
    }

    #[test]
    fn test_encode_matches_decode() {
        let samples = [
            Instruction::ConditionalMove { a: 7, b: 0, c: 4 },
            Instruction::NotAnd { a: 1, b: 1, c: 1 },
            Instruction::Halt,
            Instruction::Allocation { b: 2, c: 6 },
            Instruction::Input { c: 3 },
            Instruction::LoadProgram { b: 0, c: 5 },
            Instruction::Orthography { a: 4, value: 72 },
        ];
        for instruction in samples {
            assert_eq!(Instruction::decode(instruction.encode()), Ok(instruction));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Instruction::Addition { a: 0, b: 1, c: 2 }.to_string(),
            "add r0, r1, r2"
        );
        assert_eq!(
            Instruction::Orthography { a: 3, value: 72 }.to_string(),
            "ortho r3, 72"
        );
    }
}
