// Helpers for assembling test programs

#![allow(dead_code)]

use umtty::machine::Instruction;

pub fn ortho(a: usize, value: u32) -> u32 {
    Instruction::Orthography { a, value }.encode()
}

pub fn halt() -> u32 {
    Instruction::Halt.encode()
}

pub fn out(c: usize) -> u32 {
    Instruction::Output { c }.encode()
}

pub fn input(c: usize) -> u32 {
    Instruction::Input { c }.encode()
}

/// Emit instructions that leave an arbitrary 32-bit `value` in `reg`,
/// clobbering `scratch`
pub fn load_const(program: &mut Vec<u32>, reg: usize, scratch: usize, value: u32) {
    program.push(ortho(reg, value >> 16));
    program.push(ortho(scratch, 1 << 16));
    program.push(Instruction::Multiplication { a: reg, b: reg, c: scratch }.encode());
    program.push(ortho(scratch, value & 0xFFFF));
    program.push(Instruction::Addition { a: reg, b: reg, c: scratch }.encode());
}
