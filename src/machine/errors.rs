//! Runtime error types for the Universal Machine
//!
//! This module defines [`MachineError`], which represents every fault a running
//! program can trigger (as opposed to loader or host errors).
//!
//! All machine errors are fatal - they stop execution after the diagnostic
//! [`Snapshot`](crate::snapshot::Snapshot) has been reported to the console.

use std::io;
use thiserror::Error;

/// Fatal faults raised while executing a program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// Decoded opcode is outside 0-13
    #[error("Invalid opcode {opcode} in instruction 0x{word:08x}")]
    InvalidOpcode { opcode: u32, word: u32 },

    /// Fetch offset lies outside the program array
    #[error("Invalid program counter {pc}: program array holds {len} platters")]
    InvalidProgramCounter { pc: u32, len: usize },

    /// Identifier names no live array
    #[error("Invalid array index: {id} is not an allocated array")]
    InvalidArrayIndex { id: u32 },

    /// Offset outside the target array
    #[error("Invalid offset {offset} in array {id} of size {len}")]
    InvalidOffset { id: u32, offset: u32, len: usize },

    /// Division with a zero divisor
    #[error("Division by zero")]
    DivisionByZero,

    /// Abandonment of an identifier that is not allocated
    #[error("Can't free unallocated array {id}")]
    DoubleFree { id: u32 },

    /// Load-program naming an array that is not allocated
    #[error("Invalid program array: {id}")]
    InvalidProgramArray { id: u32 },

    /// Allocation larger than the host can provide
    #[error("Cannot allocate an array of {len} platters")]
    AllocationFailed { len: u32 },

    /// The console could not emit output
    #[error("Output failed: {kind}")]
    OutputFailed { kind: io::ErrorKind },
}

impl MachineError {
    /// Short name of the fault, as shown in the TUI status bar
    pub fn kind(&self) -> &'static str {
        match self {
            MachineError::InvalidOpcode { .. } => "InvalidOpcode",
            MachineError::InvalidProgramCounter { .. } => "InvalidProgramCounter",
            MachineError::InvalidArrayIndex { .. } => "InvalidArrayIndex",
            MachineError::InvalidOffset { .. } => "InvalidOffset",
            MachineError::DivisionByZero => "DivisionByZero",
            MachineError::DoubleFree { .. } => "DoubleFree",
            MachineError::InvalidProgramArray { .. } => "InvalidProgramArray",
            MachineError::AllocationFailed { .. } => "AllocationFailed",
            MachineError::OutputFailed { .. } => "OutputFailed",
        }
    }
}

impl From<io::Error> for MachineError {
    fn from(error: io::Error) -> Self {
        MachineError::OutputFailed { kind: error.kind() }
    }
}
