//! Universal Machine execution core
//!
//! This module provides the interpreter itself:
//! - [`engine`]: the [`Machine`] fetch/decode/execute loop
//! - [`instruction`]: decoding (and encoding) of 32-bit instructions
//! - [`console`]: the collaborator trait for input, output and halting
//! - [`errors`]: fatal machine faults
//!
//! # Execution Model
//!
//! Execution is single-threaded and cooperative. [`Machine::run`] returns
//! when the program halts, faults, or executes an input instruction while no
//! input is buffered and the console cannot answer right away. In the last
//! case the machine stays suspended inside that input instruction; pushing
//! input and calling `run` again completes it without fetching it a second
//! time.

pub mod console;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod instruction;

pub use console::{Console, LineRead, StdConsole};
pub use engine::{Machine, Outcome, State};
pub use errors::MachineError;
pub use instruction::Instruction;
