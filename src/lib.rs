//! # Introduction
//!
//! umtty runs programs written for the Universal Machine: a register machine
//! with eight 32-bit registers, fourteen instructions, and a heap of
//! independently sized platter arrays. Programs talk to the outside world only
//! through character input and output.
//!
//! ## Execution pipeline
//!
//! ```text
//! Image → Loader → Machine ⇄ Console (stdin/stdout, session events, TUI)
//! ```
//!
//! 1. [`loader`]: decodes a big-endian program image into platters.
//! 2. [`machine`]: fetches, decodes and executes instructions; suspends on
//!    input the console cannot provide yet.
//! 3. [`memory`]: the register file and the array heap with deterministic
//!    identifier reuse.
//! 4. [`snapshot`]: the diagnostic state dump reported on fatal faults and a
//!    [`snapshot::MockTerminal`] console for tests.
//! 5. [`session`]: request/event host owning one machine per session.
//! 6. [`ui`]: ratatui-based console front end; not part of the stable
//!    library API.

pub mod loader;
pub mod machine;
pub mod memory;
pub mod session;
pub mod snapshot;
pub mod ui;
