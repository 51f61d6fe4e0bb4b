//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`console`]: program output log and the input line
//! - [`machine`]: registers, program counter, and live arrays
//! - [`status`]: status bar with keybindings and run state
//!
//! Each pane module exports a primary `render_*` function that takes the data
//! it shows by reference plus any scroll state it owns.

pub mod console;
pub mod machine;
pub mod status;

pub use console::{render_console_pane, render_input_line};
pub use machine::render_machine_pane;
pub use status::render_status_bar;
