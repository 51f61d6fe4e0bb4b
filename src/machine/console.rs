//! Console collaborators
//!
//! The machine's only contact with the outside world is the [`Console`] trait:
//! line-buffered input, byte output, the halt notification and the fault
//! report. Hosts implement it to wire the machine to stdin/stdout, a message
//! queue, or a TUI.

use crate::snapshot::Snapshot;
use std::io::{self, BufRead, Write};

/// Result of asking the console for a line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// A line of input, normally terminated by `\n`
    Line(Vec<u8>),
    /// Input will arrive later; the machine suspends
    Pending,
    /// No more input will ever arrive
    EndOfInput,
}

/// Collaborator interface the machine calls while running
pub trait Console {
    /// Request one line of input
    fn read_line(&mut self) -> LineRead;

    /// Emit one output byte. An error faults the machine.
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Called exactly once, when the halt instruction executes
    fn on_halt(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Push buffered output to its destination
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Receive the diagnostic snapshot of a fatal fault
    fn on_fault(&mut self, snapshot: &Snapshot) {
        eprintln!("{}", snapshot);
    }
}

/// Console bound to the process's stdin and stdout
///
/// Output is flushed at every newline, before every blocking read and on
/// halt. Write errors are returned to the machine; a flush that fails inside
/// `read_line` is held and returned by the next write or flush.
pub struct StdConsole<R, W> {
    input: R,
    output: W,
    error: Option<io::Error>,
}

impl StdConsole<io::StdinLock<'static>, io::StdoutLock<'static>> {
    /// Console over the locked process stdin and stdout
    pub fn stdio() -> Self {
        StdConsole::new(io::stdin().lock(), io::stdout().lock())
    }
}

impl<R: BufRead, W: Write> StdConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        StdConsole {
            input,
            output,
            error: None,
        }
    }

    /// Give back the underlying output sink
    pub fn into_output(self) -> W {
        self.output
    }

    fn take_error(&mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<R: BufRead, W: Write> Console for StdConsole<R, W> {
    fn read_line(&mut self) -> LineRead {
        // Prompts written without a newline must be visible before we block
        if let Err(e) = self.output.flush() {
            self.error.get_or_insert(e);
        }

        let mut line = Vec::new();
        match self.input.read_until(b'\n', &mut line) {
            Ok(0) | Err(_) => LineRead::EndOfInput,
            Ok(_) => LineRead::Line(line),
        }
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.take_error()?;
        self.output.write_all(&[byte])?;
        if byte == b'\n' {
            self.output.flush()?;
        }
        Ok(())
    }

    fn on_halt(&mut self) -> io::Result<()> {
        self.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.take_error()?;
        self.output.flush()
    }

    fn on_fault(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.flush() {
            eprintln!("Output error: {}", e);
        }
        eprintln!("{}", snapshot);
    }
}
