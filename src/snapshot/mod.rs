// Diagnostic snapshots and the mock console

use crate::machine::console::{Console, LineRead};
use crate::machine::constants::REGISTER_COUNT;
use std::collections::VecDeque;
use std::fmt;
use std::io;

/// Machine state captured when a fatal fault occurs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub registers: [u32; REGISTER_COUNT],
    pub pc: u32,
    pub cycle: u64,
    /// Last platter fetched from the program array, if any
    pub last_word: Option<u32>,
}

impl Snapshot {
    /// Opcode of the last fetched platter
    pub fn last_opcode(&self) -> Option<u32> {
        self.last_word.map(|word| word >> 28)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========== MACHINE STATE ===========")?;
        for (i, value) in self.registers.iter().enumerate() {
            writeln!(f, "REG {}: {}", i, value)?;
        }
        writeln!(f, "PC: {}", self.pc)?;
        writeln!(f, "CYCLE: {}", self.cycle)?;
        match (self.last_word, self.last_opcode()) {
            (Some(word), Some(op)) => writeln!(f, "LAST INST CODE: {:08x} (op {})", word, op)?,
            _ => writeln!(f, "LAST INST CODE: none")?,
        }
        write!(f, "====================================")
    }
}

/// Mock console that records output and replays scripted input lines
#[derive(Debug, Clone, Default)]
pub struct MockTerminal {
    pub output: Vec<u8>,
    pub lines: VecDeque<Vec<u8>>,
    /// Once the scripted lines run out: end of input if set, otherwise pending
    pub end_of_input: bool,
    pub line_requests: usize,
    pub halts: usize,
    pub faults: Vec<Snapshot>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console that answers with `lines` and then reports end of input
    pub fn with_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        MockTerminal {
            lines: lines.into_iter().map(Into::into).collect(),
            end_of_input: true,
            ..Self::default()
        }
    }

    /// Queue another line of input
    pub fn push_line(&mut self, line: impl Into<Vec<u8>>) {
        self.lines.push_back(line.into());
    }

    /// Output decoded as text, invalid UTF-8 replaced
    pub fn get_output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Console for MockTerminal {
    fn read_line(&mut self) -> LineRead {
        self.line_requests += 1;
        match self.lines.pop_front() {
            Some(line) => LineRead::Line(line),
            None if self.end_of_input => LineRead::EndOfInput,
            None => LineRead::Pending,
        }
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }

    fn on_halt(&mut self) -> io::Result<()> {
        self.halts += 1;
        Ok(())
    }

    fn on_fault(&mut self, snapshot: &Snapshot) {
        self.faults.push(snapshot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_display() {
        let snapshot = Snapshot {
            registers: [1, 2, 3, 4, 5, 6, 7, 8],
            pc: 12,
            cycle: 40,
            last_word: Some(0x5000_0001),
        };
        let text = snapshot.to_string();
        assert!(text.contains("REG 7: 8"));
        assert!(text.contains("PC: 12"));
        assert!(text.contains("CYCLE: 40"));
        assert!(text.contains("LAST INST CODE: 50000001 (op 5)"));
    }

    #[test]
    fn test_mock_terminal_script() {
        let mut terminal = MockTerminal::with_lines(["hi\n"]);
        assert_eq!(terminal.read_line(), LineRead::Line(b"hi\n".to_vec()));
        assert_eq!(terminal.read_line(), LineRead::EndOfInput);

        let mut pending = MockTerminal::new();
        assert_eq!(pending.read_line(), LineRead::Pending);
        assert_eq!(pending.line_requests, 1);
    }
}
