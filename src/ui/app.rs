//! Main TUI application state and logic

use crate::machine::constants::DEFAULT_SLICE_CYCLES;
use crate::machine::MachineError;
use crate::session::{Event as SessionEvent, Request, Session, Status};
use crate::snapshot::Snapshot;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// Oldest console lines are dropped beyond this many
pub const SCROLLBACK_LINES: usize = 10_000;

/// Program output split into lines for the console pane
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    lines: VecDeque<String>,
    current: Vec<u8>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw output bytes
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if byte == b'\n' {
                let line = String::from_utf8_lossy(&self.current).into_owned();
                self.push_line(line);
                self.current.clear();
            } else {
                self.current.push(byte);
            }
        }
    }

    /// Append a host notice on a line of its own
    pub fn push_notice(&mut self, notice: &str) {
        if !self.current.is_empty() {
            self.push_bytes(b"\n");
        }
        self.push_line(notice.to_string());
    }

    fn push_line(&mut self, line: String) {
        if self.lines.len() == SCROLLBACK_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Complete lines plus the unterminated tail, if any
    pub fn lines(&self) -> impl Iterator<Item = Cow<'_, str>> {
        let tail = (!self.current.is_empty()).then(|| String::from_utf8_lossy(&self.current));
        self.lines
            .iter()
            .map(|line| Cow::Borrowed(line.as_str()))
            .chain(tail)
    }

    pub fn len(&self) -> usize {
        self.lines.len() + usize::from(!self.current.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The main application state
pub struct App {
    /// Session owning the running machine
    pub session: Session,

    /// Name shown in the console title
    pub program_name: String,

    /// Everything the program printed
    pub console: ConsoleLog,

    /// Text typed into the input line
    pub input: String,

    /// Whether the machine asked for a line and the input line accepts keys
    pub input_enabled: bool,

    /// Console scroll offset (usize::MAX sticks to the bottom)
    pub console_scroll: usize,

    /// Machine pane scroll offset over the live array list
    pub heap_scroll: usize,

    /// Status of the session after the last pump
    pub status: Status,

    /// Fault reported by the session, if any
    pub fault: Option<(MachineError, Snapshot)>,

    /// Instructions executed between redraws
    pub slice: u64,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create a new app around a session that already has a program loaded
    pub fn new(session: Session, program_name: String) -> Self {
        let status = session.status();
        let mut app = App {
            session,
            program_name,
            console: ConsoleLog::new(),
            input: String::new(),
            input_enabled: false,
            console_scroll: usize::MAX,
            heap_scroll: 0,
            status,
            fault: None,
            slice: DEFAULT_SLICE_CYCLES,
            should_quit: false,
            status_message: String::from("Running..."),
        };
        app.absorb_events();
        app
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            if self.status == Status::Running {
                self.pump();
            }

            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Keep the machine busy while it runs, otherwise idle on input
            let timeout = if self.status == Status::Running {
                Duration::ZERO
            } else {
                Duration::from_millis(50)
            };

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Execute one slice and fold the resulting events into the UI state
    pub fn pump(&mut self) {
        self.status = self.session.pump(Some(self.slice));
        self.absorb_events();
    }

    fn absorb_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                SessionEvent::ProgramLoaded { platters } => {
                    self.console.push_notice("*** PROGRAM LOADED ***");
                    self.status_message = format!("Loaded {} platters", platters);
                }
                SessionEvent::Print(bytes) => {
                    self.console.push_bytes(&bytes);
                    self.console_scroll = usize::MAX;
                }
                SessionEvent::ReadLine => {
                    self.input_enabled = true;
                    self.status_message = "Waiting for input".to_string();
                }
                SessionEvent::Halted => {
                    self.console.push_notice("*** HALTED ***");
                    self.console_scroll = usize::MAX;
                    self.status_message = "Program halted".to_string();
                }
                SessionEvent::Fault { error, snapshot } => {
                    self.status_message = format!("{}: {}", error.kind(), error);
                    self.fault = Some((error, snapshot));
                }
            }
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(main_chunks[0]);

        // Left column: console (top) | input line (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(columns[0]);

        super::panes::render_console_pane(
            frame,
            left_rows[0],
            &self.console,
            &self.program_name,
            &mut self.console_scroll,
        );

        super::panes::render_input_line(frame, left_rows[1], &self.input, self.input_enabled);

        super::panes::render_machine_pane(
            frame,
            columns[1],
            self.session.machine(),
            self.fault.as_ref().map(|(_, snapshot)| snapshot),
            &mut self.heap_scroll,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.status,
            self.session.machine().map_or(0, |m| m.cycle()),
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('d') if ctrl => self.close_input(),
            KeyCode::PageUp => {
                let top = self.console.len().saturating_sub(1);
                self.console_scroll = self.console_scroll.min(top).saturating_sub(10);
            }
            KeyCode::PageDown => {
                self.console_scroll = self.console_scroll.saturating_add(10);
            }
            KeyCode::Up => {
                self.heap_scroll = self.heap_scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                self.heap_scroll = self.heap_scroll.saturating_add(1);
            }
            KeyCode::Enter if self.input_enabled => self.submit_line(),
            KeyCode::Backspace if self.input_enabled => {
                self.input.pop();
            }
            KeyCode::Char(c) if self.input_enabled && !ctrl => {
                self.input.push(c);
            }
            _ => {}
        }
    }

    /// Send the typed line, newline included, and resume the machine
    fn submit_line(&mut self) {
        let mut line = std::mem::take(&mut self.input).into_bytes();
        line.push(b'\n');

        // Echo the submitted line
        self.console.push_bytes(&line);
        self.console_scroll = usize::MAX;

        self.deliver(Request::ReadLineDone(line));
    }

    fn close_input(&mut self) {
        self.input.clear();
        self.deliver(Request::EndOfInput);
    }

    fn deliver(&mut self, request: Request) {
        match self.session.handle(request) {
            Ok(()) => {
                self.input_enabled = false;
                if self.status == Status::AwaitingInput {
                    self.status = Status::Running;
                }
                self.status_message = "Running...".to_string();
            }
            Err(e) => {
                self.status_message = format!("Error: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::bytes_from_words;
    use crate::machine::Instruction;
    use ratatui::backend::TestBackend;

    fn echo_session() -> Session {
        let program = [
            Instruction::Input { c: 0 }.encode(),
            Instruction::Output { c: 0 }.encode(),
            Instruction::Halt.encode(),
        ];
        let mut session = Session::new();
        session
            .handle(Request::LoadProgram(bytes_from_words(&program)))
            .unwrap();
        session
    }

    fn text(log: &ConsoleLog) -> Vec<String> {
        log.lines().map(Cow::into_owned).collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_console_log_lines() {
        let mut log = ConsoleLog::new();
        log.push_bytes(b"one\ntw");
        assert_eq!(text(&log), vec!["one".to_string(), "tw".to_string()]);
        log.push_bytes(b"o\n");
        assert_eq!(log.len(), 2);
        log.push_notice("*** HALTED ***");
        assert_eq!(text(&log)[2], "*** HALTED ***");
    }

    #[test]
    fn test_console_log_scrollback_is_bounded() {
        let mut log = ConsoleLog::new();
        for i in 0..SCROLLBACK_LINES + 5 {
            log.push_bytes(format!("{}\n", i).as_bytes());
        }
        log.push_bytes(b"tail");

        assert_eq!(log.len(), SCROLLBACK_LINES + 1);
        let lines = text(&log);
        assert_eq!(lines[0], "5");
        assert_eq!(lines[SCROLLBACK_LINES], "tail");
    }

    #[test]
    fn test_input_round_trip() {
        let mut app = App::new(echo_session(), "echo.um".to_string());
        assert_eq!(text(&app.console), vec!["*** PROGRAM LOADED ***".to_string()]);

        app.pump();
        assert_eq!(app.status, Status::AwaitingInput);
        assert!(app.input_enabled);

        app.handle_key_event(key(KeyCode::Char('x')));
        app.handle_key_event(key(KeyCode::Enter));
        assert!(!app.input_enabled);
        assert_eq!(app.status, Status::Running);

        app.pump();
        assert_eq!(app.status, Status::Halted);
        let lines = text(&app.console);
        assert_eq!(lines[1], "x");
        assert_eq!(lines[2], "x");
        assert_eq!(lines[3], "*** HALTED ***");
    }

    #[test]
    fn test_keys_ignored_until_requested() {
        let mut app = App::new(echo_session(), "echo.um".to_string());
        app.handle_key_event(key(KeyCode::Char('x')));
        assert!(app.input.is_empty());
        app.handle_key_event(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_smoke() {
        let mut app = App::new(echo_session(), "echo.um".to_string());
        app.pump();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
    }
}
