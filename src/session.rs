//! Message-driven session host
//!
//! A [`Session`] owns one machine and talks to its embedder through requests
//! and events, the way a browser worker would:
//!
//! ```text
//! host ──Request::LoadProgram──▶ session ──Event::ProgramLoaded──▶ host
//! host ◀──Event::Print / ReadLine / Halted / Fault── session
//! host ──Request::ReadLineDone──▶ session   (resumes a suspended machine)
//! ```
//!
//! Nothing runs until the host calls [`Session::pump`], so the host decides
//! when execution happens and for how long. [`Sessions`] keeps several
//! independent sessions keyed by id; they share no mutable state.

use crate::loader::{self, LoadError};
use crate::machine::{Console, LineRead, Machine, MachineError, Outcome, State};
use crate::snapshot::Snapshot;
use rustc_hash::FxHashMap;
use std::io;
use thiserror::Error;

pub type SessionId = u64;

/// Messages from the host to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Replace the session's machine with a fresh one running this image
    LoadProgram(Vec<u8>),
    /// A line of input the machine asked for
    ReadLineDone(Vec<u8>),
    /// No more input will be delivered
    EndOfInput,
}

/// Messages from a session to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ProgramLoaded { platters: usize },
    /// Output bytes, in order; consecutive bytes are coalesced
    Print(Vec<u8>),
    /// The machine is suspended until a line of input arrives
    ReadLine,
    Halted,
    Fault {
        error: MachineError,
        snapshot: Snapshot,
    },
}

/// Where a session's machine stands after a pump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No program loaded
    Idle,
    /// Budget ran out; pump again to continue
    Running,
    AwaitingInput,
    Halted,
    Faulted,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No program loaded")]
    NoProgram,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Unknown session {0}")]
    UnknownSession(SessionId),
}

/// Console that turns machine callbacks into queued events
#[derive(Debug, Default)]
struct EventConsole {
    events: Vec<Event>,
    fault: Option<Snapshot>,
}

impl Console for EventConsole {
    fn read_line(&mut self) -> LineRead {
        self.events.push(Event::ReadLine);
        LineRead::Pending
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        if let Some(Event::Print(text)) = self.events.last_mut() {
            text.push(byte);
        } else {
            self.events.push(Event::Print(vec![byte]));
        }
        Ok(())
    }

    fn on_halt(&mut self) -> io::Result<()> {
        self.events.push(Event::Halted);
        Ok(())
    }

    fn on_fault(&mut self, snapshot: &Snapshot) {
        self.fault = Some(snapshot.clone());
    }
}

/// One machine and its event queue
#[derive(Default)]
pub struct Session {
    machine: Option<Machine>,
    console: EventConsole,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a host request. Loading replaces any running program.
    pub fn handle(&mut self, request: Request) -> Result<(), SessionError> {
        match request {
            Request::LoadProgram(image) => {
                let program = loader::words_from_bytes(&image)?;
                let platters = program.len();
                self.machine = Some(Machine::new(program));
                self.console.fault = None;
                self.console.events.push(Event::ProgramLoaded { platters });
            }
            Request::ReadLineDone(line) => {
                self.machine
                    .as_mut()
                    .ok_or(SessionError::NoProgram)?
                    .push_input(&line);
            }
            Request::EndOfInput => {
                self.machine
                    .as_mut()
                    .ok_or(SessionError::NoProgram)?
                    .close_input();
            }
        }
        Ok(())
    }

    /// Run the machine, for at most `budget` instructions when given
    pub fn pump(&mut self, budget: Option<u64>) -> Status {
        let Some(machine) = self.machine.as_mut() else {
            return Status::Idle;
        };
        if let State::Faulted(_) = machine.state() {
            return Status::Faulted;
        }

        let result = match budget {
            Some(limit) => machine.run_for(&mut self.console, limit),
            None => machine.run(&mut self.console),
        };

        match result {
            Ok(Outcome::Paused) => Status::Running,
            Ok(Outcome::AwaitingInput) => Status::AwaitingInput,
            Ok(Outcome::Halted) => Status::Halted,
            Err(error) => {
                let snapshot = self
                    .console
                    .fault
                    .take()
                    .unwrap_or_else(|| machine.snapshot());
                self.console.events.push(Event::Fault { error, snapshot });
                Status::Faulted
            }
        }
    }

    /// Current status without running anything
    pub fn status(&self) -> Status {
        match self.machine.as_ref().map(Machine::state) {
            None => Status::Idle,
            Some(State::Ready) => Status::Running,
            Some(State::AwaitingInput { .. }) => Status::AwaitingInput,
            Some(State::Halted) => Status::Halted,
            Some(State::Faulted(_)) => Status::Faulted,
        }
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.console.events)
    }

    pub fn machine(&self) -> Option<&Machine> {
        self.machine.as_ref()
    }
}

/// Independent sessions keyed by id
#[derive(Default)]
pub struct Sessions {
    sessions: FxHashMap<SessionId, Session>,
    next_id: SessionId,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an empty session and return its id
    pub fn open(&mut self) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(id, Session::new());
        id
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Route a request to a session
    pub fn handle(&mut self, id: SessionId, request: Request) -> Result<(), SessionError> {
        self.sessions
            .get_mut(&id)
            .ok_or(SessionError::UnknownSession(id))?
            .handle(request)
    }

    /// Drop a session and its machine
    pub fn close(&mut self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    /// Pump every session once, in id order
    pub fn pump_all(&mut self, budget: Option<u64>) -> Vec<(SessionId, Status)> {
        let mut ids: Vec<SessionId> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| {
                self.sessions
                    .get_mut(&id)
                    .map(|session| (id, session.pump(budget)))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
