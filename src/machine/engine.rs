// Execution engine for the Universal Machine

use crate::machine::console::{Console, LineRead};
use crate::machine::constants::END_OF_INPUT;
use crate::machine::errors::MachineError;
use crate::machine::instruction::Instruction;
use crate::memory::{Heap, Registers};
use crate::snapshot::Snapshot;
use std::collections::VecDeque;

/// Where the machine stands between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Ready to fetch the next instruction
    Ready,
    /// Suspended inside an input instruction that targets `register`
    AwaitingInput { register: usize },
    /// The halt instruction has executed
    Halted,
    /// A fatal fault stopped execution
    Faulted(MachineError),
}

/// Why a run returned without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Halted,
    /// Suspended waiting for input; feed it with [`Machine::push_input`] and run again
    AwaitingInput,
    /// The cycle budget of [`Machine::run_for`] ran out
    Paused,
}

/// Result of executing a single instruction
enum Step {
    Continue,
    Halted,
    Suspended,
}

/// The Universal Machine
pub struct Machine {
    registers: Registers,

    /// Array 0 is the running program
    heap: Heap,

    /// Offset of the next platter to fetch from array 0
    pc: u32,

    /// Instructions executed so far
    cycle: u64,

    /// Bytes delivered by the host but not yet consumed by input instructions
    input: VecDeque<u8>,

    /// Host signaled that no more input will arrive
    input_closed: bool,

    state: State,

    /// Last platter fetched, kept for fault diagnostics
    last_word: Option<u32>,
}

impl Machine {
    /// Create a machine whose program array holds `program`, with the program
    /// counter at 0 and all registers cleared
    pub fn new(program: Vec<u32>) -> Self {
        Machine {
            registers: Registers::new(),
            heap: Heap::new(program),
            pc: 0,
            cycle: 0,
            input: VecDeque::new(),
            input_closed: false,
            state: State::Ready,
            last_word: None,
        }
    }

    /// Run until the program halts, suspends for input, or faults
    pub fn run<C: Console>(&mut self, console: &mut C) -> Result<Outcome, MachineError> {
        self.execute(console, None)
    }

    /// Like [`Machine::run`], but return [`Outcome::Paused`] after `budget`
    /// instructions
    pub fn run_for<C: Console>(
        &mut self,
        console: &mut C,
        budget: u64,
    ) -> Result<Outcome, MachineError> {
        self.execute(console, Some(budget))
    }

    fn execute<C: Console>(
        &mut self,
        console: &mut C,
        budget: Option<u64>,
    ) -> Result<Outcome, MachineError> {
        match self.state {
            State::Ready => {}
            State::Halted => return Ok(Outcome::Halted),
            State::Faulted(ref error) => return Err(error.clone()),
            State::AwaitingInput { register } => {
                // Finish the suspended instruction; it was fetched and decoded already
                if !self.complete_input(register) {
                    return Ok(Outcome::AwaitingInput);
                }
                self.state = State::Ready;
                self.cycle += 1;
            }
        }

        let mut executed: u64 = 0;
        loop {
            if budget.is_some_and(|limit| executed >= limit) {
                return Ok(Outcome::Paused);
            }

            match self.step(console) {
                Ok(Step::Continue) => {
                    self.cycle += 1;
                    executed += 1;
                }
                Ok(Step::Halted) => {
                    self.cycle += 1;
                    return Ok(Outcome::Halted);
                }
                Ok(Step::Suspended) => return Ok(Outcome::AwaitingInput),
                Err(error) => return Err(self.fault(console, error)),
            }
        }
    }

    /// Fetch, decode and execute one instruction
    fn step<C: Console>(&mut self, console: &mut C) -> Result<Step, MachineError> {
        let word = self.fetch()?;
        let instruction = Instruction::decode(word)?;
        let r = &mut self.registers;

        match instruction {
            Instruction::ConditionalMove { a, b, c } => {
                if r[c] != 0 {
                    r[a] = r[b];
                }
            }
            Instruction::ArrayIndex { a, b, c } => {
                r[a] = self.heap.read(r[b], r[c])?;
            }
            Instruction::ArrayAmendment { a, b, c } => {
                self.heap.write(r[a], r[b], r[c])?;
            }
            Instruction::Addition { a, b, c } => {
                r[a] = r[b].wrapping_add(r[c]);
            }
            Instruction::Multiplication { a, b, c } => {
                r[a] = r[b].wrapping_mul(r[c]);
            }
            Instruction::Division { a, b, c } => {
                if r[c] == 0 {
                    return Err(MachineError::DivisionByZero);
                }
                r[a] = r[b] / r[c];
            }
            Instruction::NotAnd { a, b, c } => {
                r[a] = !(r[b] & r[c]);
            }
            Instruction::Halt => {
                console.on_halt()?;
                self.state = State::Halted;
                return Ok(Step::Halted);
            }
            Instruction::Allocation { b, c } => {
                r[b] = self.heap.allocate(r[c])?;
            }
            Instruction::Abandonment { c } => {
                self.heap.abandon(r[c])?;
            }
            Instruction::Output { c } => {
                console.write_byte((r[c] & 0xFF) as u8)?;
            }
            Instruction::Input { c } => {
                if self.input.is_empty() && !self.input_closed {
                    match console.read_line() {
                        LineRead::Line(bytes) => self.input.extend(bytes),
                        LineRead::Pending => {}
                        LineRead::EndOfInput => self.input_closed = true,
                    }
                }
                if !self.complete_input(c) {
                    self.state = State::AwaitingInput { register: c };
                    return Ok(Step::Suspended);
                }
            }
            Instruction::LoadProgram { b, c } => {
                self.heap.load_program(r[b])?;
                self.pc = r[c];
            }
            Instruction::Orthography { a, value } => {
                r[a] = value;
            }
        }

        Ok(Step::Continue)
    }

    fn fetch(&mut self) -> Result<u32, MachineError> {
        let program = self.heap.program();
        let word = program.get(self.pc as usize).copied().ok_or(
            MachineError::InvalidProgramCounter {
                pc: self.pc,
                len: program.len(),
            },
        )?;
        self.last_word = Some(word);
        self.pc = self.pc.wrapping_add(1);
        Ok(word)
    }

    /// Deliver one buffered byte (or the end-of-input marker) into `register`.
    /// Returns false when there is nothing to deliver yet.
    fn complete_input(&mut self, register: usize) -> bool {
        match self.input.pop_front() {
            Some(byte) => self.registers[register] = u32::from(byte),
            None if self.input_closed => self.registers[register] = END_OF_INPUT,
            None => return false,
        }
        true
    }

    fn fault<C: Console>(&mut self, console: &mut C, error: MachineError) -> MachineError {
        console.on_fault(&self.snapshot());
        self.state = State::Faulted(error.clone());
        error
    }

    /// Append host input to the buffer; visible to the next input instruction
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    /// Signal that no more input will arrive
    pub fn close_input(&mut self) {
        self.input_closed = true;
    }

    /// Capture the diagnostic state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: self.registers.values(),
            pc: self.pc,
            cycle: self.cycle,
            last_word: self.last_word,
        }
    }

    /// Decode the instruction the program counter points at, if there is one
    pub fn next_instruction(&self) -> Option<Instruction> {
        let word = self.heap.program().get(self.pc as usize)?;
        Instruction::decode(*word).ok()
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    pub fn is_awaiting_input(&self) -> bool {
        matches!(self.state, State::AwaitingInput { .. })
    }

    /// Number of input bytes buffered and not yet consumed
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    pub fn is_input_closed(&self) -> bool {
        self.input_closed
    }
}
