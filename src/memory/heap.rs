//! Platter-array heap
//!
//! This module provides the machine's array-of-arrays memory:
//! - Array 0 is the program array; it is always live and never abandonable
//! - Allocation reuses the smallest abandoned identifier before minting a new one
//! - Liveness and bounds are checked before every access
//!
//! # Identifier reuse
//!
//! Slots are kept in an arena indexed by identifier. Abandoned identifiers go
//! onto a min-heap, so the allocator always hands out the numerically smallest
//! free one. This keeps identifier assignment deterministic across runs of the
//! same program.

use crate::machine::constants::PROGRAM_ARRAY;
use crate::machine::errors::MachineError;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// State of one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Live(Vec<u32>),
    Free,
}

/// The heap
#[derive(Debug, Clone)]
pub struct Heap {
    slots: Vec<Slot>,
    free: BinaryHeap<Reverse<u32>>,
    live_arrays: usize,
    live_platters: usize,
}

impl Heap {
    /// Create a heap whose program array holds `program`
    pub fn new(program: Vec<u32>) -> Self {
        let live_platters = program.len();
        Heap {
            slots: vec![Slot::Live(program)],
            free: BinaryHeap::new(),
            live_arrays: 1,
            live_platters,
        }
    }

    /// Allocate a zeroed array of `len` platters and return its identifier
    pub fn allocate(&mut self, len: u32) -> Result<u32, MachineError> {
        let platters = zeroed(len as usize).ok_or(MachineError::AllocationFailed { len })?;
        let array = Slot::Live(platters);
        self.live_arrays += 1;
        self.live_platters += len as usize;

        while let Some(Reverse(id)) = self.free.pop() {
            if id == PROGRAM_ARRAY {
                continue;
            }
            self.slots[id as usize] = array;
            return Ok(id);
        }

        let id = self.slots.len() as u32;
        self.slots.push(array);
        Ok(id)
    }

    /// Abandon an array, making its identifier available for reuse
    pub fn abandon(&mut self, id: u32) -> Result<(), MachineError> {
        if id == PROGRAM_ARRAY {
            return Err(MachineError::InvalidArrayIndex { id });
        }

        match self.slots.get_mut(id as usize) {
            Some(slot) if matches!(slot, Slot::Live(_)) => {
                if let Slot::Live(data) = std::mem::replace(slot, Slot::Free) {
                    self.live_platters -= data.len();
                }
                self.live_arrays -= 1;
                self.free.push(Reverse(id));
                Ok(())
            }
            _ => Err(MachineError::DoubleFree { id }),
        }
    }

    /// Get a live array
    pub fn array(&self, id: u32) -> Result<&[u32], MachineError> {
        match self.slots.get(id as usize) {
            Some(Slot::Live(data)) => Ok(data),
            _ => Err(MachineError::InvalidArrayIndex { id }),
        }
    }

    fn array_mut(&mut self, id: u32) -> Result<&mut Vec<u32>, MachineError> {
        match self.slots.get_mut(id as usize) {
            Some(Slot::Live(data)) => Ok(data),
            _ => Err(MachineError::InvalidArrayIndex { id }),
        }
    }

    /// Read the platter at `offset` in array `id`
    pub fn read(&self, id: u32, offset: u32) -> Result<u32, MachineError> {
        let array = self.array(id)?;
        array
            .get(offset as usize)
            .copied()
            .ok_or(MachineError::InvalidOffset {
                id,
                offset,
                len: array.len(),
            })
    }

    /// Write `value` at `offset` in array `id`
    pub fn write(&mut self, id: u32, offset: u32, value: u32) -> Result<(), MachineError> {
        let array = self.array_mut(id)?;
        let len = array.len();
        match array.get_mut(offset as usize) {
            Some(platter) => {
                *platter = value;
                Ok(())
            }
            None => Err(MachineError::InvalidOffset { id, offset, len }),
        }
    }

    /// The program array
    pub fn program(&self) -> &[u32] {
        match self.slots.first() {
            Some(Slot::Live(data)) => data,
            _ => &[],
        }
    }

    /// Replace the program array with an independent copy of array `id`.
    ///
    /// Loading array 0 leaves the program untouched.
    pub fn load_program(&mut self, id: u32) -> Result<(), MachineError> {
        let source = match self.slots.get(id as usize) {
            Some(Slot::Live(data)) => data,
            _ => return Err(MachineError::InvalidProgramArray { id }),
        };

        if id != PROGRAM_ARRAY {
            let copy = source.clone();
            self.live_platters = self.live_platters - self.program().len() + copy.len();
            self.slots[PROGRAM_ARRAY as usize] = Slot::Live(copy);
        }
        Ok(())
    }

    /// Whether `id` currently names a live array
    pub fn is_live(&self, id: u32) -> bool {
        matches!(self.slots.get(id as usize), Some(Slot::Live(_)))
    }

    /// Live arrays as `(identifier, length)` pairs in identifier order
    pub fn live(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| match slot {
                Slot::Live(data) => Some((id as u32, data.len())),
                Slot::Free => None,
            })
    }

    /// Number of live arrays, program array included
    pub fn live_arrays(&self) -> usize {
        self.live_arrays
    }

    /// Total platters held by live arrays
    pub fn live_platters(&self) -> usize {
        self.live_platters
    }

    /// Number of identifiers ever minted, program array included
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Zero-filled platters, or `None` when the host cannot reserve them
fn zeroed(len: usize) -> Option<Vec<u32>> {
    let mut platters = Vec::new();
    platters.try_reserve_exact(len).ok()?;
    platters.resize(len, 0);
    Some(platters)
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
