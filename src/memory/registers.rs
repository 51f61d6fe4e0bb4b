//! The eight-register file

use crate::machine::constants::REGISTER_COUNT;
use std::ops::{Index, IndexMut};

/// Eight unsigned 32-bit registers, all zero at power-on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers([u32; REGISTER_COUNT]);

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all register values, in index order
    pub fn values(&self) -> [u32; REGISTER_COUNT] {
        self.0
    }
}

impl Index<usize> for Registers {
    type Output = u32;

    fn index(&self, i: usize) -> &u32 {
        &self.0[i]
    }
}

impl IndexMut<usize> for Registers {
    fn index_mut(&mut self, i: usize) -> &mut u32 {
        &mut self.0[i]
    }
}
