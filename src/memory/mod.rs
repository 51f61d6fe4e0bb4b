//! Memory model for the Universal Machine
//!
//! This module provides the two kinds of machine storage:
//! - [`registers`]: the eight-register file
//! - [`heap`]: the array-of-arrays heap with identifier reuse
//!
//! # Platters
//!
//! Every storage cell is an unsigned 32-bit word ("platter"). Arithmetic on
//! platters wraps modulo 2^32; nothing in memory is signed.

pub mod heap;
pub mod registers;

pub use heap::Heap;
pub use registers::Registers;
