//! Context configuration.

use crate::errors::{Result, RuntimeError};

#[derive(Clone, Copy, Debug)]
pub struct ContextConfig {
    /// Width of `Ptr{T}` values in bits. Only 32 and 64 are supported.
    pub pointer_bits: u32,
    /// Number of heap slots reserved up front.
    pub heap_capacity: usize,
    /// Number of symbol table entries reserved up front.
    pub symbol_capacity: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            pointer_bits: usize::BITS,
            heap_capacity: 8192,
            symbol_capacity: 256,
        }
    }
}

impl ContextConfig {
    pub fn validate(&self) -> Result<()> {
        match self.pointer_bits {
            32 | 64 => Ok(()),
            other => Err(RuntimeError::UnsupportedPointerWidth(other)),
        }
    }
}
