//! Core object model.
//!
//! This module contains the fundamental storage types of the allocation core:
//! - `Heap` - Object slots with word/byte accounting
//! - `ManagedObject` - The closed set of object layouts
//! - `Payload` - Inline-or-heap element storage for arrays

pub mod heap;
pub mod object;
pub mod payload;

pub use heap::{Heap, HeapObject, HeapStats, ManagedObject};
pub use object::*;
pub use payload::{ARRAY_INLINE_NBYTES, ARRAY_INLINE_NREFS, Payload, WORD_SIZE};
