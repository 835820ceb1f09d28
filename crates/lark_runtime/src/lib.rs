//! Lark object-and-type allocation core.

#![allow(clippy::collapsible_if)]
#![allow(clippy::new_without_default)]
#![allow(clippy::unnecessary_cast)]
#![allow(clippy::manual_range_contains)]

pub mod core;
pub mod errors;
pub mod config;
pub mod matching;
pub mod convert;

mod context;
mod symbols;
mod tuple;
mod types;
mod typector;
mod boxing;
mod construct;
mod array;
mod bootstrap;

pub use boxing::Boxable;
pub use config::ContextConfig;
pub use context::{Builtins, Context, Syms};
pub use convert::{Converter, SubtypeConverter};
pub use crate::core::heap;
pub use crate::core::{
    ARRAY_INLINE_NBYTES, ARRAY_INLINE_NREFS, Heap, HeapStats, ManagedObject, NativeFn, WORD_SIZE,
};
pub use errors::{Result, RuntimeError};
pub use lark_core::Value;
pub use matching::{MatchResult, StructuralMatcher, TypeMatcher};
