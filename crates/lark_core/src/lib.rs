//! Core handle types for the Lark object model.
//!
//! This crate contains the types that are independent of the allocation core:
//! - `ObjectId` - Handle to a heap slot
//! - `Value` - Reference to a heap-allocated runtime value
//! - `FastHashMap` - Deterministic hash map used by the registries

pub mod gc;
pub mod value;

pub use gc::ObjectId;
pub use value::{FastHashMap, Value, fast_map_new, fast_map_with_capacity, hash_bytes};
