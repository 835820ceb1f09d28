//! Runtime value representation.
//!
//! Every Lark value lives on the heap; a `Value` is the handle the rest of the
//! runtime passes around. The type of a value is stored in the heap object
//! itself, so a handle is all that is needed to inspect it.

use crate::gc::ObjectId;
use ahash::RandomState;
use hashbrown::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

pub fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(fast_hasher())
}

pub fn fast_map_with_capacity<K: Eq + Hash, V>(cap: usize) -> FastHashMap<K, V> {
    HashMap::with_capacity_and_hasher(cap, fast_hasher())
}

/// Hash a byte string with the fixed-seed hasher.
///
/// Stable for the lifetime of the process, which is all symbol hashes need.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    use std::hash::BuildHasher;
    let mut hasher = fast_hasher().build_hasher();
    hasher.write(bytes);
    hasher.finish()
}

/// Reference to a heap-allocated value.
///
/// Two values are identical when they refer to the same heap slot. Value
/// equality of the referenced contents is a separate question answered by
/// the allocation core.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Value(ObjectId);

impl Value {
    #[inline(always)]
    pub const fn from_obj_id(id: ObjectId) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_obj_id(&self) -> ObjectId {
        self.0
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0.0
    }

    /// Identity comparison.
    #[inline(always)]
    pub fn is(&self, other: Value) -> bool {
        self.0 == other.0
    }
}

/// The default handle refers to slot 0, the first object any heap allocates.
impl Default for Value {
    fn default() -> Self {
        Self(ObjectId(0))
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value(#{})", self.0.0)
    }
}
