//! Symbol table.
//!
//! Symbols are interned: one heap instance per distinct name, each carrying a
//! precomputed hash.

use std::hash::BuildHasher;

use hashbrown::hash_map::RawEntryMut;
use lark_core::{FastHashMap, Value, fast_map_with_capacity, hash_bytes};

use crate::Context;
use crate::core::{Heap, ManagedObject, SymbolData};

const SYMBOL_HASH_MASK: u64 = 0xAAAA_AAAA_AAAA_AAAA;

pub(crate) struct SymbolTable {
    map: FastHashMap<Box<str>, Value>,
    gensym_ctr: u32,
}

impl SymbolTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            map: fast_map_with_capacity(capacity),
            gensym_ctr: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

fn mk_symbol(heap: &mut Heap, sym_type: Value, name: &str) -> Value {
    let data = SymbolData {
        name: name.into(),
        hash: hash_bytes(name.as_bytes()) ^ SYMBOL_HASH_MASK,
    };
    heap.alloc(sym_type, ManagedObject::Symbol(Box::new(data)))
}

impl Context {
    /// Return the unique symbol for `name`, creating it on first use.
    pub fn intern(&mut self, name: &str) -> Value {
        let sym_type = self.b.sym_type;
        let hash = self.symtab.map.hasher().hash_one(name);
        match self
            .symtab
            .map
            .raw_entry_mut()
            .from_key_hashed_nocheck(hash, name)
        {
            RawEntryMut::Occupied(entry) => *entry.get(),
            RawEntryMut::Vacant(entry) => {
                let sym = mk_symbol(&mut self.heap, sym_type, name);
                entry.insert_hashed_nocheck(hash, name.into(), sym);
                sym
            }
        }
    }

    /// A fresh symbol named `g<n>`. It is not entered in the table, so it is
    /// never the same instance as an interned symbol, though its text may
    /// coincide with a user-chosen name.
    pub fn gensym(&mut self) -> Value {
        let n = self.symtab.gensym_ctr;
        self.symtab.gensym_ctr += 1;
        let mut digits = itoa::Buffer::new();
        let mut name = String::with_capacity(12);
        name.push('g');
        name.push_str(digits.format(n));
        mk_symbol(&mut self.heap, self.b.sym_type, &name)
    }

    pub fn is_symbol(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::Symbol(_))
    }

    pub fn symbol_name(&self, v: Value) -> Option<&str> {
        match self.heap.obj(v) {
            ManagedObject::Symbol(s) => Some(&s.name),
            _ => None,
        }
    }

    pub fn symbol_hash(&self, v: Value) -> Option<u64> {
        match self.heap.obj(v) {
            ManagedObject::Symbol(s) => Some(s.hash),
            _ => None,
        }
    }

    /// Number of interned symbols. Gensyms are not counted.
    pub fn symbol_count(&self) -> usize {
        self.symtab.len()
    }
}
