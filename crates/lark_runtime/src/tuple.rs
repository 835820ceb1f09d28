//! Tuples and pair chains.
//!
//! A pair chain is a right-nested list of `(a, b, rest)` links ending in the
//! empty tuple. Type matching reports variable bindings this way.

use lark_core::Value;

use crate::Context;
use crate::core::{ManagedObject, TupleElems};
use crate::errors::{Result, RuntimeError};

impl Context {
    /// Allocate a tuple. The empty tuple is always the canonical `null()`.
    pub fn tuple(&mut self, elems: &[Value]) -> Value {
        if elems.is_empty() {
            return self.b.null;
        }
        self.alloc_tuple(TupleElems::from_slice(elems))
    }

    /// Allocate a tuple from owned elements.
    pub fn alloc_tuple(&mut self, elems: TupleElems) -> Value {
        if elems.is_empty() {
            return self.b.null;
        }
        self.heap.alloc(self.b.tuple_type, ManagedObject::Tuple(elems))
    }

    pub fn is_tuple(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::Tuple(_))
    }

    pub fn tuple_len(&self, v: Value) -> Option<usize> {
        self.tuple_elems(v).map(|e| e.len())
    }

    pub fn tuple_elems(&self, v: Value) -> Option<&[Value]> {
        match self.heap.obj(v) {
            ManagedObject::Tuple(elems) => Some(elems),
            _ => None,
        }
    }

    pub fn tupleref(&self, v: Value, i: usize) -> Option<Value> {
        self.tuple_elems(v).and_then(|e| e.get(i).copied())
    }

    /// Owned copy of a tuple's elements; empty for non-tuples.
    pub(crate) fn tuple_vec(&self, v: Value) -> TupleElems {
        self.tuple_elems(v)
            .map(TupleElems::from_slice)
            .unwrap_or_default()
    }

    /// Concatenate two tuples, preserving the order of both.
    pub fn tuple_append(&mut self, a: Value, b: Value) -> Value {
        let mut elems = self.tuple_vec(a);
        elems.extend_from_slice(self.tuple_elems(b).unwrap_or(&[]));
        self.alloc_tuple(elems)
    }

    /// One pair-chain link `(a, b, null)`.
    pub fn pair(&mut self, a: Value, b: Value) -> Value {
        let null = self.b.null;
        self.tuple(&[a, b, null])
    }

    /// Build a pair chain from a flat `(a1, b1, a2, b2, ...)` slice. A trailing
    /// odd element is ignored.
    pub fn pair_chain(&mut self, flat: &[Value]) -> Value {
        let mut chain = self.b.null;
        for pair in flat.chunks_exact(2).rev() {
            chain = self.tuple(&[pair[0], pair[1], chain]);
        }
        chain
    }

    /// Convert `(a, b, (c, d, (... ())))` to `(a, b, c, d, ...)`.
    pub fn flatten_pairs(&mut self, chain: Value) -> Result<Value> {
        let null = self.b.null;
        let mut flat = TupleElems::new();
        let mut t = chain;
        while !t.is(null) {
            match self.tuple_elems(t) {
                Some(&[a, b, rest, ..]) => {
                    flat.push(a);
                    flat.push(b);
                    t = rest;
                }
                _ => {
                    return Err(RuntimeError::TypeCheck {
                        func: "flatten_pairs".into(),
                        expected: "pair link".into(),
                        actual: self.show(t),
                    });
                }
            }
        }
        Ok(self.alloc_tuple(flat))
    }
}
