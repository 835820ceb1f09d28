//! Object heap.
//!
//! The heap is the allocator collaborator: it hands out slots and keeps
//! word/byte accounting, but never reclaims anything. Reclamation belongs to
//! whichever collector is layered on top.

use super::object::{
    ArrayObject, BitsBox, BitsTypeData, FunctionData, LambdaInfoData, StructTypeData, SymbolData,
    TagData, TupleElems, TypeNameData, TypeVarData,
};
use super::payload::WORD_SIZE;
use lark_core::{ObjectId, Value};

pub enum ManagedObject {
    Tuple(TupleElems),
    Symbol(Box<SymbolData>),
    TypeName(Box<TypeNameData>),
    TagType(Box<TagData>),
    BitsType(Box<BitsTypeData>),
    StructType(Box<StructTypeData>),
    UnionType(Value),
    FuncType { from: Value, to: Value },
    TypeVar(Box<TypeVarData>),
    Function(Box<FunctionData>),
    LambdaInfo(Box<LambdaInfoData>),
    Struct(Box<[Value]>),
    Bits(BitsBox),
    Array(Box<ArrayObject>),
}

impl ManagedObject {
    /// Size of the object body in words, excluding the type word.
    pub fn nwords(&self) -> usize {
        match self {
            ManagedObject::Tuple(elems) => 1 + elems.len(),
            ManagedObject::Symbol(s) => 3 + (s.name.len() + WORD_SIZE) / WORD_SIZE,
            ManagedObject::TypeName(_) => 2,
            ManagedObject::TagType(_) => 3,
            ManagedObject::BitsType(_) => 5,
            ManagedObject::StructType(_) => 7,
            ManagedObject::UnionType(_) => 1,
            ManagedObject::FuncType { .. } => 2,
            ManagedObject::TypeVar(_) => 3,
            ManagedObject::Function(_) => 6,
            ManagedObject::LambdaInfo(li) => 4 + li.roots.len(),
            ManagedObject::Struct(fields) => fields.len(),
            ManagedObject::Bits(_) => 1,
            ManagedObject::Array(a) => {
                let inline = if a.data.is_inline() {
                    (a.length * a.elsize).div_ceil(WORD_SIZE)
                } else {
                    0
                };
                4 + a.dims.len() + inline
            }
        }
    }

    /// Bytes allocated outside the object itself.
    pub fn out_of_line_bytes(&self) -> usize {
        match self {
            ManagedObject::Array(a) => a.data.out_of_line_bytes(),
            _ => 0,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ManagedObject::Tuple(_) => "tuple",
            ManagedObject::Symbol(_) => "symbol",
            ManagedObject::TypeName(_) => "typename",
            ManagedObject::TagType(_) => "tag type",
            ManagedObject::BitsType(_) => "bits type",
            ManagedObject::StructType(_) => "struct type",
            ManagedObject::UnionType(_) => "union type",
            ManagedObject::FuncType { .. } => "function type",
            ManagedObject::TypeVar(_) => "type variable",
            ManagedObject::Function(_) => "function",
            ManagedObject::LambdaInfo(_) => "lambda info",
            ManagedObject::Struct(_) => "struct",
            ManagedObject::Bits(_) => "bits",
            ManagedObject::Array(_) => "array",
        }
    }
}

/// A heap slot: the type word followed by the object body.
pub struct HeapObject {
    pub ty: Value,
    pub obj: ManagedObject,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub objects: usize,
    pub words: usize,
    pub bytes: usize,
}

pub struct Heap {
    pub(crate) objects: Vec<HeapObject>,
    pub(crate) alloc_words: usize,
    pub(crate) alloc_bytes: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            objects: Vec::with_capacity(cap),
            alloc_words: 0,
            alloc_bytes: 0,
        }
    }

    /// Allocate an object whose type is `ty`.
    pub fn alloc(&mut self, ty: Value, obj: ManagedObject) -> Value {
        self.alloc_words += 1 + obj.nwords();
        self.alloc_bytes += obj.out_of_line_bytes();
        let id = self.objects.len();
        self.objects.push(HeapObject { ty, obj });
        Value::from_obj_id(ObjectId(id))
    }

    /// Allocate an object that is its own type. Only the bootstrap of the
    /// kind types needs this.
    pub(crate) fn alloc_self_typed(&mut self, obj: ManagedObject) -> Value {
        let me = Value::from_obj_id(ObjectId(self.objects.len()));
        self.alloc(me, obj)
    }

    #[inline]
    pub fn get(&self, v: Value) -> &HeapObject {
        &self.objects[v.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, v: Value) -> &mut HeapObject {
        &mut self.objects[v.index()]
    }

    #[inline]
    pub fn type_of(&self, v: Value) -> Value {
        self.objects[v.index()].ty
    }

    #[inline]
    pub fn obj(&self, v: Value) -> &ManagedObject {
        &self.objects[v.index()].obj
    }

    #[inline]
    pub fn obj_mut(&mut self, v: Value) -> &mut ManagedObject {
        &mut self.objects[v.index()].obj
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            objects: self.objects.len(),
            words: self.alloc_words,
            bytes: self.alloc_bytes,
        }
    }

    /// Get memory statistics by object kind
    pub fn memory_stats(&self) -> String {
        let mut rows: Vec<(&'static str, usize, usize)> = Vec::new();
        for o in &self.objects {
            let name = o.obj.kind_name();
            let words = 1 + o.obj.nwords();
            match rows.iter_mut().find(|r| r.0 == name) {
                Some(row) => {
                    row.1 += 1;
                    row.2 += words;
                }
                None => rows.push((name, 1, words)),
            }
        }
        rows.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(b.0)));

        let mut out = String::from("=== Heap Memory Stats ===\n");
        for (name, count, words) in &rows {
            let pct = if self.alloc_words > 0 {
                *words as f64 / self.alloc_words as f64 * 100.0
            } else {
                0.0
            };
            out.push_str(&format!(
                "{:<14} {:>8} objects, {:>10} words ({:.1}%)\n",
                name, count, words, pct
            ));
        }
        out.push_str("--------------------------\n");
        out.push_str(&format!(
            "Total:         {:>8} objects, {:>10} words, {:>10} out-of-line bytes",
            self.objects.len(),
            self.alloc_words,
            self.alloc_bytes
        ));
        out
    }
}
