//! Heap object layouts.
//!
//! Each struct here is the body of one `ManagedObject` variant. Fields that
//! refer to other runtime values are `Value` handles; slots that may be unset
//! are `Option<Value>`.

use super::payload::{ARRAY_INLINE_NBYTES, ARRAY_INLINE_NREFS, Payload};
use crate::Context;
use crate::errors::Result;
use lark_core::Value;
use smallvec::SmallVec;

/// Native entry point of a function value.
///
/// The second argument is the function value being invoked, so an entry point
/// can read its own environment, lambda info and call-site memo.
pub type NativeFn = fn(&mut Context, Value, &[Value]) -> Result<Value>;

pub type TupleElems = SmallVec<[Value; 4]>;

pub struct SymbolData {
    pub name: Box<str>,
    pub hash: u64,
}

pub struct TypeNameData {
    pub name: Value,
    /// Canonical type constructor for this name. Set at most once.
    pub ctor: Option<Value>,
}

/// Fields shared by every member of the tag family (tag, bits and struct
/// types).
#[derive(Clone, Copy, Debug)]
pub struct TagData {
    pub name: Value,
    pub sup: Value,
    pub parameters: Value,
}

pub struct BitsTypeData {
    pub tag: TagData,
    pub nbits: u32,
    pub uid: u32,
}

pub struct StructTypeData {
    pub tag: TagData,
    pub names: Value,
    pub types: Value,
    pub fnew: Option<Value>,
    pub uid: u32,
}

pub struct TypeVarData {
    pub name: Value,
    pub lb: Value,
    pub ub: Value,
}

#[derive(Clone)]
pub struct FunctionData {
    pub fptr: NativeFn,
    pub env: Option<Value>,
    pub linfo: Option<Value>,
    /// Body type, for type constructors.
    pub body: Option<Value>,
    /// Formal parameter tuple, for type constructors.
    pub parameters: Option<Value>,
    /// Cached instantiation of a zero-parameter type constructor.
    pub unconstrained: Option<Value>,
}

impl FunctionData {
    pub fn new(fptr: NativeFn, env: Option<Value>) -> Self {
        Self {
            fptr,
            env,
            linfo: None,
            body: None,
            parameters: None,
            unconstrained: None,
        }
    }
}

pub struct LambdaInfoData {
    pub ast: Option<Value>,
    /// Flat (formal, actual, formal, actual, ...) static parameters.
    pub sparams: Value,
    pub fptr: Option<NativeFn>,
    /// Type instantiated for this call-site by a generic constructor.
    pub instantiated: Option<Value>,
    /// Values captured by closures over this body. Kept for collector
    /// visibility only.
    pub roots: Vec<Value>,
}

/// A boxed fixed-width scalar. Only the low `nbits` of `raw` are meaningful,
/// where `nbits` comes from the value's bits type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitsBox {
    pub raw: u64,
}

pub enum ArrayData {
    Empty,
    Bits(Payload<u8, ARRAY_INLINE_NBYTES>),
    Refs(Payload<Option<Value>, ARRAY_INLINE_NREFS>),
}

impl ArrayData {
    pub fn is_inline(&self) -> bool {
        match self {
            ArrayData::Empty => false,
            ArrayData::Bits(p) => p.is_inline(),
            ArrayData::Refs(p) => p.is_inline(),
        }
    }

    pub fn out_of_line_bytes(&self) -> usize {
        match self {
            ArrayData::Empty => 0,
            ArrayData::Bits(p) => p.out_of_line_bytes(),
            ArrayData::Refs(p) => p.out_of_line_bytes(),
        }
    }
}

pub struct ArrayObject {
    /// One extent per dimension, stored in the array object itself.
    pub dims: SmallVec<[u32; 4]>,
    /// Logical element count.
    pub length: usize,
    /// Element size in bytes; a word for reference elements.
    pub elsize: usize,
    pub data: ArrayData,
}
