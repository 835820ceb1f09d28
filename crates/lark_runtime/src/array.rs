//! N-dimensional arrays.
//!
//! The extents live inside the array object. Element storage is chosen once,
//! at allocation: payloads up to `ARRAY_INLINE_NBYTES` are stored inline,
//! larger ones in a separate buffer. Bits element types store raw bytes;
//! every other element type stores references, initially empty.

use lark_core::Value;
use smallvec::SmallVec;

use crate::Context;
use crate::core::{ArrayData, ArrayObject, ManagedObject, Payload, WORD_SIZE};
use crate::errors::{Result, RuntimeError};

/// Default constructor of every `Array{T,N}`: each argument is one extent.
pub(crate) fn new_array_internal(ctx: &mut Context, f: Value, args: &[Value]) -> Result<Value> {
    let atype = ctx
        .function_env(f)
        .ok_or_else(|| RuntimeError::NotCallable(ctx.show(f)))?;
    let func = ctx.type_name_str(atype);
    let int32 = ctx.b.int32_type;

    let mut dims: SmallVec<[u32; 4]> = SmallVec::with_capacity(args.len());
    for &arg in args {
        let ty = ctx.type_of(arg);
        if !ty.is(int32) {
            return Err(RuntimeError::TypeCheck {
                func,
                expected: "Int32".into(),
                actual: ctx.show(ty),
            });
        }
        let d = ctx.unbox_int32(arg);
        if d < 0 {
            return Err(RuntimeError::NegativeDimension {
                func,
                actual: d as i64,
            });
        }
        dims.push(d as u32);
    }

    if let Some(n) = ctx.tparam(atype, 1).filter(|&n| ctx.type_of(n).is(int32)) {
        let expected = ctx.unbox_int32(n) as usize;
        if expected != dims.len() {
            return Err(RuntimeError::DimensionCount {
                func,
                expected,
                actual: dims.len(),
            });
        }
    }
    ctx.new_array(atype, &dims)
}

/// `Array(T, d1, ..., dn)`: instantiate `Array{T,n}` and allocate.
pub(crate) fn generic_array_ctor(ctx: &mut Context, f: Value, args: &[Value]) -> Result<Value> {
    let Some((&eltype, extents)) = args.split_first() else {
        return Err(RuntimeError::ArgumentCount {
            func: "Array".into(),
            min: 1,
            actual: 0,
        });
    };
    if !ctx.is_type(eltype) {
        return Err(RuntimeError::TypeCheck {
            func: "Array".into(),
            expected: "Type".into(),
            actual: ctx.show(ctx.type_of(eltype)),
        });
    }
    let ndims = ctx.box_int32(extents.len() as i32);
    let atype = ctx.apply_type_ctor(f, &[eltype, ndims])?;
    let fnew = ctx
        .struct_fnew(atype)
        .ok_or_else(|| RuntimeError::NotConstructible(ctx.show(atype)))?;
    ctx.call(fnew, extents)
}

impl Context {
    /// Allocate an array of type `atype` with the given extents.
    pub fn new_array(&mut self, atype: Value, dims: &[u32]) -> Result<Value> {
        let eltype = self
            .tparam(atype, 0)
            .ok_or_else(|| RuntimeError::TypeCheck {
                func: "new_array".into(),
                expected: "array type".into(),
                actual: self.show(atype),
            })?;
        let too_large = || RuntimeError::ArrayTooLarge {
            dims: dims.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("x"),
        };
        let length = if dims.is_empty() {
            0
        } else {
            dims.iter()
                .try_fold(1usize, |acc, &d| acc.checked_mul(d as usize))
                .ok_or_else(too_large)?
        };

        let (elsize, data) = match self.bits_type_nbits(eltype) {
            Some(nbits) => {
                let elsize = nbits.div_ceil(8) as usize;
                let nbytes = elsize.checked_mul(length).ok_or_else(too_large)?;
                let data = if length == 0 {
                    ArrayData::Empty
                } else {
                    ArrayData::Bits(Payload::zeroed(nbytes, nbytes))
                };
                (elsize, data)
            }
            None => {
                let nbytes = length.checked_mul(WORD_SIZE).ok_or_else(too_large)?;
                let data = if length == 0 {
                    ArrayData::Empty
                } else {
                    ArrayData::Refs(Payload::zeroed(length, nbytes))
                };
                (WORD_SIZE, data)
            }
        };

        let array = ArrayObject {
            dims: SmallVec::from_slice(dims),
            length,
            elsize,
            data,
        };
        Ok(self.heap.alloc(atype, ManagedObject::Array(Box::new(array))))
    }

    /// A UInt8 vector holding `bytes` up to the first NUL. A zero terminator
    /// is stored after the visible contents but not counted in the length.
    pub fn cstr_to_array(&mut self, bytes: &[u8]) -> Result<Value> {
        let n = bytes.iter().position(|&c| c == 0).unwrap_or(bytes.len());
        let atype = self.b.array_uint8_type;
        let extent = u32::try_from(n + 1).map_err(|_| RuntimeError::ArrayTooLarge {
            dims: (n + 1).to_string(),
        })?;
        let a = self.new_array(atype, &[extent])?;
        if let Some(array) = self.array_mut(a) {
            if let ArrayData::Bits(payload) = &mut array.data {
                payload.as_mut_slice()[..n].copy_from_slice(&bytes[..n]);
            }
            array.length = n;
            array.dims[0] = n as u32;
        }
        Ok(a)
    }

    pub fn is_array(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::Array(_))
    }

    fn array(&self, v: Value) -> Option<&ArrayObject> {
        match self.heap.obj(v) {
            ManagedObject::Array(a) => Some(a),
            _ => None,
        }
    }

    fn array_mut(&mut self, v: Value) -> Option<&mut ArrayObject> {
        match self.heap.obj_mut(v) {
            ManagedObject::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn array_len(&self, v: Value) -> Option<usize> {
        self.array(v).map(|a| a.length)
    }

    pub fn array_dims(&self, v: Value) -> Option<&[u32]> {
        self.array(v).map(|a| a.dims.as_slice())
    }

    /// The extents as a tuple of boxed Int32 values.
    pub fn array_dims_tuple(&mut self, v: Value) -> Option<Value> {
        let dims: SmallVec<[u32; 4]> = SmallVec::from_slice(self.array_dims(v)?);
        let boxed: SmallVec<[Value; 4]> = dims.iter().map(|&d| self.box_int32(d as i32)).collect();
        Some(self.tuple(&boxed))
    }

    pub fn array_is_inline(&self, v: Value) -> Option<bool> {
        self.array(v).map(|a| a.data.is_inline())
    }

    pub fn array_eltype(&self, v: Value) -> Option<Value> {
        self.array(v)?;
        self.tparam(self.type_of(v), 0)
    }

    /// Visible contents of a bits array, `length * elsize` bytes.
    pub fn array_bytes(&self, v: Value) -> Option<&[u8]> {
        let a = self.array(v)?;
        match &a.data {
            ArrayData::Bits(p) => p.as_slice().get(..a.length * a.elsize),
            ArrayData::Empty => Some(&[][..]),
            ArrayData::Refs(_) => None,
        }
    }

    /// Whole payload of a bits array, including any hidden terminator.
    pub fn array_raw_bytes(&self, v: Value) -> Option<&[u8]> {
        match &self.array(v)?.data {
            ArrayData::Bits(p) => Some(p.as_slice()),
            ArrayData::Empty => Some(&[][..]),
            ArrayData::Refs(_) => None,
        }
    }

    fn check_index(&self, v: Value, i: usize) -> Result<&ArrayObject> {
        let a = self.array(v).ok_or_else(|| RuntimeError::TypeCheck {
            func: "arrayref".into(),
            expected: "Array".into(),
            actual: self.show(self.type_of(v)),
        })?;
        if i >= a.length {
            return Err(RuntimeError::IndexOutOfBounds {
                index: i,
                len: a.length,
            });
        }
        Ok(a)
    }

    /// Element `i`. Bits elements are boxed; an empty reference slot is an
    /// error.
    pub fn array_ref(&mut self, v: Value, i: usize) -> Result<Value> {
        let a = self.check_index(v, i)?;
        let raw = match &a.data {
            ArrayData::Refs(p) => {
                return p.as_slice()[i].ok_or(RuntimeError::UndefinedReference);
            }
            ArrayData::Bits(p) => {
                let start = i * a.elsize;
                let mut word = [0u8; 8];
                let n = a.elsize.min(8);
                word[..n].copy_from_slice(&p.as_slice()[start..start + n]);
                u64::from_le_bytes(word)
            }
            ArrayData::Empty => return Err(RuntimeError::UndefinedReference),
        };
        let eltype = self.tparam(self.type_of(v), 0).unwrap_or(self.b.any_type);
        Ok(self.box_raw(eltype, raw))
    }

    /// Store `x` at index `i`, converting it to the element type first.
    pub fn array_set(&mut self, v: Value, i: usize, x: Value) -> Result<()> {
        self.check_index(v, i)?;
        let eltype = self.tparam(self.type_of(v), 0).unwrap_or(self.b.any_type);
        let converter = self.converter.clone();
        let x = converter.convert(self, eltype, x)?;
        let raw = self.bits_raw(x);
        let Some(a) = self.array_mut(v) else {
            return Ok(());
        };
        match &mut a.data {
            ArrayData::Refs(p) => p.as_mut_slice()[i] = Some(x),
            ArrayData::Bits(p) => {
                let start = i * a.elsize;
                let n = a.elsize.min(8);
                let word = raw.unwrap_or_default().to_le_bytes();
                p.as_mut_slice()[start..start + n].copy_from_slice(&word[..n]);
            }
            ArrayData::Empty => {}
        }
        Ok(())
    }
}
