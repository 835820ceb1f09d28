//! Boxed scalars.
//!
//! Small integers are canonical: boxing a value inside its type's cache range
//! returns the same instance every time. Floats are never cached, and
//! booleans are two singletons created during bootstrap.

use lark_core::Value;
use tracing::trace;

use crate::Context;
use crate::context::Builtins;
use crate::core::{BitsBox, ManagedObject};
use crate::errors::{Result, RuntimeError};

/// Signed 16/32/64-bit caches cover `[-SIGNED_CACHE_BIAS, SIGNED_CACHE_BIAS)`.
const SIGNED_CACHE_BIAS: i64 = 512;
/// Unsigned 16/32/64-bit caches cover `[0, UNSIGNED_CACHE_LEN)`.
const UNSIGNED_CACHE_LEN: u64 = 1024;

/// Canonical small-integer boxes, one table per integer type.
pub(crate) struct BoxCaches {
    int8: Vec<Value>,
    uint8: Vec<Value>,
    int16: Vec<Value>,
    uint16: Vec<Value>,
    int32: Vec<Value>,
    uint32: Vec<Value>,
    int64: Vec<Value>,
    uint64: Vec<Value>,
    populated: bool,
}

impl BoxCaches {
    pub(crate) fn new() -> Self {
        Self {
            int8: Vec::new(),
            uint8: Vec::new(),
            int16: Vec::new(),
            uint16: Vec::new(),
            int32: Vec::new(),
            uint32: Vec::new(),
            int64: Vec::new(),
            uint64: Vec::new(),
            populated: false,
        }
    }
}

fn signed_slot(cache: &[Value], x: i64) -> Option<Value> {
    if (-SIGNED_CACHE_BIAS..SIGNED_CACHE_BIAS).contains(&x) {
        cache.get((x + SIGNED_CACHE_BIAS) as usize).copied()
    } else {
        None
    }
}

fn unsigned_slot(cache: &[Value], x: u64) -> Option<Value> {
    if x < UNSIGNED_CACHE_LEN {
        cache.get(x as usize).copied()
    } else {
        None
    }
}

/// A Rust scalar with a builtin bits type.
pub trait Boxable: Copy {
    fn bits_type(b: &Builtins) -> Value;
    fn to_raw(self) -> u64;
    fn from_raw(raw: u64) -> Self;
    /// The canonical box of `x`, if it has one.
    fn cached(_ctx: &Context, _x: Self) -> Option<Value> {
        None
    }
}

impl Boxable for i8 {
    fn bits_type(b: &Builtins) -> Value {
        b.int8_type
    }
    fn to_raw(self) -> u64 {
        self as u8 as u64
    }
    fn from_raw(raw: u64) -> Self {
        raw as u8 as i8
    }
    fn cached(ctx: &Context, x: Self) -> Option<Value> {
        ctx.boxes.int8.get((x as i16 + 128) as usize).copied()
    }
}

impl Boxable for u8 {
    fn bits_type(b: &Builtins) -> Value {
        b.uint8_type
    }
    fn to_raw(self) -> u64 {
        self as u64
    }
    fn from_raw(raw: u64) -> Self {
        raw as u8
    }
    fn cached(ctx: &Context, x: Self) -> Option<Value> {
        ctx.boxes.uint8.get(x as usize).copied()
    }
}

impl Boxable for i16 {
    fn bits_type(b: &Builtins) -> Value {
        b.int16_type
    }
    fn to_raw(self) -> u64 {
        self as u16 as u64
    }
    fn from_raw(raw: u64) -> Self {
        raw as u16 as i16
    }
    fn cached(ctx: &Context, x: Self) -> Option<Value> {
        signed_slot(&ctx.boxes.int16, x as i64)
    }
}

impl Boxable for u16 {
    fn bits_type(b: &Builtins) -> Value {
        b.uint16_type
    }
    fn to_raw(self) -> u64 {
        self as u64
    }
    fn from_raw(raw: u64) -> Self {
        raw as u16
    }
    fn cached(ctx: &Context, x: Self) -> Option<Value> {
        unsigned_slot(&ctx.boxes.uint16, x as u64)
    }
}

impl Boxable for i32 {
    fn bits_type(b: &Builtins) -> Value {
        b.int32_type
    }
    fn to_raw(self) -> u64 {
        self as u32 as u64
    }
    fn from_raw(raw: u64) -> Self {
        raw as u32 as i32
    }
    fn cached(ctx: &Context, x: Self) -> Option<Value> {
        signed_slot(&ctx.boxes.int32, x as i64)
    }
}

impl Boxable for u32 {
    fn bits_type(b: &Builtins) -> Value {
        b.uint32_type
    }
    fn to_raw(self) -> u64 {
        self as u64
    }
    fn from_raw(raw: u64) -> Self {
        raw as u32
    }
    fn cached(ctx: &Context, x: Self) -> Option<Value> {
        unsigned_slot(&ctx.boxes.uint32, x as u64)
    }
}

impl Boxable for i64 {
    fn bits_type(b: &Builtins) -> Value {
        b.int64_type
    }
    fn to_raw(self) -> u64 {
        self as u64
    }
    fn from_raw(raw: u64) -> Self {
        raw as i64
    }
    fn cached(ctx: &Context, x: Self) -> Option<Value> {
        signed_slot(&ctx.boxes.int64, x)
    }
}

impl Boxable for u64 {
    fn bits_type(b: &Builtins) -> Value {
        b.uint64_type
    }
    fn to_raw(self) -> u64 {
        self
    }
    fn from_raw(raw: u64) -> Self {
        raw
    }
    fn cached(ctx: &Context, x: Self) -> Option<Value> {
        unsigned_slot(&ctx.boxes.uint64, x)
    }
}

impl Boxable for f32 {
    fn bits_type(b: &Builtins) -> Value {
        b.float32_type
    }
    fn to_raw(self) -> u64 {
        self.to_bits() as u64
    }
    fn from_raw(raw: u64) -> Self {
        f32::from_bits(raw as u32)
    }
}

impl Boxable for f64 {
    fn bits_type(b: &Builtins) -> Value {
        b.float64_type
    }
    fn to_raw(self) -> u64 {
        self.to_bits()
    }
    fn from_raw(raw: u64) -> Self {
        f64::from_bits(raw)
    }
}

impl Boxable for bool {
    fn bits_type(b: &Builtins) -> Value {
        b.bool_type
    }
    fn to_raw(self) -> u64 {
        self as u64
    }
    fn from_raw(raw: u64) -> Self {
        raw & 1 != 0
    }
    fn cached(ctx: &Context, x: Self) -> Option<Value> {
        Some(ctx.box_bool(x))
    }
}

impl Context {
    /// Allocate a boxed scalar of bits type `ty`. Always allocates.
    pub fn new_bits(&mut self, ty: Value, raw: u64) -> Value {
        let raw = match self.bits_type_nbits(ty) {
            Some(nbits) if nbits < 64 => raw & ((1u64 << nbits) - 1),
            _ => raw,
        };
        self.heap.alloc(ty, ManagedObject::Bits(BitsBox { raw }))
    }

    /// Box raw bits of type `ty`. Builtin scalar types go through their
    /// canonical instances; any other bits type gets a fresh box.
    pub fn box_raw(&mut self, ty: Value, raw: u64) -> Value {
        let b = &self.b;
        if ty.is(b.bool_type) {
            self.box_bool(bool::from_raw(raw))
        } else if ty.is(b.int8_type) {
            self.box_value(i8::from_raw(raw))
        } else if ty.is(b.uint8_type) {
            self.box_value(u8::from_raw(raw))
        } else if ty.is(b.int16_type) {
            self.box_value(i16::from_raw(raw))
        } else if ty.is(b.uint16_type) {
            self.box_value(u16::from_raw(raw))
        } else if ty.is(b.int32_type) {
            self.box_value(i32::from_raw(raw))
        } else if ty.is(b.uint32_type) {
            self.box_value(u32::from_raw(raw))
        } else if ty.is(b.int64_type) {
            self.box_value(i64::from_raw(raw))
        } else if ty.is(b.uint64_type) {
            self.box_value(raw)
        } else {
            self.new_bits(ty, raw)
        }
    }

    /// Raw bits of a boxed scalar.
    pub fn bits_raw(&self, v: Value) -> Option<u64> {
        match self.heap.obj(v) {
            ManagedObject::Bits(b) => Some(b.raw),
            _ => None,
        }
    }

    /// Fresh box, bypassing the caches.
    pub fn new_box<T: Boxable>(&mut self, x: T) -> Value {
        let ty = T::bits_type(&self.b);
        self.new_bits(ty, x.to_raw())
    }

    /// Box `x`, returning the cached instance when one exists.
    pub fn box_value<T: Boxable>(&mut self, x: T) -> Value {
        match T::cached(self, x) {
            Some(v) => v,
            None => self.new_box(x),
        }
    }

    /// Unbox `v` as a `T`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a box of `T`'s bits type.
    pub fn unbox_value<T: Boxable>(&self, v: Value) -> T {
        let expected = T::bits_type(&self.b);
        let actual = self.type_of(v);
        assert!(
            actual.is(expected),
            "unbox: expected {}, got {}",
            self.show(expected),
            self.show(actual)
        );
        match self.bits_raw(v) {
            Some(raw) => T::from_raw(raw),
            None => panic!("unbox: {} is not a bits value", self.show(v)),
        }
    }

    pub fn box_int8(&mut self, x: i8) -> Value {
        self.box_value(x)
    }

    pub fn box_uint8(&mut self, x: u8) -> Value {
        self.box_value(x)
    }

    pub fn box_int16(&mut self, x: i16) -> Value {
        self.box_value(x)
    }

    pub fn box_uint16(&mut self, x: u16) -> Value {
        self.box_value(x)
    }

    pub fn box_int32(&mut self, x: i32) -> Value {
        self.box_value(x)
    }

    pub fn box_uint32(&mut self, x: u32) -> Value {
        self.box_value(x)
    }

    pub fn box_int64(&mut self, x: i64) -> Value {
        self.box_value(x)
    }

    pub fn box_uint64(&mut self, x: u64) -> Value {
        self.box_value(x)
    }

    pub fn box_float32(&mut self, x: f32) -> Value {
        self.box_value(x)
    }

    pub fn box_float64(&mut self, x: f64) -> Value {
        self.box_value(x)
    }

    pub fn box_bool(&self, x: bool) -> Value {
        if x { self.b.true_v } else { self.b.false_v }
    }

    pub fn unbox_int8(&self, v: Value) -> i8 {
        self.unbox_value(v)
    }

    pub fn unbox_uint8(&self, v: Value) -> u8 {
        self.unbox_value(v)
    }

    pub fn unbox_int16(&self, v: Value) -> i16 {
        self.unbox_value(v)
    }

    pub fn unbox_uint16(&self, v: Value) -> u16 {
        self.unbox_value(v)
    }

    pub fn unbox_int32(&self, v: Value) -> i32 {
        self.unbox_value(v)
    }

    pub fn unbox_uint32(&self, v: Value) -> u32 {
        self.unbox_value(v)
    }

    pub fn unbox_int64(&self, v: Value) -> i64 {
        self.unbox_value(v)
    }

    pub fn unbox_uint64(&self, v: Value) -> u64 {
        self.unbox_value(v)
    }

    pub fn unbox_float32(&self, v: Value) -> f32 {
        self.unbox_value(v)
    }

    pub fn unbox_float64(&self, v: Value) -> f64 {
        self.unbox_value(v)
    }

    pub fn unbox_bool(&self, v: Value) -> bool {
        self.unbox_value(v)
    }

    /// Whether `ty` is an instantiation of `Ptr{T}`.
    pub fn is_pointer_type(&self, ty: Value) -> bool {
        let ptr_name = self.type_name_of(self.b.pointer_void_type);
        self.is_bits_type(ty) && ptr_name.is_some_and(|n| self.type_name_of(ty) == Some(n))
    }

    /// Box an address as a value of the pointer type `ty`. Never cached.
    pub fn box_pointer(&mut self, ty: Value, addr: usize) -> Result<Value> {
        if !self.is_pointer_type(ty) {
            return Err(RuntimeError::TypeCheck {
                func: "box_pointer".into(),
                expected: "Ptr".into(),
                actual: self.show(ty),
            });
        }
        Ok(self.new_bits(ty, addr as u64))
    }

    /// # Panics
    ///
    /// Panics if `v` is not a boxed pointer.
    pub fn unbox_pointer(&self, v: Value) -> usize {
        let ty = self.type_of(v);
        assert!(
            self.is_pointer_type(ty),
            "unbox_pointer: expected Ptr, got {}",
            self.show(ty)
        );
        self.bits_raw(v).unwrap_or_default() as usize
    }

    /// Fill the small-integer caches. Only the first call does anything.
    pub(crate) fn init_box_caches(&mut self) {
        if self.boxes.populated {
            return;
        }
        let int8: Vec<Value> = (-128i16..128).map(|i| self.new_box(i as i8)).collect();
        let uint8: Vec<Value> = (0u16..256).map(|i| self.new_box(i as u8)).collect();
        let signed = -SIGNED_CACHE_BIAS..SIGNED_CACHE_BIAS;
        let int16: Vec<Value> = signed.clone().map(|i| self.new_box(i as i16)).collect();
        let int32: Vec<Value> = signed.clone().map(|i| self.new_box(i as i32)).collect();
        let int64: Vec<Value> = signed.map(|i| self.new_box(i)).collect();
        let uint16: Vec<Value> = (0..UNSIGNED_CACHE_LEN).map(|i| self.new_box(i as u16)).collect();
        let uint32: Vec<Value> = (0..UNSIGNED_CACHE_LEN).map(|i| self.new_box(i as u32)).collect();
        let uint64: Vec<Value> = (0..UNSIGNED_CACHE_LEN).map(|i| self.new_box(i)).collect();
        self.boxes = BoxCaches {
            int8,
            uint8,
            int16,
            uint16,
            int32,
            uint32,
            int64,
            uint64,
            populated: true,
        };
        trace!(objects = self.heap.len(), "box caches populated");
    }

    /// Render a boxed scalar of type `ty`.
    pub(crate) fn show_bits(&self, ty: Value, raw: u64) -> String {
        let b = &self.b;
        let mut digits = itoa::Buffer::new();
        if ty.is(b.bool_type) {
            return bool::from_raw(raw).to_string();
        }
        let text = if ty.is(b.int8_type) {
            digits.format(i8::from_raw(raw))
        } else if ty.is(b.uint8_type) {
            digits.format(u8::from_raw(raw))
        } else if ty.is(b.int16_type) {
            digits.format(i16::from_raw(raw))
        } else if ty.is(b.uint16_type) {
            digits.format(u16::from_raw(raw))
        } else if ty.is(b.int32_type) {
            digits.format(i32::from_raw(raw))
        } else if ty.is(b.uint32_type) {
            digits.format(u32::from_raw(raw))
        } else if ty.is(b.int64_type) {
            digits.format(i64::from_raw(raw))
        } else if ty.is(b.uint64_type) {
            digits.format(raw)
        } else if ty.is(b.float32_type) {
            return f32::from_raw(raw).to_string();
        } else if ty.is(b.float64_type) {
            return f64::from_raw(raw).to_string();
        } else {
            return format!("{}(0x{:x})", self.show(ty), raw);
        };
        text.to_string()
    }
}
