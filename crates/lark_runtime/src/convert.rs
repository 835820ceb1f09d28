//! Field conversion.
//!
//! Struct constructors store each argument after converting it to the declared
//! field type. Real conversion rules belong to the language; this seam only
//! fixes the contract.

use lark_core::Value;

use crate::Context;
use crate::errors::{Result, RuntimeError};

pub trait Converter {
    fn convert(&self, ctx: &mut Context, target: Value, v: Value) -> Result<Value>;
}

/// Default converter: passes a value through unchanged when its type conforms
/// to the target, and fails otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubtypeConverter;

impl Converter for SubtypeConverter {
    fn convert(&self, ctx: &mut Context, target: Value, v: Value) -> Result<Value> {
        let ty = ctx.type_of(v);
        if ctx.conforms(ty, target) {
            Ok(v)
        } else {
            Err(RuntimeError::ConversionFailed {
                from: ctx.show(ty),
                to: ctx.show(target),
            })
        }
    }
}

impl Context {
    /// Whether a value of type `ty` can be stored where `target` is declared:
    /// `target` is Any, a type variable, a union with a conforming member, or
    /// `ty` itself or one of its supertypes.
    pub fn conforms(&self, ty: Value, target: Value) -> bool {
        if target.is(self.b.any_type) || self.is_typevar(target) {
            return true;
        }
        if let Some(members) = self.union_members(target) {
            let members = self.tuple_elems(members).unwrap_or(&[]);
            return members.iter().any(|&m| self.conforms(ty, m));
        }
        let mut t = ty;
        loop {
            if self.type_eq(t, target) {
                return true;
            }
            match self.supertype(t) {
                Some(sup) if !sup.is(t) => t = sup,
                _ => return false,
            }
        }
    }
}
