//! Structural type matching.
//!
//! The full unification engine lives outside the allocation core. Union
//! construction and constructor-parameter inference only need its three-valued
//! answer, so that is all this seam exposes.

use lark_core::Value;

use crate::Context;
use crate::core::ManagedObject;
use crate::errors::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchResult {
    /// `a` does not match the pattern `b`.
    NoMatch,
    /// `a` matches `b` without binding any variable.
    Trivial,
    /// `a` matches `b` under the variable bindings in this pair chain.
    Bindings(Value),
}

pub trait TypeMatcher {
    /// Match `a` against the pattern `b`, binding type variables of `b`.
    fn type_match(&self, ctx: &mut Context, a: Value, b: Value) -> Result<MatchResult>;
}

/// Default matcher: purely structural, no subtyping.
///
/// A type variable in the pattern binds to whatever sits in the same position
/// of `a`, and must bind consistently if it occurs more than once.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralMatcher;

impl TypeMatcher for StructuralMatcher {
    fn type_match(&self, ctx: &mut Context, a: Value, b: Value) -> Result<MatchResult> {
        let mut env: Vec<(Value, Value)> = Vec::new();
        if !match_into(ctx, a, b, &mut env) {
            return Ok(MatchResult::NoMatch);
        }
        if env.is_empty() {
            return Ok(MatchResult::Trivial);
        }
        let flat: Vec<Value> = env.iter().flat_map(|&(tv, val)| [tv, val]).collect();
        Ok(MatchResult::Bindings(ctx.pair_chain(&flat)))
    }
}

fn match_into(ctx: &Context, a: Value, b: Value, env: &mut Vec<(Value, Value)>) -> bool {
    if a.is(b) {
        return true;
    }
    if ctx.is_typevar(b) {
        if let Some(&(_, bound)) = env.iter().find(|(tv, _)| tv.is(b)) {
            return ctx.type_eq(bound, a);
        }
        env.push((b, a));
        return true;
    }
    match (ctx.heap.obj(a), ctx.heap.obj(b)) {
        (ManagedObject::Tuple(xs), ManagedObject::Tuple(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|(&x, &y)| match_into(ctx, x, y, env))
        }
        (ManagedObject::UnionType(xs), ManagedObject::UnionType(ys)) => {
            match_into(ctx, *xs, *ys, env)
        }
        (ManagedObject::FuncType { from: f1, to: t1 }, ManagedObject::FuncType { from: f2, to: t2 }) => {
            match_into(ctx, *f1, *f2, env) && match_into(ctx, *t1, *t2, env)
        }
        _ => match (ctx.tag_data(a), ctx.tag_data(b)) {
            (Some(ta), Some(tb)) => {
                ta.name.is(tb.name) && match_into(ctx, ta.parameters, tb.parameters, env)
            }
            _ => ctx.type_eq(a, b),
        },
    }
}
