//! Type constructors and instantiation.
//!
//! A type constructor is a function value whose `parameters` and `body` name
//! a generic type. Applying it substitutes actual parameters for the formals.
//! When the body is a struct type, the constructor also allocates instances:
//! each call-site gets a specialized closure that memoizes the instantiated
//! type on its own lambda info.

use lark_core::Value;
use smallvec::SmallVec;
use tracing::trace;

use crate::Context;
use crate::construct::check_arity;
use crate::context::{InstKey, ParamKey};
use crate::core::{FunctionData, ManagedObject, TagData};
use crate::errors::{Result, RuntimeError};
use crate::matching::MatchResult;

/// Entry point of type constructors whose body has no instances to build.
pub(crate) fn no_function(ctx: &mut Context, f: Value, _args: &[Value]) -> Result<Value> {
    let name = match ctx.function_data(f).and_then(|fd| fd.body) {
        Some(body) => ctx.show(body),
        None => ctx.show(f),
    };
    Err(RuntimeError::NotCallable(name))
}

/// Entry point of a struct type constructor: infer the call-site from the
/// argument types, then build the instance there.
fn type_ctor_call(ctx: &mut Context, tc: Value, args: &[Value]) -> Result<Value> {
    let site = ctx.infer_ctor_call_site(tc, args)?;
    ctx.call(site, args)
}

/// Positional allocator shared by every call-site of one struct type
/// constructor. `env` is the constructor; `linfo` carries the call-site's
/// static parameters and memoized type.
pub(crate) fn generic_ctor(ctx: &mut Context, site: Value, args: &[Value]) -> Result<Value> {
    let tc = ctx
        .function_env(site)
        .ok_or_else(|| RuntimeError::NotCallable(ctx.show(site)))?;
    let li = ctx
        .function_linfo(site)
        .ok_or_else(|| RuntimeError::NotCallable(ctx.show(site)))?;
    let (formals, body) = ctx.ctor_parts(tc)?;

    let memo = ctx.lambda_info(li).and_then(|data| data.instantiated);
    let ty = match memo {
        Some(ty) => ty,
        None => {
            let sparams = ctx.lambda_sparams(li).unwrap_or(ctx.b.null);
            let sparams = ctx.tuple_vec(sparams);
            let nformals = ctx.tuple_len(formals).unwrap_or(0);
            if sparams.len() != nformals * 2 {
                return Err(RuntimeError::CannotInferParameters {
                    name: ctx.type_name_str(body),
                });
            }
            let ty = ctx.instantiate_type_with(body, &sparams)?;
            if let Some(data) = ctx.lambda_info_mut(li) {
                data.instantiated = Some(ty);
            }
            trace!(ty = %ctx.show(ty), "call-site memoized");
            ty
        }
    };

    let nfields = ctx
        .struct_field_names(ty)
        .and_then(|names| ctx.tuple_len(names))
        .unwrap_or(0);
    check_arity(nfields, args.len())?;
    Ok(ctx.new_struct(ty, args))
}

impl Context {
    /// Create a type constructor over the formal parameters `params`.
    pub fn new_type_ctor(&mut self, params: Value, body: Value) -> Value {
        let tc = if self.is_struct_type(body) {
            let tc = self.new_closure(type_ctor_call, None);
            let gmeth = self.new_closure(generic_ctor, Some(tc));
            let li = self.new_lambda_info(None, self.b.null);
            if let Some(fd) = self.function_data_mut(gmeth) {
                fd.linfo = Some(li);
            }
            if let Some(fd) = self.function_data_mut(tc) {
                fd.env = Some(gmeth);
            }
            tc
        } else {
            self.new_closure(no_function, None)
        };
        let nparams = self.tuple_len(params).unwrap_or(0);
        if let Some(fd) = self.function_data_mut(tc) {
            fd.body = Some(body);
            fd.parameters = Some(params);
            if nparams == 0 {
                fd.unconstrained = Some(body);
            }
        }
        if let Some(tn) = self.type_name_of(body) {
            if self.register_typename_ctor(tn, tc) {
                trace!(ty = %self.show(body), "type constructor registered");
            }
        }
        tc
    }

    pub fn is_type_ctor(&self, v: Value) -> bool {
        self.function_data(v)
            .is_some_and(|fd| fd.body.is_some() && fd.parameters.is_some())
    }

    pub fn type_ctor_body(&self, tc: Value) -> Option<Value> {
        self.function_data(tc).and_then(|fd| fd.body)
    }

    pub fn type_ctor_params(&self, tc: Value) -> Option<Value> {
        self.function_data(tc).and_then(|fd| fd.parameters)
    }

    fn ctor_parts(&self, tc: Value) -> Result<(Value, Value)> {
        match self.function_data(tc) {
            Some(FunctionData {
                parameters: Some(params),
                body: Some(body),
                ..
            }) => Ok((*params, *body)),
            _ => Err(RuntimeError::NotATypeConstructor(self.show(tc))),
        }
    }

    /// Apply a type constructor to actual parameters.
    pub fn apply_type_ctor(&mut self, tc: Value, params: &[Value]) -> Result<Value> {
        let (formals, body) = self.ctor_parts(tc)?;
        let formals = self.tuple_vec(formals);
        if formals.len() != params.len() {
            return Err(RuntimeError::TypeParameterCount {
                name: self.type_name_str(body),
                expected: formals.len(),
                actual: params.len(),
            });
        }
        if formals.is_empty() {
            let cached = self.function_data(tc).and_then(|fd| fd.unconstrained);
            return Ok(cached.unwrap_or(body));
        }
        let env: SmallVec<[Value; 8]> = formals
            .iter()
            .zip(params)
            .flat_map(|(&formal, &actual)| [formal, actual])
            .collect();
        self.instantiate_type_with(body, &env)
    }

    /// Same as [`Context::apply_type_ctor`].
    pub fn instantiate(&mut self, tc: Value, params: &[Value]) -> Result<Value> {
        self.apply_type_ctor(tc, params)
    }

    /// Substitute the bindings in the flat `(formal, actual, ...)` slice
    /// `env` throughout `ty`. Returns `ty` itself when nothing changes.
    pub fn instantiate_type_with(&mut self, ty: Value, env: &[Value]) -> Result<Value> {
        if env.is_empty() || !self.has_typevars(ty) {
            return Ok(ty);
        }
        match self.heap.obj(ty) {
            ManagedObject::TypeVar(_) => Ok(env
                .chunks_exact(2)
                .find(|pair| pair[0].is(ty))
                .map_or(ty, |pair| pair[1])),
            ManagedObject::Tuple(elems) => {
                let elems = elems.clone();
                let mut out = elems.clone();
                for slot in out.iter_mut() {
                    *slot = self.instantiate_type_with(*slot, env)?;
                }
                if out.iter().zip(elems.iter()).all(|(a, b)| a.is(*b)) {
                    Ok(ty)
                } else {
                    Ok(self.alloc_tuple(out))
                }
            }
            ManagedObject::UnionType(members) => {
                let members = *members;
                let new_members = self.instantiate_type_with(members, env)?;
                if new_members.is(members) {
                    return Ok(ty);
                }
                let new_members = self.tuple_vec(new_members);
                self.new_union_type(&new_members)
            }
            ManagedObject::FuncType { from, to } => {
                let (from, to) = (*from, *to);
                let new_from = self.instantiate_type_with(from, env)?;
                let new_to = self.instantiate_type_with(to, env)?;
                if new_from.is(from) && new_to.is(to) {
                    Ok(ty)
                } else {
                    Ok(self.new_function_type(new_from, new_to))
                }
            }
            ManagedObject::TagType(_) | ManagedObject::BitsType(_) | ManagedObject::StructType(_) => {
                self.instantiate_tag(ty, env)
            }
            _ => Ok(ty),
        }
    }

    fn instantiate_tag(&mut self, ty: Value, env: &[Value]) -> Result<Value> {
        let Some(tag) = self.tag_data(ty) else {
            return Ok(ty);
        };
        let params = self.instantiate_type_with(tag.parameters, env)?;
        if params.is(tag.parameters) {
            return Ok(ty);
        }
        let key = self.inst_key(tag.name, params);
        if let Some(hit) = key.as_ref().and_then(|k| self.registry.inst_cache.get(k)) {
            trace!(ty = %self.show(*hit), "instantiation cache hit");
            return Ok(*hit);
        }

        let sup = self.instantiate_type_with(tag.sup, env)?;
        let new_tag = TagData {
            name: tag.name,
            sup,
            parameters: params,
        };
        let inst = match self.heap.obj(ty) {
            ManagedObject::BitsType(bits) => {
                let nbits = bits.nbits;
                self.new_bits_type(tag.name, sup, params, nbits)
            }
            ManagedObject::StructType(st) => {
                let (names, types) = (st.names, st.types);
                let fnew_fptr = st
                    .fnew
                    .and_then(|f| self.function_data(f))
                    .map(|fd| fd.fptr);
                let types = self.instantiate_type_with(types, env)?;
                let inst = self.alloc_struct_type(new_tag, names, types);
                if let Some(fptr) = fnew_fptr {
                    let fnew = self.new_closure(fptr, Some(inst));
                    self.set_struct_fnew(inst, Some(fnew));
                }
                inst
            }
            _ => self.new_tag_type(tag.name, sup, params),
        };
        if let Some(key) = key {
            self.registry.inst_cache.insert(key, inst);
        }
        Ok(inst)
    }

    /// Cache key of a concrete instantiation; `None` while any parameter is
    /// still generic.
    fn inst_key(&self, name: Value, params: Value) -> Option<InstKey> {
        if self.has_typevars(params) {
            return None;
        }
        let elems = self.tuple_elems(params).unwrap_or(&[]);
        let key = elems.iter().map(|&p| self.param_key(p)).collect();
        Some((name.index(), key))
    }

    fn param_key(&self, p: Value) -> ParamKey {
        match self.heap.obj(p) {
            ManagedObject::Bits(bits) => ParamKey::Bits {
                ty: self.type_of(p).index(),
                raw: bits.raw,
            },
            ManagedObject::Tuple(elems) => {
                ParamKey::Tuple(elems.iter().map(|&e| self.param_key(e)).collect())
            }
            ManagedObject::UnionType(members) => {
                let mut keys: Vec<ParamKey> = self
                    .tuple_elems(*members)
                    .unwrap_or(&[])
                    .iter()
                    .map(|&m| self.param_key(m))
                    .collect();
                keys.sort_unstable();
                keys.dedup();
                ParamKey::Union(keys)
            }
            ManagedObject::FuncType { from, to } => ParamKey::Func(
                Box::new(self.param_key(*from)),
                Box::new(self.param_key(*to)),
            ),
            _ => match self.type_uid(p) {
                0 => ParamKey::Obj(p.index()),
                uid => ParamKey::Uid(uid),
            },
        }
    }

    /// A call-site of the struct type constructor `tc` with the given flat
    /// `(formal, actual, ...)` static parameters.
    pub fn specialize_ctor(&mut self, tc: Value, sparams: Value) -> Result<Value> {
        let gmeth = self
            .function_env(tc)
            .filter(|&g| self.is_function(g))
            .ok_or_else(|| RuntimeError::NotConstructible(self.show(tc)))?;
        let Some(template) = self.function_data(gmeth).cloned() else {
            return Err(RuntimeError::NotConstructible(self.show(tc)));
        };
        let li = self.new_lambda_info(None, sparams);
        let site = FunctionData {
            linfo: Some(li),
            ..template
        };
        Ok(self
            .heap
            .alloc(self.b.any_func, ManagedObject::Function(Box::new(site))))
    }

    /// Infer static parameters for a call of `tc` on `args` by matching the
    /// argument types against the declared field types, and return the
    /// specialized call-site.
    ///
    /// Sites are cached per argument types, so repeated calls with the same
    /// argument types share one call-site and its memoized type.
    pub fn infer_ctor_call_site(&mut self, tc: Value, args: &[Value]) -> Result<Value> {
        let (_, body) = self.ctor_parts(tc)?;
        let field_types = self.struct_field_types(body).unwrap_or(self.b.null);
        check_arity(self.tuple_len(field_types).unwrap_or(0), args.len())?;

        let arg_types: SmallVec<[Value; 4]> = args.iter().map(|&a| self.type_of(a)).collect();
        let site_key: InstKey = (
            tc.index(),
            arg_types.iter().map(|&t| self.param_key(t)).collect(),
        );
        if let Some(&site) = self.registry.call_sites.get(&site_key) {
            return Ok(site);
        }
        let arg_types = self.tuple(&arg_types);
        let matcher = self.matcher.clone();
        let sparams = match matcher.type_match(self, arg_types, field_types)? {
            MatchResult::NoMatch => {
                return Err(RuntimeError::NoMatchingConstructor(self.type_name_str(body)));
            }
            MatchResult::Trivial => self.b.null,
            MatchResult::Bindings(chain) => self.flatten_pairs(chain)?,
        };
        let site = self.specialize_ctor(tc, sparams)?;
        self.registry.call_sites.insert(site_key, site);
        Ok(site)
    }
}
