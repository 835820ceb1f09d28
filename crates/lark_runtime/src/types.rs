//! Type descriptors.
//!
//! Constructors for every type variant validate and normalize eagerly. Concrete
//! bits and struct types receive a uid for identity comparison; types whose
//! parameters contain free type variables keep `uid == 0` and are compared
//! structurally.

use std::mem;

use lark_core::Value;
use tracing::trace;

use crate::Context;
use crate::construct::new_struct_internal;
use crate::core::{
    BitsTypeData, ManagedObject, StructTypeData, TagData, TypeNameData, TypeVarData,
};
use crate::errors::{Result, RuntimeError};
use crate::matching::MatchResult;

impl Context {
    pub(crate) fn assign_type_uid(&mut self) -> u32 {
        let uid = self.registry.next_uid;
        self.registry.next_uid += 1;
        uid
    }

    fn uid_for(&mut self, params: Value) -> u32 {
        if self.has_typevars(params) {
            0
        } else {
            self.assign_type_uid()
        }
    }

    pub fn new_typename(&mut self, name: Value) -> Value {
        self.heap.alloc(
            self.b.typename_type,
            ManagedObject::TypeName(Box::new(TypeNameData { name, ctor: None })),
        )
    }

    /// Accept either an existing TypeName or a symbol to name a new one.
    fn resolve_typename(&mut self, name: Value) -> Value {
        if self.is_typename(name) {
            name
        } else {
            self.new_typename(name)
        }
    }

    pub fn new_tag_type(&mut self, name: Value, sup: Value, parameters: Value) -> Value {
        let name = self.resolve_typename(name);
        let tag = TagData {
            name,
            sup,
            parameters,
        };
        self.heap
            .alloc(self.b.tag_kind, ManagedObject::TagType(Box::new(tag)))
    }

    pub fn new_bits_type(&mut self, name: Value, sup: Value, parameters: Value, nbits: u32) -> Value {
        let name = self.resolve_typename(name);
        let uid = self.uid_for(parameters);
        let data = BitsTypeData {
            tag: TagData {
                name,
                sup,
                parameters,
            },
            nbits,
            uid,
        };
        let t = self
            .heap
            .alloc(self.b.bits_kind, ManagedObject::BitsType(Box::new(data)));
        trace!(ty = %self.show(t), uid, "new bits type");
        t
    }

    /// Create a struct type. `name` is always a symbol: every struct type gets
    /// its own TypeName.
    pub fn new_struct_type(
        &mut self,
        name: Value,
        sup: Value,
        parameters: Value,
        names: Value,
        types: Value,
    ) -> Value {
        let name = self.new_typename(name);
        let t = self.alloc_struct_type(
            TagData {
                name,
                sup,
                parameters,
            },
            names,
            types,
        );
        let fnew = self.new_closure(new_struct_internal, Some(t));
        self.set_struct_fnew(t, Some(fnew));
        t
    }

    /// Allocate a struct type without a default constructor.
    pub(crate) fn alloc_struct_type(&mut self, tag: TagData, names: Value, types: Value) -> Value {
        let uid = self.uid_for(tag.parameters);
        let data = StructTypeData {
            tag,
            names,
            types,
            fnew: None,
            uid,
        };
        let t = self
            .heap
            .alloc(self.b.struct_kind, ManagedObject::StructType(Box::new(data)));
        trace!(ty = %self.show(t), uid, "new struct type");
        t
    }

    pub(crate) fn set_struct_fnew(&mut self, t: Value, fnew: Option<Value>) {
        if let ManagedObject::StructType(st) = self.heap.obj_mut(t) {
            st.fnew = fnew;
        }
    }

    /// Create a union of `members`.
    ///
    /// One member is rejected: `Union(T)` is `T` and must be collapsed before
    /// reaching this layer. No members gives the bottom type.
    pub fn new_union_type(&mut self, members: &[Value]) -> Result<Value> {
        if members.len() == 1 {
            return Err(RuntimeError::InvalidUnion);
        }
        let matcher = self.matcher.clone();
        for (i, &a) in members.iter().enumerate() {
            for (j, &b) in members.iter().enumerate() {
                if i == j {
                    continue;
                }
                if self.has_typevars(b) && (!self.is_typevar(b) || self.has_typevars(a)) {
                    if let MatchResult::Bindings(_) = matcher.type_match(self, a, b)? {
                        return Err(RuntimeError::AmbiguousUnionPattern);
                    }
                }
            }
        }
        let types = self.tuple(members);
        Ok(self
            .heap
            .alloc(self.b.union_kind, ManagedObject::UnionType(types)))
    }

    /// Create the function type `a --> b`. An argument type that is neither a
    /// tuple nor a type variable is wrapped in a one-element tuple.
    pub fn new_function_type(&mut self, a: Value, b: Value) -> Value {
        let from = if !self.is_tuple(a) && !self.is_typevar(a) {
            self.tuple(&[a])
        } else {
            a
        };
        self.heap
            .alloc(self.b.func_kind, ManagedObject::FuncType { from, to: b })
    }

    /// A type variable ranging over all types.
    pub fn new_type_var(&mut self, name: Value) -> Value {
        let data = TypeVarData {
            name,
            lb: self.b.bottom_type,
            ub: self.b.any_type,
        };
        self.heap
            .alloc(self.b.tvar_type, ManagedObject::TypeVar(Box::new(data)))
    }

    /// A tuple of fresh type variables with the given names.
    pub fn type_vars(&mut self, names: &[&str]) -> Value {
        let mut tvs = Vec::with_capacity(names.len());
        for name in names {
            let sym = self.intern(name);
            tvs.push(self.new_type_var(sym));
        }
        self.tuple(&tvs)
    }

    // ------------------------------------------------------------------
    // Predicates and accessors
    // ------------------------------------------------------------------

    pub fn is_typename(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::TypeName(_))
    }

    pub fn is_typevar(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::TypeVar(_))
    }

    pub fn is_tag_type(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::TagType(_))
    }

    pub fn is_bits_type(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::BitsType(_))
    }

    pub fn is_struct_type(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::StructType(_))
    }

    pub fn is_union_type(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::UnionType(_))
    }

    pub fn is_func_type(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::FuncType { .. })
    }

    /// Tag, bits or struct type.
    pub fn is_some_tag_type(&self, v: Value) -> bool {
        self.tag_data(v).is_some()
    }

    /// Any type descriptor, or a tuple of types.
    pub fn is_type(&self, v: Value) -> bool {
        match self.heap.obj(v) {
            ManagedObject::TagType(_)
            | ManagedObject::BitsType(_)
            | ManagedObject::StructType(_)
            | ManagedObject::UnionType(_)
            | ManagedObject::FuncType { .. }
            | ManagedObject::TypeVar(_) => true,
            ManagedObject::Tuple(elems) => elems.iter().all(|&e| self.is_type(e)),
            _ => false,
        }
    }

    pub fn tag_data(&self, v: Value) -> Option<TagData> {
        match self.heap.obj(v) {
            ManagedObject::TagType(t) => Some(**t),
            ManagedObject::BitsType(t) => Some(t.tag),
            ManagedObject::StructType(t) => Some(t.tag),
            _ => None,
        }
    }

    /// The TypeName shared by all instantiations of a tag-family type.
    pub fn type_name_of(&self, ty: Value) -> Option<Value> {
        self.tag_data(ty).map(|t| t.name)
    }

    pub fn typename_ctor(&self, tn: Value) -> Option<Value> {
        match self.heap.obj(tn) {
            ManagedObject::TypeName(n) => n.ctor,
            _ => None,
        }
    }

    /// Register `ctor` as the canonical constructor of `tn` unless one is
    /// already registered. Returns whether it was registered.
    pub(crate) fn register_typename_ctor(&mut self, tn: Value, ctor: Value) -> bool {
        if let ManagedObject::TypeName(n) = self.heap.obj_mut(tn) {
            if n.ctor.is_none() {
                n.ctor = Some(ctor);
                return true;
            }
        }
        false
    }

    pub fn type_parameters(&self, ty: Value) -> Option<Value> {
        self.tag_data(ty).map(|t| t.parameters)
    }

    pub fn tparam(&self, ty: Value, i: usize) -> Option<Value> {
        self.type_parameters(ty).and_then(|p| self.tupleref(p, i))
    }

    pub fn supertype(&self, ty: Value) -> Option<Value> {
        self.tag_data(ty).map(|t| t.sup)
    }

    /// uid of a concrete bits or struct type; 0 for everything else.
    pub fn type_uid(&self, ty: Value) -> u32 {
        match self.heap.obj(ty) {
            ManagedObject::BitsType(t) => t.uid,
            ManagedObject::StructType(t) => t.uid,
            _ => 0,
        }
    }

    pub fn bits_type_nbits(&self, ty: Value) -> Option<u32> {
        match self.heap.obj(ty) {
            ManagedObject::BitsType(t) => Some(t.nbits),
            _ => None,
        }
    }

    pub fn struct_field_names(&self, ty: Value) -> Option<Value> {
        match self.heap.obj(ty) {
            ManagedObject::StructType(t) => Some(t.names),
            _ => None,
        }
    }

    pub fn struct_field_types(&self, ty: Value) -> Option<Value> {
        match self.heap.obj(ty) {
            ManagedObject::StructType(t) => Some(t.types),
            _ => None,
        }
    }

    /// Default constructor closure of a struct type.
    pub fn struct_fnew(&self, ty: Value) -> Option<Value> {
        match self.heap.obj(ty) {
            ManagedObject::StructType(t) => t.fnew,
            _ => None,
        }
    }

    pub fn union_members(&self, ty: Value) -> Option<Value> {
        match self.heap.obj(ty) {
            ManagedObject::UnionType(types) => Some(*types),
            _ => None,
        }
    }

    pub fn func_type_parts(&self, ty: Value) -> Option<(Value, Value)> {
        match self.heap.obj(ty) {
            ManagedObject::FuncType { from, to } => Some((*from, *to)),
            _ => None,
        }
    }

    /// Whether `v` mentions a type variable anywhere in its structure.
    pub fn has_typevars(&self, v: Value) -> bool {
        match self.heap.obj(v) {
            ManagedObject::TypeVar(_) => true,
            ManagedObject::Tuple(elems) => elems.iter().any(|&e| self.has_typevars(e)),
            ManagedObject::TagType(t) => self.has_typevars(t.parameters),
            ManagedObject::BitsType(t) => self.has_typevars(t.tag.parameters),
            ManagedObject::StructType(t) => self.has_typevars(t.tag.parameters),
            ManagedObject::UnionType(types) => self.has_typevars(*types),
            ManagedObject::FuncType { from, to } => {
                self.has_typevars(*from) || self.has_typevars(*to)
            }
            _ => false,
        }
    }

    /// Type identity: by uid when both sides have one, structural otherwise.
    pub fn type_eq(&self, a: Value, b: Value) -> bool {
        if a.is(b) {
            return true;
        }
        let (oa, ob) = (self.heap.obj(a), self.heap.obj(b));
        if mem::discriminant(oa) != mem::discriminant(ob) {
            return false;
        }
        match (oa, ob) {
            (ManagedObject::Tuple(x), ManagedObject::Tuple(y)) => {
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(&p, &q)| self.type_eq(p, q))
            }
            (ManagedObject::UnionType(x), ManagedObject::UnionType(y)) => {
                let xs = self.tuple_elems(*x).unwrap_or(&[]);
                let ys = self.tuple_elems(*y).unwrap_or(&[]);
                xs.iter().all(|&p| ys.iter().any(|&q| self.type_eq(p, q)))
                    && ys.iter().all(|&q| xs.iter().any(|&p| self.type_eq(p, q)))
            }
            (ManagedObject::FuncType { from: f1, to: t1 }, ManagedObject::FuncType { from: f2, to: t2 }) => {
                self.type_eq(*f1, *f2) && self.type_eq(*t1, *t2)
            }
            (ManagedObject::Bits(x), ManagedObject::Bits(y)) => {
                x.raw == y.raw && self.type_of(a).is(self.type_of(b))
            }
            (ManagedObject::TagType(_), _)
            | (ManagedObject::BitsType(_), _)
            | (ManagedObject::StructType(_), _) => {
                let (ua, ub) = (self.type_uid(a), self.type_uid(b));
                if ua != 0 && ub != 0 {
                    return ua == ub;
                }
                match (self.tag_data(a), self.tag_data(b)) {
                    (Some(ta), Some(tb)) => {
                        ta.name.is(tb.name) && self.type_eq(ta.parameters, tb.parameters)
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Name of a tag-family type, or a description of any other value.
    pub fn type_name_str(&self, ty: Value) -> String {
        match self.type_name_of(ty) {
            Some(tn) => match self.heap.obj(tn) {
                ManagedObject::TypeName(n) => self.symbol_name(n.name).unwrap_or("?").to_string(),
                _ => "?".to_string(),
            },
            None => self.show(ty),
        }
    }

    /// Human-readable rendering used in error messages and debugging.
    pub fn show(&self, v: Value) -> String {
        match self.heap.obj(v) {
            ManagedObject::Symbol(s) => format!(":{}", s.name),
            ManagedObject::TypeName(n) => self.symbol_name(n.name).unwrap_or("?").to_string(),
            ManagedObject::TagType(_) | ManagedObject::BitsType(_) | ManagedObject::StructType(_) => {
                let mut out = self.type_name_str(v);
                let params = self.tuple_elems(self.type_parameters(v).unwrap_or(self.b.null));
                if let Some(ps) = params.filter(|ps| !ps.is_empty()) {
                    out.push('{');
                    out.push_str(&self.join(ps, ","));
                    out.push('}');
                }
                out
            }
            ManagedObject::Tuple(elems) => {
                if elems.len() == 1 {
                    format!("({},)", self.show(elems[0]))
                } else {
                    format!("({})", self.join(elems, ", "))
                }
            }
            ManagedObject::UnionType(types) => {
                let members = self.tuple_elems(*types).unwrap_or(&[]);
                if members.is_empty() {
                    "Bottom".to_string()
                } else {
                    format!("Union({})", self.join(members, ", "))
                }
            }
            ManagedObject::FuncType { from, to } => {
                format!("{} --> {}", self.show(*from), self.show(*to))
            }
            ManagedObject::TypeVar(tv) => self.symbol_name(tv.name).unwrap_or("?").to_string(),
            ManagedObject::Function(_) => "function".to_string(),
            ManagedObject::LambdaInfo(_) => "LambdaStaticData".to_string(),
            ManagedObject::Struct(fields) => {
                format!("{}({})", self.show(self.type_of(v)), self.join(fields, ", "))
            }
            ManagedObject::Bits(bits) => self.show_bits(self.type_of(v), bits.raw),
            ManagedObject::Array(a) => {
                let dims: Vec<String> = a.dims.iter().map(|d| d.to_string()).collect();
                format!("{}[{}]", self.show(self.type_of(v)), dims.join("x"))
            }
        }
    }

    fn join(&self, vs: &[Value], sep: &str) -> String {
        vs.iter()
            .map(|&e| self.show(e))
            .collect::<Vec<_>>()
            .join(sep)
    }
}
