//! The allocation context.
//!
//! A `Context` owns every piece of process-wide state the object model needs:
//! the heap, the symbol table, the uid counter and instantiation cache, the
//! boxing caches and the handles of the builtin types. Independent contexts do
//! not share anything, which is what the tests rely on.

use std::rc::Rc;

use lark_core::{FastHashMap, Value, fast_map_new};
use smallvec::SmallVec;

use crate::boxing::BoxCaches;
use crate::config::ContextConfig;
use crate::convert::{Converter, SubtypeConverter};
use crate::core::{Heap, HeapStats, ManagedObject};
use crate::errors::{Result, RuntimeError};
use crate::matching::{StructuralMatcher, TypeMatcher};
use crate::symbols::SymbolTable;

/// Handles of the types and constructors every other component relies on.
///
/// All fields are valid once bootstrap has finished.
#[derive(Clone, Debug, Default)]
pub struct Builtins {
    pub tag_kind: Value,
    pub bits_kind: Value,
    pub struct_kind: Value,
    pub union_kind: Value,
    pub func_kind: Value,
    pub typename_type: Value,
    pub tvar_type: Value,
    pub sym_type: Value,
    pub tuple_type: Value,
    pub any_type: Value,
    pub bottom_type: Value,
    pub any_func: Value,
    /// The canonical empty tuple.
    pub null: Value,

    pub number_type: Value,
    pub real_type: Value,
    pub integer_type: Value,
    pub float_type: Value,
    pub bool_type: Value,
    pub int8_type: Value,
    pub uint8_type: Value,
    pub int16_type: Value,
    pub uint16_type: Value,
    pub int32_type: Value,
    pub uint32_type: Value,
    pub int64_type: Value,
    pub uint64_type: Value,
    pub float32_type: Value,
    pub float64_type: Value,

    pub true_v: Value,
    pub false_v: Value,

    pub tensor_type: Value,
    pub ntuple_type: Value,
    pub array_type: Value,
    pub array_typename: Value,
    pub array_uint8_type: Value,
    pub array_any_type: Value,
    pub expr_type: Value,
    pub box_type: Value,
    pub box_typename: Value,
    pub box_any_type: Value,
    pub lambda_info_type: Value,
    pub functype_ctor: Value,
    pub intrinsic_type: Value,
    pub pointer_typector: Value,
    pub pointer_void_type: Value,
    pub pointer_uint8_type: Value,
}

/// Head symbols for expression nodes and other well-known names.
#[derive(Clone, Debug, Default)]
pub struct Syms {
    pub call: Value,
    pub dots: Value,
    pub dollar: Value,
    pub quote: Value,
    pub tuple: Value,
    pub top: Value,
    pub expr: Value,
    pub line: Value,
    pub continue_: Value,
    pub goto: Value,
    pub goto_ifnot: Value,
    pub label: Value,
    pub return_: Value,
    pub lambda: Value,
    pub assign: Value,
    pub null: Value,
    pub body: Value,
    pub unbound: Value,
    pub boxunbound: Value,
    pub locals: Value,
    pub colons: Value,
    pub closure_ref: Value,
}

/// Identity of one type parameter inside a cache key.
///
/// Types with a uid and canonical objects are keyed by identity. Tuples,
/// unions and function types are rebuilt freely, so they are keyed by
/// structure; union members are sorted since member order does not matter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum ParamKey {
    Uid(u32),
    Bits { ty: usize, raw: u64 },
    Obj(usize),
    Tuple(Vec<ParamKey>),
    Union(Vec<ParamKey>),
    Func(Box<ParamKey>, Box<ParamKey>),
}

pub(crate) type InstKey = (usize, SmallVec<[ParamKey; 4]>);

pub(crate) struct TypeRegistry {
    pub(crate) next_uid: u32,
    pub(crate) inst_cache: FastHashMap<InstKey, Value>,
    /// Inferred constructor call-sites, keyed by (constructor, argument types).
    pub(crate) call_sites: FastHashMap<InstKey, Value>,
}

impl TypeRegistry {
    fn new() -> Self {
        Self {
            next_uid: 1,
            inst_cache: fast_map_new(),
            call_sites: fast_map_new(),
        }
    }
}

pub struct Context {
    pub(crate) heap: Heap,
    pub(crate) config: ContextConfig,
    pub(crate) symtab: SymbolTable,
    pub(crate) registry: TypeRegistry,
    pub(crate) boxes: BoxCaches,
    pub(crate) matcher: Rc<dyn TypeMatcher>,
    pub(crate) converter: Rc<dyn Converter>,
    pub(crate) b: Builtins,
    pub(crate) syms: Syms,
}

impl Context {
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
            .expect("bootstrap with the default configuration cannot fail")
    }

    pub fn with_config(config: ContextConfig) -> Result<Self> {
        config.validate()?;
        let mut ctx = Self {
            heap: Heap::with_capacity(config.heap_capacity),
            config,
            symtab: SymbolTable::with_capacity(config.symbol_capacity),
            registry: TypeRegistry::new(),
            boxes: BoxCaches::new(),
            matcher: Rc::new(StructuralMatcher),
            converter: Rc::new(SubtypeConverter),
            b: Builtins::default(),
            syms: Syms::default(),
        };
        ctx.bootstrap()?;
        Ok(ctx)
    }

    /// Replace the type-matching collaborator.
    pub fn set_matcher(&mut self, matcher: Rc<dyn TypeMatcher>) {
        self.matcher = matcher;
        self.registry.call_sites.clear();
    }

    /// Replace the conversion collaborator used by struct constructors.
    pub fn set_converter(&mut self, converter: Rc<dyn Converter>) {
        self.converter = converter;
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn builtins(&self) -> &Builtins {
        &self.b
    }

    pub fn syms(&self) -> &Syms {
        &self.syms
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }

    /// The type descriptor stored in the first word of `v`.
    #[inline]
    pub fn type_of(&self, v: Value) -> Value {
        self.heap.type_of(v)
    }

    /// The canonical empty tuple.
    #[inline]
    pub fn null(&self) -> Value {
        self.b.null
    }

    pub fn is_function(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::Function(_))
    }

    /// Invoke a function value's native entry point.
    pub fn call(&mut self, f: Value, args: &[Value]) -> Result<Value> {
        let fptr = match self.heap.obj(f) {
            ManagedObject::Function(fd) => fd.fptr,
            _ => return Err(RuntimeError::NotCallable(self.show(f))),
        };
        fptr(self, f, args)
    }
}
