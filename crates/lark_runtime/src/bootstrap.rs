//! Context bootstrap.
//!
//! The kind types describe each other, so the first few objects are
//! allocated as skeletons and patched once symbols and type names exist.
//! Everything after the prelude goes through the ordinary constructors.

use lark_core::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::Context;
use crate::array::{generic_array_ctor, new_array_internal};
use crate::construct::not_constructible;
use crate::core::{ManagedObject, StructTypeData, TagData, TupleElems};
use crate::errors::Result;

fn skeleton_tag() -> TagData {
    TagData {
        name: Value::default(),
        sup: Value::default(),
        parameters: Value::default(),
    }
}

fn skeleton_struct() -> ManagedObject {
    ManagedObject::StructType(Box::new(StructTypeData {
        tag: skeleton_tag(),
        names: Value::default(),
        types: Value::default(),
        fnew: None,
        uid: 0,
    }))
}

impl Context {
    pub(crate) fn bootstrap(&mut self) -> Result<()> {
        self.init_prelude()?;
        self.init_builtin_types()?;
        self.init_syms();
        debug!(
            types = self.registry.next_uid - 1,
            symbols = self.symbol_count(),
            objects = self.heap.len(),
            words = self.heap.stats().words,
            "bootstrap complete"
        );
        Ok(())
    }

    /// Kinds, Any, Bottom, Tuple, the function type, and the scalar types.
    fn init_prelude(&mut self) -> Result<()> {
        let struct_kind = self.heap.alloc_self_typed(skeleton_struct());
        self.b.struct_kind = struct_kind;
        self.b.tag_kind = self.heap.alloc(struct_kind, skeleton_struct());
        self.b.bits_kind = self.heap.alloc(struct_kind, skeleton_struct());
        self.b.union_kind = self.heap.alloc(struct_kind, skeleton_struct());
        self.b.func_kind = self.heap.alloc(struct_kind, skeleton_struct());
        self.b.typename_type = self.heap.alloc(struct_kind, skeleton_struct());
        self.b.sym_type = self.heap.alloc(struct_kind, skeleton_struct());
        self.b.tvar_type = self.heap.alloc(struct_kind, skeleton_struct());

        let tag_kind = self.b.tag_kind;
        self.b.any_type = self
            .heap
            .alloc(tag_kind, ManagedObject::TagType(Box::new(skeleton_tag())));
        self.b.tuple_type = self
            .heap
            .alloc(tag_kind, ManagedObject::TagType(Box::new(skeleton_tag())));
        self.b.null = self
            .heap
            .alloc(self.b.tuple_type, ManagedObject::Tuple(TupleElems::new()));

        let any = self.b.any_type;
        self.patch_tag(any, "Any", any);
        self.patch_tag(self.b.tuple_type, "Tuple", any);
        self.patch_kind(self.b.tag_kind, "TagKind", &["name", "super", "parameters"]);
        self.patch_kind(
            self.b.bits_kind,
            "BitsKind",
            &["name", "super", "parameters", "nbits"],
        );
        self.patch_kind(
            self.b.struct_kind,
            "StructKind",
            &["name", "super", "parameters", "names", "types", "new"],
        );
        self.patch_kind(self.b.union_kind, "UnionKind", &["types"]);
        self.patch_kind(self.b.func_kind, "FuncKind", &["from", "to"]);
        self.patch_kind(self.b.typename_type, "TypeName", &["name"]);
        self.patch_kind(self.b.sym_type, "Symbol", &[]);
        self.patch_kind(self.b.tvar_type, "TypeVar", &["name", "lb", "ub"]);

        self.b.any_func = self.heap.alloc(
            self.b.func_kind,
            ManagedObject::FuncType {
                from: self.b.tuple_type,
                to: any,
            },
        );
        self.b.bottom_type = self.new_union_type(&[])?;

        let null = self.b.null;
        let number = self.intern("Number");
        self.b.number_type = self.new_tag_type(number, any, null);
        let real = self.intern("Real");
        self.b.real_type = self.new_tag_type(real, self.b.number_type, null);
        let integer = self.intern("Integer");
        self.b.integer_type = self.new_tag_type(integer, self.b.real_type, null);
        let float = self.intern("Float");
        self.b.float_type = self.new_tag_type(float, self.b.real_type, null);

        let int = self.b.integer_type;
        self.b.bool_type = self.scalar_type("Bool", any, 8);
        self.b.int8_type = self.scalar_type("Int8", int, 8);
        self.b.uint8_type = self.scalar_type("UInt8", int, 8);
        self.b.int16_type = self.scalar_type("Int16", int, 16);
        self.b.uint16_type = self.scalar_type("UInt16", int, 16);
        self.b.int32_type = self.scalar_type("Int32", int, 32);
        self.b.uint32_type = self.scalar_type("UInt32", int, 32);
        self.b.int64_type = self.scalar_type("Int64", int, 64);
        self.b.uint64_type = self.scalar_type("UInt64", int, 64);
        self.b.float32_type = self.scalar_type("Float32", self.b.float_type, 32);
        self.b.float64_type = self.scalar_type("Float64", self.b.float_type, 64);

        let tv = self.type_vars(&["T", "N"]);
        let tensor = self.intern("Tensor");
        let body = self.new_tag_type(tensor, any, tv);
        self.b.tensor_type = self.new_type_ctor(tv, body);

        let tv = self.type_vars(&["N", "T"]);
        let ntuple = self.intern("NTuple");
        let body = self.new_tag_type(ntuple, self.b.tuple_type, tv);
        self.b.ntuple_type = self.new_type_ctor(tv, body);
        Ok(())
    }

    fn init_builtin_types(&mut self) -> Result<()> {
        let any = self.b.any_type;
        let null = self.b.null;

        self.b.false_v = self.new_bits(self.b.bool_type, 0);
        self.b.true_v = self.new_bits(self.b.bool_type, 1);
        self.init_box_caches();

        // Array{T,N} <: Tensor{T,N}, with dims::NTuple{N,Int32}
        let tv = self.type_vars(&["T", "N"]);
        let (t, n) = (self.tparam_of(tv, 0), self.tparam_of(tv, 1));
        let tensor = self.apply_type_ctor(self.b.tensor_type, &[t, n])?;
        let dims_ty = self.apply_type_ctor(self.b.ntuple_type, &[n, self.b.int32_type])?;
        let names = self.sym_tuple(&["dims"]);
        let types = self.tuple(&[dims_ty]);
        let array = self.intern("Array");
        let arrstruct = self.new_struct_type(array, tensor, tv, names, types);
        self.b.array_typename = self.type_name_of(arrstruct).unwrap_or(null);
        if let Some(fnew) = self.struct_fnew(arrstruct) {
            if let Some(fd) = self.function_data_mut(fnew) {
                fd.fptr = new_array_internal;
            }
        }
        let array_type = self.new_closure(generic_array_ctor, None);
        if let Some(fd) = self.function_data_mut(array_type) {
            fd.parameters = Some(tv);
            fd.body = Some(arrstruct);
        }
        self.register_typename_ctor(self.b.array_typename, array_type);
        self.b.array_type = array_type;

        let one = self.box_int32(1);
        self.b.array_uint8_type = self.apply_type_ctor(array_type, &[self.b.uint8_type, one])?;
        self.b.array_any_type = self.apply_type_ctor(array_type, &[any, one])?;

        let names = self.sym_tuple(&["head", "args", "type"]);
        let types = self.tuple(&[self.b.sym_type, self.b.tuple_type, any]);
        let expr = self.intern("Expr");
        self.b.expr_type = self.new_struct_type(expr, any, null, names, types);

        // LambdaInfo objects are built by the runtime only.
        let names = self.sym_tuple(&["ast", "sparams"]);
        let types = self.tuple(&[self.b.expr_type, self.b.tuple_type]);
        let lsd = self.intern("LambdaStaticData");
        let lambda_info_type = self.new_struct_type(lsd, any, null, names, types);
        let bottom_func = self.new_closure(not_constructible, Some(lambda_info_type));
        self.set_struct_fnew(lambda_info_type, Some(bottom_func));
        self.b.lambda_info_type = lambda_info_type;

        let tv = self.type_vars(&["T"]);
        let names = self.sym_tuple(&["contents"]);
        let box_name = self.intern("Box");
        let boxstruct = self.new_struct_type(box_name, any, tv, names, tv);
        self.b.box_typename = self.type_name_of(boxstruct).unwrap_or(null);
        self.b.box_type = self.new_type_ctor(tv, boxstruct);
        self.b.box_any_type = self.apply_type_ctor(self.b.box_type, &[any])?;

        let tv = self.type_vars(&["A", "B"]);
        let (a, b) = (self.tparam_of(tv, 0), self.tparam_of(tv, 1));
        let functype = self.new_function_type(a, b);
        self.b.functype_ctor = self.new_type_ctor(tv, functype);

        let intrinsic = self.intern("IntrinsicFunction");
        self.b.intrinsic_type = self.new_bits_type(intrinsic, any, null, 32);

        let tv = self.type_vars(&["T"]);
        let ptr = self.intern("Ptr");
        let cptrbits = self.new_bits_type(ptr, any, tv, self.config.pointer_bits);
        self.b.pointer_typector = self.new_type_ctor(tv, cptrbits);
        self.b.pointer_void_type =
            self.apply_type_ctor(self.b.pointer_typector, &[self.b.bottom_type])?;
        self.b.pointer_uint8_type =
            self.apply_type_ctor(self.b.pointer_typector, &[self.b.uint8_type])?;
        Ok(())
    }

    fn init_syms(&mut self) {
        self.syms.call = self.intern("call");
        self.syms.quote = self.intern("quote");
        self.syms.top = self.intern("top");
        self.syms.dots = self.intern("...");
        self.syms.expr = self.intern("expr");
        self.syms.tuple = self.intern("tuple");
        self.syms.dollar = self.intern("$");
        self.syms.line = self.intern("line");
        self.syms.continue_ = self.intern("continue");
        self.syms.goto = self.intern("goto");
        self.syms.goto_ifnot = self.intern("gotoifnot");
        self.syms.label = self.intern("label");
        self.syms.return_ = self.intern("return");
        self.syms.lambda = self.intern("lambda");
        self.syms.assign = self.intern("=");
        self.syms.null = self.intern("null");
        self.syms.unbound = self.intern("unbound");
        self.syms.boxunbound = self.intern("box-unbound");
        self.syms.closure_ref = self.intern("closure-ref");
        self.syms.body = self.intern("body");
        self.syms.locals = self.intern("locals");
        self.syms.colons = self.intern("::");
    }

    fn tparam_of(&self, tuple: Value, i: usize) -> Value {
        self.tupleref(tuple, i).unwrap_or(self.b.null)
    }

    fn sym_tuple(&mut self, names: &[&str]) -> Value {
        let syms: SmallVec<[Value; 4]> = names.iter().map(|n| self.intern(n)).collect();
        self.tuple(&syms)
    }

    fn scalar_type(&mut self, name: &str, sup: Value, nbits: u32) -> Value {
        let sym = self.intern(name);
        let null = self.b.null;
        self.new_bits_type(sym, sup, null, nbits)
    }

    fn patch_tag(&mut self, t: Value, name: &str, sup: Value) {
        let sym = self.intern(name);
        let tn = self.new_typename(sym);
        let null = self.b.null;
        if let ManagedObject::TagType(tag) = self.heap.obj_mut(t) {
            **tag = TagData {
                name: tn,
                sup,
                parameters: null,
            };
        }
    }

    fn patch_kind(&mut self, t: Value, name: &str, fields: &[&str]) {
        let sym = self.intern(name);
        let tn = self.new_typename(sym);
        let names = self.sym_tuple(fields);
        let anys: SmallVec<[Value; 8]> = fields.iter().map(|_| self.b.any_type).collect();
        let types = self.tuple(&anys);
        let uid = self.assign_type_uid();
        let (any, null) = (self.b.any_type, self.b.null);
        if let ManagedObject::StructType(st) = self.heap.obj_mut(t) {
            st.tag = TagData {
                name: tn,
                sup: any,
                parameters: null,
            };
            st.names = names;
            st.types = types;
            st.uid = uid;
        }
    }
}
