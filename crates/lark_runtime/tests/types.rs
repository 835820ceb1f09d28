use lark_runtime::{Context, RuntimeError};

#[test]
fn union_of_one_member_is_rejected() {
    let mut ctx = Context::new();
    let int32 = ctx.builtins().int32_type;
    assert_eq!(ctx.new_union_type(&[int32]), Err(RuntimeError::InvalidUnion));
}

#[test]
fn union_of_repeated_concrete_member_is_accepted() {
    let mut ctx = Context::new();
    let int32 = ctx.builtins().int32_type;
    let u = ctx.new_union_type(&[int32, int32]).unwrap();
    assert!(ctx.is_union_type(u));
    assert_eq!(ctx.tuple_len(ctx.union_members(u).unwrap()), Some(2));
}

#[test]
fn empty_union_is_bottom() {
    let mut ctx = Context::new();
    let u = ctx.new_union_type(&[]).unwrap();
    assert!(ctx.type_eq(u, ctx.builtins().bottom_type));
    assert_eq!(ctx.show(u), "Bottom");
}

#[test]
fn union_with_bare_type_variable_is_accepted() {
    let mut ctx = Context::new();
    let tv = ctx.type_vars(&["T"]);
    let t = ctx.tupleref(tv, 0).unwrap();
    let int32 = ctx.builtins().int32_type;
    assert!(ctx.new_union_type(&[int32, t]).is_ok());
}

#[test]
fn union_with_ambiguous_generic_member_is_rejected() {
    let mut ctx = Context::new();
    let tv = ctx.type_vars(&["T"]);
    let t = ctx.tupleref(tv, 0).unwrap();
    let box_type = ctx.builtins().box_type;
    let box_t = ctx.apply_type_ctor(box_type, &[t]).unwrap();
    let int32 = ctx.builtins().int32_type;
    let box_int = ctx.apply_type_ctor(box_type, &[int32]).unwrap();
    assert_eq!(
        ctx.new_union_type(&[box_int, box_t]),
        Err(RuntimeError::AmbiguousUnionPattern)
    );
}

#[test]
fn function_type_wraps_bare_argument() {
    let mut ctx = Context::new();
    let int32 = ctx.builtins().int32_type;
    let any = ctx.builtins().any_type;
    let f = ctx.new_function_type(int32, any);
    let (from, to) = ctx.func_type_parts(f).unwrap();
    assert!(ctx.is_tuple(from));
    assert_eq!(ctx.tuple_elems(from), Some(&[int32][..]));
    assert!(to.is(any));
}

#[test]
fn function_type_keeps_tuple_and_type_variable_arguments() {
    let mut ctx = Context::new();
    let any = ctx.builtins().any_type;
    let args = ctx.tuple(&[any, any]);
    let f = ctx.new_function_type(args, any);
    assert!(ctx.func_type_parts(f).unwrap().0.is(args));

    let tv = ctx.type_vars(&["A"]);
    let a = ctx.tupleref(tv, 0).unwrap();
    let g = ctx.new_function_type(a, any);
    assert!(ctx.func_type_parts(g).unwrap().0.is(a));
}

#[test]
fn concrete_types_get_increasing_uids() {
    let mut ctx = Context::new();
    let any = ctx.builtins().any_type;
    let null = ctx.null();
    let a = ctx.intern("A");
    let b = ctx.intern("B");
    let ta = ctx.new_bits_type(a, any, null, 16);
    let tb = ctx.new_bits_type(b, any, null, 16);
    assert!(ctx.type_uid(ta) > 0);
    assert!(ctx.type_uid(tb) > ctx.type_uid(ta));
}

#[test]
fn generic_types_have_no_uid() {
    let mut ctx = Context::new();
    let any = ctx.builtins().any_type;
    let tv = ctx.type_vars(&["T"]);
    let name = ctx.intern("Cell");
    let fields = ctx.intern("value");
    let names = ctx.tuple(&[fields]);
    let t = ctx.new_struct_type(name, any, tv, names, tv);
    assert_eq!(ctx.type_uid(t), 0);
    assert!(ctx.has_typevars(t));
}

#[test]
fn tag_type_accepts_existing_typename() {
    let mut ctx = Context::new();
    let any = ctx.builtins().any_type;
    let null = ctx.null();
    let sym = ctx.intern("Shape");
    let t1 = ctx.new_tag_type(sym, any, null);
    let tn = ctx.type_name_of(t1).unwrap();
    let t2 = ctx.new_tag_type(tn, any, null);
    assert!(ctx.type_name_of(t2).unwrap().is(tn));
}

#[test]
fn type_ctor_with_zero_parameters_caches_its_body() {
    let mut ctx = Context::new();
    let any = ctx.builtins().any_type;
    let null = ctx.null();
    let name = ctx.intern("Unit");
    let body = ctx.new_tag_type(name, any, null);
    let tc = ctx.new_type_ctor(null, body);
    let first = ctx.apply_type_ctor(tc, &[]).unwrap();
    let second = ctx.instantiate(tc, &[]).unwrap();
    assert!(first.is(second));
    assert!(first.is(body));
}

#[test]
fn type_ctor_checks_parameter_count() {
    let mut ctx = Context::new();
    let box_type = ctx.builtins().box_type;
    let any = ctx.builtins().any_type;
    let err = ctx.apply_type_ctor(box_type, &[any, any]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::TypeParameterCount {
            name: "Box".into(),
            expected: 1,
            actual: 2,
        }
    );
}

#[test]
fn type_ctor_registers_on_typename_once() {
    let mut ctx = Context::new();
    let any = ctx.builtins().any_type;
    let tv = ctx.type_vars(&["T"]);
    let name = ctx.intern("Wrapper");
    let body = ctx.new_tag_type(name, any, tv);
    let tc1 = ctx.new_type_ctor(tv, body);
    let tc2 = ctx.new_type_ctor(tv, body);
    let tn = ctx.type_name_of(body).unwrap();
    assert!(ctx.typename_ctor(tn).unwrap().is(tc1));
    assert!(!tc1.is(tc2));
}

#[test]
fn instantiation_substitutes_parameters_and_super() {
    let mut ctx = Context::new();
    let b = ctx.builtins().clone();
    let one = ctx.box_int32(1);
    let a = ctx.apply_type_ctor(b.array_type, &[b.float64_type, one]).unwrap();
    assert!(ctx.tparam(a, 0).unwrap().is(b.float64_type));
    assert!(ctx.tparam(a, 1).unwrap().is(one));
    assert!(!ctx.has_typevars(a));
    assert!(ctx.type_uid(a) > 0);

    let sup = ctx.supertype(a).unwrap();
    assert_eq!(ctx.show(sup), "Tensor{Float64,1}");
    assert!(ctx.type_name_of(a).unwrap().is(b.array_typename));
}

#[test]
fn concrete_instantiations_are_shared() {
    let mut ctx = Context::new();
    let b = ctx.builtins().clone();
    let one = ctx.box_int32(1);
    let a = ctx.apply_type_ctor(b.array_type, &[b.uint8_type, one]).unwrap();
    assert!(a.is(b.array_uint8_type));

    let p1 = ctx.apply_type_ctor(b.pointer_typector, &[b.uint8_type]).unwrap();
    assert!(p1.is(b.pointer_uint8_type));
}

#[test]
fn structurally_equal_parameters_share_an_instantiation() {
    let mut ctx = Context::new();
    let b = ctx.builtins().clone();

    let t1 = ctx.tuple(&[b.int64_type]);
    let t2 = ctx.tuple(&[b.int64_type]);
    assert!(!t1.is(t2));
    let x = ctx.apply_type_ctor(b.box_type, &[t1]).unwrap();
    let y = ctx.apply_type_ctor(b.box_type, &[t2]).unwrap();
    assert!(x.is(y));
    assert_eq!(ctx.type_uid(x), ctx.type_uid(y));
    assert!(ctx.type_eq(x, y));

    let u1 = ctx.new_union_type(&[b.int8_type, b.float32_type]).unwrap();
    let u2 = ctx.new_union_type(&[b.float32_type, b.int8_type]).unwrap();
    let x = ctx.apply_type_ctor(b.box_type, &[u1]).unwrap();
    let y = ctx.apply_type_ctor(b.box_type, &[u2]).unwrap();
    assert!(x.is(y));

    let f1 = ctx.new_function_type(b.int8_type, b.float32_type);
    let f2 = ctx.new_function_type(b.int8_type, b.float32_type);
    let x = ctx.apply_type_ctor(b.box_type, &[f1]).unwrap();
    let y = ctx.apply_type_ctor(b.box_type, &[f2]).unwrap();
    assert!(x.is(y));

    let other = ctx.tuple(&[b.int32_type]);
    let z = ctx.apply_type_ctor(b.box_type, &[other]).unwrap();
    assert!(!z.is(x));
    assert!(!ctx.type_eq(z, x));
}

#[test]
fn instantiation_leaves_unrelated_types_alone() {
    let mut ctx = Context::new();
    let int32 = ctx.builtins().int32_type;
    let tv = ctx.type_vars(&["T"]);
    let t = ctx.tupleref(tv, 0).unwrap();
    let env = [t, int32];
    let any = ctx.builtins().any_type;
    assert!(ctx.instantiate_type_with(any, &env).unwrap().is(any));
    assert!(ctx.instantiate_type_with(t, &env).unwrap().is(int32));
}

#[test]
fn instantiation_recurses_through_unions_and_function_types() {
    let mut ctx = Context::new();
    let b = ctx.builtins().clone();
    let tv = ctx.type_vars(&["T"]);
    let t = ctx.tupleref(tv, 0).unwrap();
    let u = ctx.new_union_type(&[b.int8_type, t]).unwrap();
    let f = ctx.new_function_type(t, u);
    let g = ctx.instantiate_type_with(f, &[t, b.float32_type]).unwrap();
    assert_eq!(ctx.show(g), "(Float32,) --> Union(Int8, Float32)");
}

#[test]
fn type_equality_is_structural_for_generic_types() {
    let mut ctx = Context::new();
    let box_type = ctx.builtins().box_type;
    let tv = ctx.type_vars(&["S"]);
    let s = ctx.tupleref(tv, 0).unwrap();
    let a = ctx.apply_type_ctor(box_type, &[s]).unwrap();
    let b = ctx.apply_type_ctor(box_type, &[s]).unwrap();
    assert!(!a.is(b));
    assert!(ctx.type_eq(a, b));
}

#[test]
fn show_renders_parameters() {
    let ctx = Context::new();
    let b = ctx.builtins();
    assert_eq!(ctx.show(b.array_uint8_type), "Array{UInt8,1}");
    assert_eq!(ctx.show(b.box_any_type), "Box{Any}");
    assert_eq!(ctx.show(b.pointer_void_type), "Ptr{Bottom}");
}
