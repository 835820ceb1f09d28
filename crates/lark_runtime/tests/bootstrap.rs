use lark_runtime::{Context, ManagedObject};

#[test]
fn every_value_carries_its_type() {
    let ctx = Context::new();
    let b = ctx.builtins();
    assert!(ctx.type_of(b.struct_kind).is(b.struct_kind));
    assert!(ctx.type_of(b.tag_kind).is(b.struct_kind));
    assert!(ctx.type_of(b.any_type).is(b.tag_kind));
    assert!(ctx.type_of(b.int32_type).is(b.bits_kind));
    assert!(ctx.type_of(b.expr_type).is(b.struct_kind));
    assert!(ctx.type_of(b.bottom_type).is(b.union_kind));
    assert!(ctx.type_of(b.any_func).is(b.func_kind));
    assert!(ctx.type_of(b.null).is(b.tuple_type));
    assert!(ctx.type_of(b.box_type).is(b.any_func));
}

#[test]
fn kinds_are_named_and_identified() {
    let ctx = Context::new();
    let b = ctx.builtins();
    assert_eq!(ctx.show(b.struct_kind), "StructKind");
    assert_eq!(ctx.show(b.tag_kind), "TagKind");
    assert_eq!(ctx.show(b.sym_type), "Symbol");
    assert!(ctx.type_uid(b.struct_kind) > 0);
    assert!(ctx.supertype(b.any_type).unwrap().is(b.any_type));
}

#[test]
fn scalar_types_have_their_widths() {
    let ctx = Context::new();
    let b = ctx.builtins();
    let widths = [
        (b.bool_type, 8),
        (b.int8_type, 8),
        (b.uint16_type, 16),
        (b.int32_type, 32),
        (b.uint64_type, 64),
        (b.float32_type, 32),
        (b.float64_type, 64),
        (b.intrinsic_type, 32),
    ];
    for (ty, nbits) in widths {
        assert_eq!(ctx.bits_type_nbits(ty), Some(nbits), "{}", ctx.show(ty));
    }
    assert_eq!(
        ctx.bits_type_nbits(b.pointer_uint8_type),
        Some(usize::BITS)
    );
}

#[test]
fn numeric_tower_is_linked() {
    let ctx = Context::new();
    let b = ctx.builtins();
    assert!(ctx.supertype(b.int32_type).unwrap().is(b.integer_type));
    assert!(ctx.supertype(b.integer_type).unwrap().is(b.real_type));
    assert!(ctx.supertype(b.float64_type).unwrap().is(b.float_type));
    assert!(ctx.conforms(b.uint8_type, b.number_type));
    assert!(!ctx.conforms(b.float32_type, b.integer_type));
}

#[test]
fn builtin_generic_types_are_registered() {
    let ctx = Context::new();
    let b = ctx.builtins();
    assert!(ctx.typename_ctor(b.array_typename).unwrap().is(b.array_type));
    assert!(ctx.typename_ctor(b.box_typename).unwrap().is(b.box_type));
    assert!(ctx.type_name_of(b.array_any_type).unwrap().is(b.array_typename));
    assert!(ctx.type_name_of(b.box_any_type).unwrap().is(b.box_typename));
    assert_eq!(ctx.show(b.array_any_type), "Array{Any,1}");
    assert!(ctx.is_type_ctor(b.functype_ctor));
    assert!(ctx.is_func_type(ctx.type_ctor_body(b.functype_ctor).unwrap()));
}

#[test]
fn expr_type_has_three_fields() {
    let ctx = Context::new();
    let b = ctx.builtins();
    let names = ctx.struct_field_names(b.expr_type).unwrap();
    let names: Vec<&str> = ctx
        .tuple_elems(names)
        .unwrap()
        .iter()
        .map(|&n| ctx.symbol_name(n).unwrap())
        .collect();
    assert_eq!(names, ["head", "args", "type"]);
}

#[test]
fn contexts_are_independent() {
    let mut a = Context::new();
    let b = Context::new();
    a.intern("only-in-a");
    assert_eq!(a.symbol_count(), b.symbol_count() + 1);
    assert_eq!(b.heap_stats().objects, Context::new().heap_stats().objects);
}

#[test]
fn heap_accounts_words_for_every_object() {
    let ctx = Context::new();
    let stats = ctx.heap_stats();
    assert_eq!(stats.objects, ctx.heap().len());
    assert!(stats.words >= 2 * stats.objects);
    let report = ctx.heap().memory_stats();
    assert!(report.contains("symbol"));
    assert!(report.contains("Total:"));
    assert!(matches!(
        ctx.heap().obj(ctx.builtins().null),
        ManagedObject::Tuple(elems) if elems.is_empty()
    ));
}
