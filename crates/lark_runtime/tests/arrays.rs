use lark_runtime::{ARRAY_INLINE_NBYTES, ARRAY_INLINE_NREFS, Context, RuntimeError};

#[test]
fn bits_payload_at_the_threshold_is_inline() {
    let mut ctx = Context::new();
    let atype = ctx.builtins().array_uint8_type;
    let n = ARRAY_INLINE_NBYTES as u32;

    let at = ctx.new_array(atype, &[n]).unwrap();
    let over = ctx.new_array(atype, &[n + 1]).unwrap();
    assert_eq!(ctx.array_is_inline(at), Some(true));
    assert_eq!(ctx.array_is_inline(over), Some(false));
    assert_eq!(ctx.array_len(at), Some(n as usize));
    assert_eq!(ctx.array_len(over), Some(n as usize + 1));
    assert_eq!(ctx.array_dims(over), Some(&[n + 1][..]));
}

#[test]
fn reference_payload_at_the_threshold_is_inline() {
    let mut ctx = Context::new();
    let atype = ctx.builtins().array_any_type;
    let n = ARRAY_INLINE_NREFS as u32;

    let at = ctx.new_array(atype, &[n]).unwrap();
    let over = ctx.new_array(atype, &[n + 1]).unwrap();
    assert_eq!(ctx.array_is_inline(at), Some(true));
    assert_eq!(ctx.array_is_inline(over), Some(false));
    assert_eq!(ctx.array_len(over), Some(n as usize + 1));
}

#[test]
fn separate_payloads_are_counted_in_bytes() {
    let mut ctx = Context::new();
    let atype = ctx.builtins().array_uint8_type;
    let before = ctx.heap_stats().bytes;
    ctx.new_array(atype, &[1000]).unwrap();
    assert_eq!(ctx.heap_stats().bytes, before + 1000);
}

#[test]
fn reference_slots_start_empty() {
    let mut ctx = Context::new();
    let atype = ctx.builtins().array_any_type;
    let a = ctx.new_array(atype, &[3]).unwrap();
    assert_eq!(ctx.array_ref(a, 0), Err(RuntimeError::UndefinedReference));

    let v = ctx.intern("item");
    ctx.array_set(a, 1, v).unwrap();
    assert!(ctx.array_ref(a, 1).unwrap().is(v));
    assert_eq!(
        ctx.array_ref(a, 3),
        Err(RuntimeError::IndexOutOfBounds { index: 3, len: 3 })
    );
}

#[test]
fn bits_elements_are_stored_raw() {
    let mut ctx = Context::new();
    let atype = ctx.builtins().array_uint8_type;
    let a = ctx.new_array(atype, &[4]).unwrap();
    let x = ctx.box_uint8(200);
    ctx.array_set(a, 2, x).unwrap();
    assert_eq!(ctx.array_bytes(a), Some(&[0u8, 0, 200, 0][..]));
    let back = ctx.array_ref(a, 2).unwrap();
    assert_eq!(ctx.unbox_uint8(back), 200);

    let wrong = ctx.box_int32(1);
    assert!(matches!(
        ctx.array_set(a, 0, wrong),
        Err(RuntimeError::ConversionFailed { .. })
    ));
}

#[test]
fn zero_dimensions_means_zero_elements() {
    let mut ctx = Context::new();
    let atype = ctx.builtins().array_any_type;
    let a = ctx.new_array(atype, &[]).unwrap();
    assert_eq!(ctx.array_len(a), Some(0));
    assert_eq!(ctx.array_is_inline(a), Some(false));
}

#[test]
fn array_constructor_takes_int32_extents() {
    let mut ctx = Context::new();
    let b = ctx.builtins().clone();
    let fnew = ctx.struct_fnew(b.array_any_type).unwrap();
    let five = ctx.box_int32(5);
    let a = ctx.call(fnew, &[five]).unwrap();
    assert!(ctx.type_of(a).is(b.array_any_type));
    assert_eq!(ctx.array_len(a), Some(5));

    let wide = ctx.box_int64(5);
    assert_eq!(
        ctx.call(fnew, &[wide]),
        Err(RuntimeError::TypeCheck {
            func: "Array".into(),
            expected: "Int32".into(),
            actual: "Int64".into(),
        })
    );

    let negative = ctx.box_int32(-1);
    assert!(matches!(
        ctx.call(fnew, &[negative]),
        Err(RuntimeError::NegativeDimension { actual: -1, .. })
    ));

    assert!(matches!(
        ctx.call(fnew, &[five, five]),
        Err(RuntimeError::DimensionCount { expected: 1, actual: 2, .. })
    ));
}

#[test]
fn generic_array_constructor_instantiates_the_dimension_count() {
    let mut ctx = Context::new();
    let b = ctx.builtins().clone();
    let two = ctx.box_int32(2);
    let three = ctx.box_int32(3);
    let a = ctx.call(b.array_type, &[b.float64_type, two, three]).unwrap();
    assert_eq!(ctx.show(ctx.type_of(a)), "Array{Float64,2}");
    assert_eq!(ctx.array_dims(a), Some(&[2u32, 3][..]));
    assert_eq!(ctx.array_len(a), Some(6));
    assert!(ctx.array_eltype(a).unwrap().is(b.float64_type));

    let dims = ctx.array_dims_tuple(a).unwrap();
    assert_eq!(ctx.tuple_elems(dims), Some(&[two, three][..]));

    let v = ctx.call(b.array_type, &[b.uint8_type, three]).unwrap();
    assert!(ctx.type_of(v).is(b.array_uint8_type));
}

#[test]
fn generic_array_constructor_needs_an_element_type() {
    let mut ctx = Context::new();
    let array = ctx.builtins().array_type;
    assert!(matches!(
        ctx.call(array, &[]),
        Err(RuntimeError::ArgumentCount { min: 1, actual: 0, .. })
    ));
    let one = ctx.box_int32(1);
    assert!(matches!(
        ctx.call(array, &[one, one]),
        Err(RuntimeError::TypeCheck { .. })
    ));
}

#[test]
fn cstr_keeps_a_hidden_terminator() {
    let mut ctx = Context::new();
    let a = ctx.cstr_to_array(b"hello\0ignored").unwrap();
    assert!(ctx.type_of(a).is(ctx.builtins().array_uint8_type));
    assert_eq!(ctx.array_len(a), Some(5));
    assert_eq!(ctx.array_dims(a), Some(&[5u32][..]));
    assert_eq!(ctx.array_bytes(a), Some(&b"hello"[..]));
    assert_eq!(ctx.array_raw_bytes(a), Some(&b"hello\0"[..]));
}

#[test]
fn cstr_without_nul_uses_every_byte() {
    let mut ctx = Context::new();
    let a = ctx.cstr_to_array(b"abc").unwrap();
    assert_eq!(ctx.array_bytes(a), Some(&b"abc"[..]));
}

#[test]
fn bits_elements_come_back_canonical() {
    let mut ctx = Context::new();
    let b = ctx.builtins().clone();
    let one = ctx.box_int32(1);

    let bools_type = ctx.apply_type_ctor(b.array_type, &[b.bool_type, one]).unwrap();
    let bools = ctx.new_array(bools_type, &[2]).unwrap();
    ctx.array_set(bools, 0, b.true_v).unwrap();
    assert!(ctx.array_ref(bools, 0).unwrap().is(b.true_v));
    assert!(ctx.array_ref(bools, 1).unwrap().is(b.false_v));

    let shorts_type = ctx.apply_type_ctor(b.array_type, &[b.int16_type, one]).unwrap();
    let shorts = ctx.new_array(shorts_type, &[2]).unwrap();
    let seven = ctx.box_int16(7);
    let big = ctx.box_int16(20000);
    ctx.array_set(shorts, 0, seven).unwrap();
    ctx.array_set(shorts, 1, big).unwrap();
    assert!(ctx.array_ref(shorts, 0).unwrap().is(seven));
    let back = ctx.array_ref(shorts, 1).unwrap();
    assert_eq!(ctx.unbox_int16(back), 20000);
}

#[test]
fn oversized_extents_are_rejected() {
    let mut ctx = Context::new();
    let b = ctx.builtins().clone();
    let three = ctx.box_int32(3);
    let cube_type = ctx.apply_type_ctor(b.array_type, &[b.any_type, three]).unwrap();
    assert!(matches!(
        ctx.new_array(cube_type, &[u32::MAX, u32::MAX, u32::MAX]),
        Err(RuntimeError::ArrayTooLarge { .. })
    ));
}
