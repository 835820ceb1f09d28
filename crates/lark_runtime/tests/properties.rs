use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use lark_runtime::{Context, Value};

fn boxed_ints(ctx: &mut Context, xs: &[i32]) -> Vec<Value> {
    xs.iter().map(|&x| ctx.box_int32(x)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32, .. ProptestConfig::default()
    })]

    #[test]
    fn flatten_pairs_inverts_pair_chain(xs in proptest::collection::vec(any::<i32>(), 0..12)) {
        let mut ctx = Context::new();
        let mut flat = boxed_ints(&mut ctx, &xs);
        if flat.len() % 2 == 1 {
            flat.pop();
        }
        let chain = ctx.pair_chain(&flat);
        let back = ctx.flatten_pairs(chain).unwrap();
        prop_assert_eq!(ctx.tuple_elems(back), Some(&flat[..]));
        if flat.is_empty() {
            prop_assert!(back.is(ctx.null()));
        }
    }

    #[test]
    fn tuple_append_keeps_length_and_order(
        a in proptest::collection::vec(any::<i32>(), 0..6),
        b in proptest::collection::vec(any::<i32>(), 0..6),
    ) {
        let mut ctx = Context::new();
        let av = boxed_ints(&mut ctx, &a);
        let bv = boxed_ints(&mut ctx, &b);
        let ta = ctx.tuple(&av);
        let tb = ctx.tuple(&bv);
        let joined = ctx.tuple_append(ta, tb);
        let expected: Vec<Value> = av.iter().chain(bv.iter()).copied().collect();
        prop_assert_eq!(ctx.tuple_len(joined), Some(a.len() + b.len()));
        prop_assert_eq!(ctx.tuple_elems(joined), Some(&expected[..]));
    }

    #[test]
    fn interning_is_idempotent(names in proptest::collection::vec("[a-z]{1,6}", 1..10)) {
        let mut ctx = Context::new();
        let first: Vec<Value> = names.iter().map(|n| ctx.intern(n)).collect();
        let second: Vec<Value> = names.iter().map(|n| ctx.intern(n)).collect();
        for (i, (a, b)) in first.iter().zip(second.iter()).enumerate() {
            prop_assert!(a.is(*b));
            prop_assert_eq!(ctx.symbol_name(*a), Some(names[i].as_str()));
            for (j, c) in first.iter().enumerate() {
                prop_assert_eq!(a.is(*c), names[i] == names[j]);
            }
        }
    }

    #[test]
    fn int16_boxes_are_canonical_exactly_in_range(x in any::<i16>()) {
        let mut ctx = Context::new();
        let a = ctx.box_int16(x);
        let b = ctx.box_int16(x);
        prop_assert_eq!(a.is(b), (-512..512).contains(&x));
        prop_assert_eq!(ctx.unbox_int16(a), x);
        prop_assert!(ctx.type_eq(a, b));
    }

    #[test]
    fn uint64_boxes_round_trip(x in any::<u64>()) {
        let mut ctx = Context::new();
        let a = ctx.box_uint64(x);
        prop_assert_eq!(ctx.unbox_uint64(a), x);
        prop_assert_eq!(a.is(ctx.box_uint64(x)), x < 1024);
    }

    #[test]
    fn array_inline_boundary_tracks_byte_size(n in 0u32..200) {
        let mut ctx = Context::new();
        let atype = ctx.builtins().array_uint8_type;
        let a = ctx.new_array(atype, &[n]).unwrap();
        prop_assert_eq!(ctx.array_len(a), Some(n as usize));
        let expect_inline = n > 0 && (n as usize) <= lark_runtime::ARRAY_INLINE_NBYTES;
        prop_assert_eq!(ctx.array_is_inline(a), Some(expect_inline));
    }
}
