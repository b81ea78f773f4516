macro_rules! test_compile_filter {
    ($func_name:ident, expected = $expected:expr, input = $input:expr) => {
        #[test]
        fn $func_name() {
            use crate::filters::FilterExpression;
            let expected = $expected;
            let input = $input;

            assert_eq!(expected, input.compile("things"));
        }
    };
}

mod equality {
    use crate::filters::EqualityFilter;
    use bson::{doc, Bson};

    test_compile_filter!(
        pairs_compile_to_exact_matches,
        expected = Ok(doc! { "status": "active", "kind": "order" }),
        input = EqualityFilter::new([("status", "active"), ("kind", "order")])
    );

    test_compile_filter!(
        logical_paths_are_translated,
        expected = Ok(doc! { "user.name": "ada" }),
        input = EqualityFilter::new([("user__name", "ada")])
    );

    test_compile_filter!(
        mixed_value_types_pass_through,
        expected = Ok(doc! { "age": 30, "active": true }),
        input = EqualityFilter::new([
            ("age", Bson::Int32(30)),
            ("active", Bson::Boolean(true)),
        ])
    );

    test_compile_filter!(
        no_pairs_compile_to_an_empty_document,
        expected = Ok(doc! {}),
        input = EqualityFilter::new(Vec::<(String, Bson)>::new())
    );

    test_compile_filter!(
        invalid_key_is_rejected,
        expected = Err(crate::filters::Error::InvalidField(
            crate::fields::Error::InvalidStorageName(String::new())
        )),
        input = EqualityFilter::new([("", 1)])
    );
}
