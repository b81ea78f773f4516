macro_rules! test_compile_expr {
    ($func_name:ident, expected = $expected:expr, input = $input:expr) => {
        #[test]
        fn $func_name() {
            let expected = $expected;
            let input = $input;

            assert_eq!(expected, input.compile());
        }
    };
}

mod operator_call {
    use crate::expr::{Error, Expression, Operand};
    use bson::bson;

    test_compile_expr!(
        single_operand_collapses_to_scalar,
        expected = Ok(bson!({ "$size": "$tags" })),
        input = Expression::call("size", [Operand::field("tags")])
    );

    test_compile_expr!(
        two_operands_keep_an_array,
        expected = Ok(bson!({ "$eq": ["$user.age", 21] })),
        input = Expression::call("eq", [Operand::field("user__age"), 21.into()])
    );

    test_compile_expr!(
        zero_operands_keep_an_empty_array,
        expected = Ok(bson!({ "$concat": [] })),
        input = Expression::call("concat", [])
    );

    test_compile_expr!(
        operand_order_is_preserved,
        expected = Ok(bson!({ "$subtract": ["$total", "$refund"] })),
        input = Expression::call(
            "subtract",
            [Operand::field("total"), Operand::field("refund")]
        )
    );

    test_compile_expr!(
        string_operand_is_a_literal,
        expected = Ok(bson!({ "$concat": ["$first_name", " ", "$last_name"] })),
        input = Expression::call(
            "concat",
            [
                Operand::field("first_name"),
                " ".into(),
                Operand::field("last_name"),
            ]
        )
    );

    test_compile_expr!(
        nested_expression_recurses,
        expected = Ok(bson!({ "$multiply": [{ "$size": "$tags" }, 2] })),
        input = Expression::call(
            "multiply",
            [
                Expression::call("size", [Operand::field("tags")]).into(),
                2.into(),
            ]
        )
    );

    test_compile_expr!(
        unknown_operator_is_rejected,
        expected = Err(Error::UnknownOperator("frobnicate".to_string())),
        input = Expression::call("frobnicate", [Operand::field("tags")])
    );

    test_compile_expr!(
        dollar_prefixed_name_is_rejected,
        expected = Err(Error::UnknownOperator("$size".to_string())),
        input = Expression::call("$size", [Operand::field("tags")])
    );

    test_compile_expr!(
        invalid_operand_field_is_rejected,
        expected = Err(Error::InvalidOperandField(
            crate::fields::Error::InvalidStorageName(String::new())
        )),
        input = Expression::call("size", [Operand::field("")])
    );
}

mod switch {
    use crate::expr::{Expression, Operand, Switch};
    use bson::{bson, Bson};

    fn age_over(limit: i32) -> Expression {
        Expression::call("gte", [Operand::field("age"), limit.into()])
    }

    test_compile_expr!(
        missing_default_omits_the_key,
        expected = Ok(bson!({
            "$switch": {
                "branches": [{ "case": { "$gte": ["$age", 18] }, "then": "adult" }],
            }
        })),
        input = Expression::from(Switch::new().case(age_over(18), "adult"))
    );

    test_compile_expr!(
        null_default_is_explicit,
        expected = Ok(bson!({
            "$switch": {
                "branches": [{ "case": { "$gte": ["$age", 18] }, "then": "adult" }],
                "default": Bson::Null,
            }
        })),
        input = Expression::from(
            Switch::new()
                .case(age_over(18), "adult")
                .default(Bson::Null)
        )
    );

    test_compile_expr!(
        branch_order_is_preserved,
        expected = Ok(bson!({
            "$switch": {
                "branches": [
                    { "case": { "$gte": ["$age", 65] }, "then": "senior" },
                    { "case": { "$gte": ["$age", 18] }, "then": "adult" },
                ],
                "default": "minor",
            }
        })),
        input = Expression::from(
            Switch::new()
                .case(age_over(65), "senior")
                .case(age_over(18), "adult")
                .default("minor")
        )
    );

    test_compile_expr!(
        expression_then_compiles,
        expected = Ok(bson!({
            "$switch": {
                "branches": [{
                    "case": { "$gte": ["$age", 18] },
                    "then": { "$concat": ["$name", "!"] },
                }],
            }
        })),
        input = Expression::from(Switch::new().case(
            age_over(18),
            Expression::call("concat", [Operand::field("name"), "!".into()]),
        ))
    );

    test_compile_expr!(
        case_errors_propagate,
        expected = Err(crate::expr::Error::UnknownOperator("gteq".to_string())),
        input = Expression::from(
            Switch::new().case(Expression::call("gteq", [Operand::field("age")]), "adult")
        )
    );
}

mod operators {
    use crate::expr::MqlOperator;

    #[test]
    fn known_names_round_trip() {
        for name in [
            "add",
            "eq",
            "size",
            "toUpper",
            "setUnion",
            "dayOfYear",
            "ifNull",
            "cond",
        ] {
            let operator = MqlOperator::parse(name).expect(name);
            assert_eq!(format!("${name}"), operator.name());
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(None, MqlOperator::parse("explode"));
    }
}
