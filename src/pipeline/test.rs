macro_rules! test_pipeline {
    ($func_name:ident, expected = $expected:expr, input = $input:expr) => {
        #[test]
        fn $func_name() {
            let expected = $expected;
            let pipeline = $input;

            assert_eq!(expected, pipeline.to_documents());
        }
    };
}

mod raw_override {
    use crate::{accumulators::Accumulator, fields::FieldRef, pipeline::Pipeline};
    use bson::doc;

    test_pipeline!(
        returns_the_supplied_stages_verbatim,
        expected = Ok(vec![
            doc! { "$match": { "active": true } },
            doc! { "$limit": 10 },
        ]),
        input = Pipeline::new("things").raw([
            doc! { "$match": { "active": true } },
            doc! { "$limit": 10 },
        ])
    );

    test_pipeline!(
        takes_precedence_over_appended_stages,
        expected = Ok(vec![doc! { "$match": { "manual": true } }]),
        input = Pipeline::new("things")
            .unwind("tags")
            .order_by(["-age"])
            .raw([doc! { "$match": { "manual": true } }])
    );

    test_pipeline!(
        skips_stage_compilation_entirely,
        expected = Ok(vec![doc! { "$count": "n" }]),
        input = Pipeline::new("things")
            .group_by([Accumulator::push("items", Vec::<FieldRef>::new())])
            .raw([doc! { "$count": "n" }])
    );
}

mod ordering {
    use crate::pipeline::Pipeline;
    use bson::doc;

    test_pipeline!(
        stages_compile_in_append_order,
        expected = Ok(vec![
            doc! { "$match": { "status": "active" } },
            doc! { "$unwind": "$tags" },
            doc! { "$sort": { "name": 1 } },
        ]),
        input = Pipeline::new("things")
            .match_eq([("status", "active")])
            .unwind("tags")
            .order_by(["name"])
    );

    test_pipeline!(
        empty_pipeline_compiles_to_no_stages,
        expected = Ok(Vec::new()),
        input = Pipeline::new("things")
    );

    test_pipeline!(
        equality_pairs_translate_paths,
        expected = Ok(vec![doc! { "$match": { "user.name": "bernardo" } }]),
        input = Pipeline::new("things").match_eq([("user__name", "bernardo")])
    );
}

mod grouping {
    use crate::pipeline::Pipeline;
    use bson::doc;

    test_pipeline!(
        first_group_stage_references_fields_directly,
        expected = Ok(vec![doc! { "$group": { "_id": { "a": "$a", "b": "$b" } } }]),
        input = Pipeline::new("things").group_by(["a", "b"])
    );

    test_pipeline!(
        second_group_stage_references_the_previous_id,
        expected = Ok(vec![
            doc! { "$group": { "_id": { "a": "$a", "b": "$b" } } },
            doc! { "$group": { "_id": { "a": "$_id.a" } } },
        ]),
        input = Pipeline::new("things").group_by(["a", "b"]).group_by(["a"])
    );

    #[test]
    fn compilation_is_repeatable() {
        let pipeline = Pipeline::new("things").group_by(["a"]).group_by(["b"]);

        let first = pipeline.to_documents();
        let second = pipeline.to_documents();

        assert_eq!(first, second);
    }
}

mod errors {
    use crate::{accumulators::Accumulator, fields::FieldRef, pipeline::Pipeline};

    test_pipeline!(
        stage_errors_surface,
        expected = Err(crate::result::Error::Stage(
            crate::stages::Error::Accumulator(crate::accumulators::Error::NoSourceFields)
        )),
        input =
            Pipeline::new("things").group_by([Accumulator::push("items", Vec::<FieldRef>::new())])
    );

    test_pipeline!(
        invalid_sort_key_is_rejected,
        expected = Err(crate::result::Error::Stage(
            crate::stages::Error::InvalidField(crate::fields::Error::InvalidStorageName(
                String::new()
            ))
        )),
        input = Pipeline::new("things").order_by(["-"])
    );
}

mod reports {
    use crate::{
        accumulators::Accumulator,
        pipeline::Pipeline,
        stages::{GroupKey, Project},
    };
    use bson::doc;

    test_pipeline!(
        category_totals_report,
        expected = Ok(vec![
            doc! { "$match": { "status": "complete" } },
            doc! { "$unwind": "$items" },
            doc! { "$group": {
                "_id": { "category": "$category" },
                "total": { "$sum": "$amount" },
                "skus": { "$push": { "sku": "$sku" } },
            }},
            doc! { "$project": { "total": 1, "skus": 1, "category": "$_id.category" } },
            doc! { "$sort": { "total": -1, "category": 1 } },
        ]),
        input = Pipeline::new("purchases")
            .match_eq([("status", "complete")])
            .unwind("items")
            .group_by([
                GroupKey::from("category"),
                Accumulator::sum("amount").with_alias("total").into(),
                Accumulator::push("skus", ["sku"]).into(),
            ])
            .project(
                Project::new()
                    .include("total")
                    .include("skus")
                    .value("category", "_id__category")
            )
            .order_by(["-total", "category"])
    );
}
