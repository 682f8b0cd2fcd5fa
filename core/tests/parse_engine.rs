use query_schema_core::*;

fn sample_schema() -> FieldSet {
    define([
        (
            "title",
            fields::string(FieldSpec::new("Title").required().with_order(0)),
        ),
        (
            "width",
            fields::number(
                FieldSpec::new("Width")
                    .with_default(640.0)
                    .with_validator(validate::range(Some(1.0), Some(4096.0))),
            ),
        ),
        (
            "background",
            fields::color(FieldSpec::new("Background").with_default("#ffffff")),
        ),
        ("transparent", fields::boolean(FieldSpec::new("Transparent"))),
        ("since", fields::date(FieldSpec::new("Since"))),
        (
            "tags",
            fields::array(
                FieldSpec::new("Tags").with_validator(validate::item_count(None, Some(3))),
            ),
        ),
    ])
}

#[test]
fn required_field_absent_is_reported_and_omitted() {
    let result = parse(&RawQuery::new(), &sample_schema());

    let issue = &result.errors["title"];
    assert!(issue.required);
    assert_eq!(issue.message, MISSING_REQUIRED_MESSAGE);
    assert!(!result.values.contains_key("title"));
}

#[test]
fn optional_fields_absent_get_exactly_their_defaults() {
    let result = parse(&raw_query_from_pairs([("title", "t")]), &sample_schema());

    assert_eq!(result.values["width"], Value::Number(640.0));
    assert_eq!(result.values["background"], Value::Color("#ffffff".into()));
    assert!(!result.values.contains_key("transparent"));
    assert!(!result.values.contains_key("since"));
    assert!(!result.values.contains_key("tags"));
    assert!(result.is_ok());
}

#[test]
fn color_round_trip_is_idempotent() {
    let schema = sample_schema();
    let first = parse(
        &raw_query_from_pairs([("title", "t"), ("background", "f00")]),
        &schema,
    );
    assert_eq!(first.values["background"], Value::Color("#ff0000".into()));

    let again = parse(
        &raw_query_from_pairs([("title", "t"), ("background", "#ff0000")]),
        &schema,
    );
    assert_eq!(again.values["background"], first.values["background"]);
}

#[test]
fn translucent_color_falls_back_to_default() {
    let result = parse(
        &raw_query_from_pairs([("title", "t"), ("background", "#ff000080")]),
        &sample_schema(),
    );

    assert_eq!(result.values["background"], Value::Color("#ffffff".into()));
    let issue = &result.errors["background"];
    assert_eq!(issue.message, "Invalid color, alpha channel is not supported");
    assert_eq!(issue.kind, ErrorKind::ValidationFailed);
    assert!(!issue.required);
}

#[test]
fn dates_follow_the_simplified_leap_rule() {
    let schema = sample_schema();

    let bad = parse(
        &raw_query_from_pairs([("title", "t"), ("since", "2021-02-29 10:00:00")]),
        &schema,
    );
    assert_eq!(bad.errors["since"].kind, ErrorKind::TypeMismatch);
    assert!(!bad.values.contains_key("since"));

    let good = parse(
        &raw_query_from_pairs([("title", "t"), ("since", "2020-02-29 10:00:00")]),
        &schema,
    );
    assert!(good.is_ok());
    assert_eq!(
        good.values["since"].to_string(),
        "2020-02-29 10:00:00"
    );
}

#[test]
fn boolean_inputs() {
    let schema = sample_schema();
    let resolve = |input: &str| {
        parse(
            &raw_query_from_pairs([("title", "t"), ("transparent", input)]),
            &schema,
        )
        .values["transparent"]
            .as_bool()
            .unwrap()
    };

    for truthy in ["YES", "1", "on"] {
        assert!(resolve(truthy), "{truthy}");
    }
    for falsy in ["no", "", "0"] {
        assert!(!resolve(falsy), "{falsy:?}");
    }
}

#[test]
fn array_splits_and_validates() {
    let schema = sample_schema();

    let ok = parse(
        &raw_query_from_pairs([("title", "t"), ("tags", "a, b ,c")]),
        &schema,
    );
    assert_eq!(ok.values["tags"].as_array().unwrap(), ["a", "b", "c"]);

    let too_many = parse(
        &raw_query_from_pairs([("title", "t"), ("tags", "a,b,c,d")]),
        &schema,
    );
    assert_eq!(
        too_many.errors["tags"].message,
        "Expected at most 3 item(s), got 4"
    );
    assert!(!too_many.values.contains_key("tags"));
}

#[test]
fn repeated_parameter_is_rejected_by_scalar_fields() {
    let result = parse(
        &raw_query_from_pairs([("title", "a"), ("title", "b"), ("width", "1"), ("width", "2")]),
        &sample_schema(),
    );

    assert_eq!(result.errors["title"].message, "Expected a single value");
    assert!(result.errors["title"].required);
    assert_eq!(
        result.errors["width"].message,
        "Expected a single value, but got an array of values"
    );
    assert_eq!(result.values["width"], Value::Number(640.0));
}

#[test]
fn range_validator_rejects_out_of_bounds_number() {
    let result = parse(
        &raw_query_from_pairs([("title", "t"), ("width", "5000")]),
        &sample_schema(),
    );
    assert_eq!(
        result.errors["width"].message,
        "Expected a value between 1 and 4096"
    );
    assert_eq!(result.values["width"], Value::Number(640.0));
}

#[test]
fn number_field_accepts_signed_and_exponent_input() {
    let schema = define([("offset", fields::number(FieldSpec::new("Offset")))]);

    for (input, expected) in [("-5", -5.0), ("1e3", 1000.0), (" 7 ", 7.0), ("", 0.0)] {
        let result = parse(&raw_query_from_pairs([("offset", input)]), &schema);
        assert!(result.is_ok(), "{input:?}");
        assert_eq!(result.values["offset"], Value::Number(expected));
    }

    let bad = parse(&raw_query_from_pairs([("offset", "12px")]), &schema);
    assert_eq!(bad.errors["offset"].message, "Expected a number");
}

#[test]
fn parsing_twice_yields_identical_results() {
    let schema = sample_schema();
    let raw = raw_query_from_pairs([
        ("title", "t"),
        ("background", "nope"),
        ("since", "2020/01/01 00:00:00"),
        ("tags", "x"),
    ]);
    assert_eq!(parse(&raw, &schema), parse(&raw, &schema));
}

#[test]
fn raw_query_deserializes_from_json() {
    let raw: RawQuery =
        serde_json::from_str(r#"{"title": "t", "tags": ["a", "b"]}"#).unwrap();
    assert_eq!(raw["title"], RawValue::from("t"));
    assert_eq!(raw["tags"], RawValue::from(vec!["a", "b"]));

    let result = parse(&raw, &sample_schema());
    assert_eq!(result.values["tags"].as_array().unwrap(), ["a", "b"]);
}

#[test]
fn parse_result_serializes_to_json() {
    let result = parse(
        &raw_query_from_pairs([("since", "2020-01-02 03:04:05"), ("width", "x")]),
        &sample_schema(),
    );
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["values"]["since"], "2020-01-02 03:04:05");
    assert_eq!(json["values"]["width"], 640.0);
    assert_eq!(json["errors"]["title"]["required"], true);
    assert_eq!(json["errors"]["title"]["kind"], "missing_required");
    assert_eq!(json["errors"]["width"]["message"], "Expected a number");
}

#[test]
fn field_sets_are_shareable_across_threads() {
    let schema = std::sync::Arc::new(sample_schema());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let schema = std::sync::Arc::clone(&schema);
            std::thread::spawn(move || {
                let width = (i + 1).to_string();
                parse(
                    &raw_query_from_pairs([("title", "t"), ("width", width.as_str())]),
                    &schema,
                )
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap();
        assert_eq!(result.values["width"], Value::Number((i + 1) as f64));
    }
}
