use std::path::{Path, PathBuf};

use query_schema_config::{ConfigError, FieldConfig, SchemaFile, load_field_set, load_raw_query};
use query_schema_core::{FieldType, Value, parse};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const CARD_SCHEMA: &str = r#"
version: "1.0"
fields:
  title:
    type: string
    description: Card title
    required: true
  width:
    type: number
    default: 320
    max: 1200
  accent:
    type: color
    default: "0af"
  tags:
    type: array
"#;

// ---------------------------------------------------------------------------
// Schema + input files
// ---------------------------------------------------------------------------

#[test]
fn yaml_schema_and_json_input_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "card.yaml", CARD_SCHEMA);
    let input = write(
        dir.path(),
        "query.json",
        r#"{"title": "Hi", "width": 5000, "tags": ["x", "y"]}"#,
    );

    let fields = load_field_set(&schema).unwrap();
    let raw = load_raw_query(&input).unwrap();
    let result = parse(&raw, &fields);

    assert_eq!(result.values["title"], Value::String("Hi".into()));
    assert_eq!(result.values["accent"], Value::Color("#00aaff".into()));
    assert_eq!(result.values["tags"].as_array().unwrap(), ["x", "y"]);
    assert_eq!(result.values["width"], Value::Number(320.0));
    assert_eq!(
        result.errors["width"].message,
        "Expected a value of at most 1200"
    );
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn json_schema_file_is_detected_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(
        dir.path(),
        "schema.json",
        r#"{"version": "1.0", "fields": {"on": {"type": "boolean", "default": "yes"}}}"#,
    );

    let fields = load_field_set(&schema).unwrap();
    assert_eq!(fields.get("on").unwrap().default, Some(Value::Boolean(true)));
}

#[test]
fn malformed_schema_reports_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "broken.json", "{ not json");
    let err = load_field_set(&schema).unwrap_err();
    assert!(matches!(err, ConfigError::JsonError(_)));
}

#[test]
fn programmatic_schema_matches_file_schema() {
    let mut title = FieldConfig::new(FieldType::String);
    title.description = "Card title".into();
    title.required = true;

    let built = SchemaFile::new("1.0")
        .with_field("title", title)
        .to_field_set()
        .unwrap();
    let loaded = SchemaFile::from_yaml_str(CARD_SCHEMA)
        .unwrap()
        .to_field_set()
        .unwrap();

    let (a, b) = (built.get("title").unwrap(), loaded.get("title").unwrap());
    assert_eq!(a.value_type, b.value_type);
    assert_eq!(a.required, b.required);
    assert_eq!(a.description, b.description);
}
