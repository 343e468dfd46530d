//! Schema translation into the Gemini schema model
//!
//! Tool parameters arrive as loosely-typed JSON and only the recognized
//! subset (type, items, properties, description) is carried over.
//! Structured-output schemas arrive as [`parley_core::Schema`] and map
//! field-for-field.

use indexmap::IndexMap;
use parley_core::{SchemaType, ToolSchema};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::protocol::{Schema, Type};

/// Deepest schema nesting either converter accepts
pub const MAX_SCHEMA_DEPTH: usize = 32;

/// Convert a tool parameter schema
///
/// Accepts both a standard JSON Schema object (`properties` plus
/// `required`) and a flat map where every key is a property definition.
/// A tool without properties becomes an empty object schema.
pub fn convert_tool_schema(schema: &ToolSchema) -> Result<Schema, SchemaError> {
    let Some(properties) = &schema.properties else {
        return Ok(Schema::of(Type::Object));
    };

    let props = properties.canonicalize().map_err(SchemaError::Unmarshal)?;

    let (definitions, required) = match props.get("properties") {
        Some(Value::Object(nested)) => (nested, required_names(props.get("required"))),
        _ => (&*props, Vec::new()),
    };

    Ok(Schema {
        properties: convert_properties(definitions, 1)?,
        required,
        ..Schema::of(Type::Object)
    })
}

/// Convert a single loosely-typed property definition
pub fn convert_property(prop: &Value) -> Result<Schema, SchemaError> {
    convert_property_at(prop, 1)
}

fn convert_property_at(prop: &Value, depth: usize) -> Result<Schema, SchemaError> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(SchemaError::TooDeep { max: MAX_SCHEMA_DEPTH });
    }

    let Value::Object(prop) = prop else {
        return Err(SchemaError::NotAnObject);
    };

    let mut schema = Schema::default();

    match prop.get("type").and_then(Value::as_str) {
        Some("number") => schema.schema_type = Some(Type::Number),
        Some("integer") => schema.schema_type = Some(Type::Integer),
        Some("boolean") => schema.schema_type = Some(Type::Boolean),
        Some("array") => {
            schema.schema_type = Some(Type::Array);
            if let Some(items @ Value::Object(_)) = prop.get("items") {
                let items = convert_property_at(items, depth + 1).map_err(SchemaError::items)?;
                schema.items = Some(Box::new(items));
            }
        }
        Some("object") => {
            schema.schema_type = Some(Type::Object);
            if let Some(Value::Object(nested)) = prop.get("properties") {
                schema.properties = convert_properties(nested, depth + 1)?;
            }
        }
        _ => schema.schema_type = Some(Type::String),
    }

    if let Some(Value::String(description)) = prop.get("description") {
        schema.description = Some(description.clone());
    }

    Ok(schema)
}

fn convert_properties(definitions: &Map<String, Value>, depth: usize) -> Result<IndexMap<String, Schema>, SchemaError> {
    definitions
        .iter()
        .map(|(name, prop)| {
            convert_property_at(prop, depth)
                .map(|schema| (name.clone(), schema))
                .map_err(|e| SchemaError::property(name, e))
        })
        .collect()
}

/// String entries of a `required` list; anything else is ignored
fn required_names(required: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = required else {
        return Vec::new();
    };

    entries.iter().filter_map(Value::as_str).map(str::to_owned).collect()
}

/// Convert a structured-output schema
pub fn convert_response_schema(schema: &parley_core::Schema) -> Result<Schema, SchemaError> {
    convert_response_schema_at(schema, 1)
}

fn convert_response_schema_at(schema: &parley_core::Schema, depth: usize) -> Result<Schema, SchemaError> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(SchemaError::TooDeep { max: MAX_SCHEMA_DEPTH });
    }

    let mut out = Schema::default();

    match schema.schema_type.unwrap_or_default() {
        SchemaType::String | SchemaType::Unspecified => out.schema_type = Some(Type::String),
        SchemaType::Number => out.schema_type = Some(Type::Number),
        SchemaType::Integer => out.schema_type = Some(Type::Integer),
        SchemaType::Boolean => out.schema_type = Some(Type::Boolean),
        SchemaType::Array => {
            out.schema_type = Some(Type::Array);
            if let Some(items) = &schema.items {
                let items = convert_response_schema_at(items, depth + 1).map_err(SchemaError::items)?;
                out.items = Some(Box::new(items));
            }
        }
        SchemaType::Object => {
            out.schema_type = Some(Type::Object);
            out.properties = schema
                .properties
                .iter()
                .map(|(name, prop)| {
                    convert_response_schema_at(prop, depth + 1)
                        .map(|converted| (name.clone(), converted))
                        .map_err(|e| SchemaError::property(name, e))
                })
                .collect::<Result<_, _>>()?;
            out.required.clone_from(&schema.required);
        }
    }

    out.any_of = schema
        .any_of
        .iter()
        .enumerate()
        .map(|(index, alternative)| {
            convert_response_schema_at(alternative, depth + 1).map_err(|e| SchemaError::any_of(index, e))
        })
        .collect::<Result<_, _>>()?;

    out.title.clone_from(&schema.title);
    out.description.clone_from(&schema.description);
    out.format.clone_from(&schema.format);
    out.pattern.clone_from(&schema.pattern);
    out.default.clone_from(&schema.default);
    out.example.clone_from(&schema.example);
    out.enum_values.clone_from(&schema.enum_values);
    out.nullable = schema.nullable;
    out.minimum = schema.minimum;
    out.maximum = schema.maximum;
    out.min_length = schema.min_length;
    out.max_length = schema.max_length;
    out.min_items = schema.min_items;
    out.max_items = schema.max_items;
    out.min_properties = schema.min_properties;
    out.max_properties = schema.max_properties;
    out.property_ordering.clone_from(&schema.property_ordering);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use parley_core::ToolProperties;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn tool_schema(value: Value) -> ToolSchema {
        let Value::Object(map) = value else {
            panic!("test schema must be an object");
        };
        ToolSchema::new(ToolProperties::Map(map))
    }

    #[test]
    fn missing_properties_become_empty_object() {
        let schema = convert_tool_schema(&ToolSchema::default()).unwrap();
        assert_eq!(schema.schema_type, Some(Type::Object));
        assert!(schema.properties.is_empty());
        assert!(schema.required.is_empty());
    }

    #[test]
    fn json_schema_shape_extracts_nested_properties_and_required() {
        let schema = convert_tool_schema(&tool_schema(json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "File to read"},
                "limit": {"type": "integer"}
            },
            "required": ["path", 7, null]
        })))
        .unwrap();

        assert_eq!(schema.properties.len(), 2);
        assert_eq!(schema.properties["path"].description.as_deref(), Some("File to read"));
        assert_eq!(schema.properties["limit"].schema_type, Some(Type::Integer));
        assert_eq!(schema.required, vec!["path".to_owned()]);
    }

    #[test]
    fn flat_shape_treats_every_key_as_property() {
        let schema = convert_tool_schema(&tool_schema(json!({
            "query": {"type": "string"},
            "tags": {"type": "array", "items": {"type": "string"}},
            "filters": {"type": "object", "properties": {"after": {"type": "string"}}}
        })))
        .unwrap();

        assert_eq!(schema.properties.len(), 3);
        assert!(schema.required.is_empty());
        let tags = &schema.properties["tags"];
        assert_eq!(tags.items.as_ref().and_then(|i| i.schema_type), Some(Type::String));
        let filters = &schema.properties["filters"];
        assert_eq!(filters.properties["after"].schema_type, Some(Type::String));
    }

    #[test]
    fn opaque_properties_are_canonicalized() {
        #[derive(serde::Serialize)]
        struct Params {
            name: Value,
        }

        let properties = ToolProperties::from_serializable(&Params {
            name: json!({"type": "string"}),
        })
        .unwrap();
        let schema = convert_tool_schema(&ToolSchema::new(properties)).unwrap();
        assert_eq!(schema.properties["name"].schema_type, Some(Type::String));
    }

    #[test]
    fn opaque_properties_that_are_not_an_object_fail() {
        let properties = ToolProperties::from_serializable(&[1, 2, 3]).unwrap();
        let error = convert_tool_schema(&ToolSchema::new(properties)).unwrap_err();
        assert!(matches!(error, SchemaError::Unmarshal(_)));
    }

    #[test]
    fn unknown_or_absent_tool_types_default_to_string() {
        for prop in [json!({"type": "date"}), json!({}), json!({"type": 3})] {
            assert_eq!(convert_property(&prop).unwrap().schema_type, Some(Type::String));
        }
    }

    #[test]
    fn non_object_property_fails_with_its_path() {
        let error = convert_tool_schema(&tool_schema(json!({
            "outer": {"type": "object", "properties": {"inner": "string"}}
        })))
        .unwrap_err();

        assert_eq!(
            error.to_string(),
            "converting property outer: converting property inner: property is not an object"
        );
    }

    #[test]
    fn non_object_items_are_ignored() {
        let schema = convert_property(&json!({"type": "array", "items": "string"})).unwrap();
        assert_eq!(schema.schema_type, Some(Type::Array));
        assert!(schema.items.is_none());
    }

    #[test]
    fn deeply_nested_tool_property_is_rejected() {
        let mut prop = json!({"type": "string"});
        for _ in 0..MAX_SCHEMA_DEPTH {
            prop = json!({"type": "array", "items": prop});
        }

        let error = convert_property(&prop).unwrap_err();
        let mut current = &error;
        while let SchemaError::Items(inner) = current {
            current = &**inner;
        }
        assert!(matches!(current, SchemaError::TooDeep { max: MAX_SCHEMA_DEPTH }));
    }

    #[test]
    fn unspecified_response_type_defaults_to_string() {
        let schema: parley_core::Schema = serde_json::from_value(json!({"type": "date", "format": "date"})).unwrap();
        let converted = convert_response_schema(&schema).unwrap();
        assert_eq!(converted.schema_type, Some(Type::String));
        assert_eq!(converted.format.as_deref(), Some("date"));

        let untyped = convert_response_schema(&parley_core::Schema::default()).unwrap();
        assert_eq!(untyped.schema_type, Some(Type::String));
    }

    #[test]
    fn constraints_copy_regardless_of_type() {
        let schema = parley_core::Schema {
            min_items: Some(1),
            pattern: Some("^a".to_owned()),
            ..parley_core::Schema::of(SchemaType::Boolean)
        };
        let converted = convert_response_schema(&schema).unwrap();
        assert_eq!(converted.schema_type, Some(Type::Boolean));
        assert_eq!(converted.min_items, Some(1));
        assert_eq!(converted.pattern.as_deref(), Some("^a"));
    }

    #[test]
    fn empty_any_of_serializes_as_absent() {
        let converted = convert_response_schema(&parley_core::Schema::of(SchemaType::Integer)).unwrap();
        let value = serde_json::to_value(&converted).unwrap();
        assert_eq!(value, json!({"type": "INTEGER"}));
    }

    #[test]
    fn response_failure_names_the_subtree() {
        let mut deep = parley_core::Schema::of(SchemaType::String);
        for _ in 0..MAX_SCHEMA_DEPTH {
            deep = parley_core::Schema {
                any_of: vec![parley_core::Schema::of(SchemaType::Number), deep],
                ..parley_core::Schema::default()
            };
        }
        let schema = parley_core::Schema::object([("answer".to_owned(), deep)]);

        let error = convert_response_schema(&schema).unwrap_err();
        let SchemaError::Property { name, source } = error else {
            panic!("expected property context, got {error:?}");
        };
        assert_eq!(name, "answer");
        assert!(matches!(*source, SchemaError::AnyOf { index: 1, .. }));
    }

    fn map_type(schema_type: SchemaType) -> Type {
        match schema_type {
            SchemaType::String | SchemaType::Unspecified => Type::String,
            SchemaType::Number => Type::Number,
            SchemaType::Integer => Type::Integer,
            SchemaType::Boolean => Type::Boolean,
            SchemaType::Array => Type::Array,
            SchemaType::Object => Type::Object,
        }
    }

    fn arb_type() -> impl Strategy<Value = SchemaType> {
        prop_oneof![
            Just(SchemaType::String),
            Just(SchemaType::Number),
            Just(SchemaType::Integer),
            Just(SchemaType::Boolean),
            Just(SchemaType::Unspecified),
        ]
    }

    fn arb_leaf() -> impl Strategy<Value = parley_core::Schema> {
        (
            arb_type(),
            proptest::option::of("[a-z ]{0,12}"),
            proptest::option::of("[a-z]{1,8}"),
            proptest::collection::vec("[a-z]{1,6}", 0..3),
            proptest::option::of(any::<bool>()),
            proptest::option::of(-1000.0f64..1000.0),
            proptest::option::of(0i64..100),
            proptest::option::of(0i64..100),
            proptest::option::of(any::<i32>().prop_map(Value::from)),
        )
            .prop_map(
                |(schema_type, description, pattern, enum_values, nullable, minimum, min_length, max_items, default)| {
                    parley_core::Schema {
                        schema_type: Some(schema_type),
                        description,
                        pattern,
                        enum_values,
                        nullable,
                        minimum,
                        maximum: minimum.map(|m| m + 1.0),
                        min_length,
                        max_length: min_length.map(|m| m + 10),
                        max_items,
                        default,
                        example: Some(Value::from("example")),
                        ..parley_core::Schema::default()
                    }
                },
            )
    }

    fn arb_schema() -> impl Strategy<Value = parley_core::Schema> {
        arb_leaf().prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                (proptest::collection::vec(("[a-z]{1,6}", inner.clone()), 0..4), any::<bool>()).prop_map(
                    |(properties, require_all)| {
                        let properties: IndexMap<_, _> = properties.into_iter().collect();
                        let required = if require_all {
                            properties.keys().cloned().collect()
                        } else {
                            Vec::new()
                        };
                        parley_core::Schema {
                            schema_type: Some(SchemaType::Object),
                            min_properties: Some(0),
                            max_properties: i64::try_from(properties.len()).ok(),
                            title: Some("object".to_owned()),
                            properties,
                            required,
                            ..parley_core::Schema::default()
                        }
                    }
                ),
                proptest::option::of(inner.clone()).prop_map(|items| parley_core::Schema {
                    schema_type: Some(SchemaType::Array),
                    items: items.map(Box::new),
                    min_items: Some(0),
                    ..parley_core::Schema::default()
                }),
                proptest::collection::vec(inner, 1..3).prop_map(|any_of| parley_core::Schema {
                    any_of,
                    nullable: Some(true),
                    ..parley_core::Schema::default()
                }),
            ]
        })
    }

    fn assert_preserved(input: &parley_core::Schema, output: &Schema) {
        assert_eq!(output.schema_type, Some(map_type(input.schema_type.unwrap_or_default())));
        assert_eq!(output.title, input.title);
        assert_eq!(output.description, input.description);
        assert_eq!(output.format, input.format);
        assert_eq!(output.pattern, input.pattern);
        assert_eq!(output.default, input.default);
        assert_eq!(output.example, input.example);
        assert_eq!(output.enum_values, input.enum_values);
        assert_eq!(output.nullable, input.nullable);
        assert_eq!(output.minimum, input.minimum);
        assert_eq!(output.maximum, input.maximum);
        assert_eq!(output.min_length, input.min_length);
        assert_eq!(output.max_length, input.max_length);
        assert_eq!(output.min_items, input.min_items);
        assert_eq!(output.max_items, input.max_items);
        assert_eq!(output.min_properties, input.min_properties);
        assert_eq!(output.max_properties, input.max_properties);

        if input.schema_type == Some(SchemaType::Object) {
            assert_eq!(output.required, input.required);
            assert_eq!(output.properties.len(), input.properties.len());
            for (name, prop) in &input.properties {
                assert_preserved(prop, &output.properties[name]);
            }
        }

        match (&input.items, &output.items) {
            (Some(input), Some(output)) => assert_preserved(input, output),
            (None, None) => {}
            (input, output) => panic!("items mismatch: {input:?} vs {output:?}"),
        }

        assert_eq!(output.any_of.len(), input.any_of.len());
        for (input, output) in input.any_of.iter().zip(&output.any_of) {
            assert_preserved(input, output);
        }
    }

    proptest! {
        #[test]
        fn response_schema_conversion_preserves_structure(schema in arb_schema()) {
            let converted = convert_response_schema(&schema).unwrap();
            assert_preserved(&schema, &converted);
        }
    }
}
