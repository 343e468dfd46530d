use crate::convert::schema::convert_tool_schema;
use crate::error::SchemaError;
use crate::protocol::{FunctionDeclaration, Tool};

/// Convert neutral tools into a single Gemini tool group
///
/// Declarations keep the input order. The first failing tool aborts the
/// whole batch.
pub fn convert_tools(tools: &[parley_core::Tool]) -> Result<Vec<Tool>, SchemaError> {
    let function_declarations = tools
        .iter()
        .map(|tool| convert_tool_to_function(tool).map_err(|e| SchemaError::tool(&tool.name, e)))
        .collect::<Result<_, _>>()?;

    Ok(vec![Tool { function_declarations }])
}

/// Convert one neutral tool into a function declaration
pub fn convert_tool_to_function(tool: &parley_core::Tool) -> Result<FunctionDeclaration, SchemaError> {
    Ok(FunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: Some(convert_tool_schema(&tool.schema)?),
    })
}

#[cfg(test)]
mod tests {
    use parley_core::{ToolProperties, ToolSchema};
    use serde_json::json;

    use super::*;
    use crate::protocol::Type;

    fn tool(name: &str, properties: serde_json::Value) -> parley_core::Tool {
        let serde_json::Value::Object(map) = properties else {
            panic!("test properties must be an object");
        };
        parley_core::Tool::new(name, format!("{name} tool"), ToolSchema::new(ToolProperties::Map(map)))
    }

    #[test]
    fn one_group_with_declarations_in_order() {
        let tools = vec![
            tool("read_file", json!({"path": {"type": "string"}})),
            parley_core::Tool::new("now", "Current time", ToolSchema::default()),
            tool("search", json!({"query": {"type": "string"}})),
        ];

        let groups = convert_tools(&tools).unwrap();
        assert_eq!(groups.len(), 1);

        let names: Vec<_> = groups[0].function_declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["read_file", "now", "search"]);

        let now = &groups[0].function_declarations[1];
        assert_eq!(now.description, "Current time");
        let parameters = now.parameters.as_ref().unwrap();
        assert_eq!(parameters.schema_type, Some(Type::Object));
        assert!(parameters.properties.is_empty());
    }

    #[test]
    fn failure_names_the_offending_tool() {
        let tools = vec![
            tool("fine", json!({"a": {"type": "string"}})),
            tool("broken", json!({"a": 42})),
        ];

        let error = convert_tools(&tools).unwrap_err();
        assert_eq!(
            error.to_string(),
            "converting tool broken: converting property a: property is not an object"
        );
    }

    #[test]
    fn no_tools_yields_empty_group() {
        let groups = convert_tools(&[]).unwrap();
        assert_eq!(groups, vec![Tool::default()]);
    }
}
