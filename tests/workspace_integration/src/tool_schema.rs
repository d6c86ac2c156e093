//! Tool schema validity tests.
//!
//! Every tool parameter type must produce an object schema whose property
//! names match the JSON field names clients send.

use serde_json::Value;

/// Validates that a JSON schema has the required structure.
fn validate_json_schema(schema: &Value) -> Result<(), String> {
    let obj = schema
        .as_object()
        .ok_or_else(|| "Schema must be an object".to_string())?;

    if let Some(type_val) = obj.get("type") {
        if type_val != "object" {
            return Err(format!("Expected type 'object', got {:?}", type_val));
        }
    }

    if let Some(properties) = obj.get("properties") {
        if !properties.is_object() {
            return Err("Properties must be an object".to_string());
        }
    }

    Ok(())
}

/// Validates that a tool has required fields.
fn validate_tool(tool: &rmcp::model::Tool) -> Result<(), String> {
    if tool.name.is_empty() {
        return Err("Tool name cannot be empty".to_string());
    }

    match &tool.description {
        Some(description) if !description.is_empty() => {}
        _ => return Err(format!("Tool '{}' must have a description", tool.name)),
    }

    if tool.input_schema.is_empty() {
        return Err(format!("Tool '{}' must have an input schema", tool.name));
    }

    let schema_value = serde_json::to_value(&*tool.input_schema)
        .map_err(|e| format!("Failed to serialize schema: {}", e))?;
    validate_json_schema(&schema_value)?;

    Ok(())
}

/// Names listed under `required` in a schema.
fn required_fields(schema: &Value) -> Vec<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemini_image_mcp::GenerateImageParams;
    use gemini_image_mcp::server::ValidateImageToolParams;
    use schemars::schema_for;
    use std::borrow::Cow;
    use std::sync::Arc;

    fn tool(name: &'static str, description: Option<&'static str>, schema: Value) -> rmcp::model::Tool {
        rmcp::model::Tool {
            name: Cow::Borrowed(name),
            description: description.map(Cow::Borrowed),
            input_schema: Arc::new(schema.as_object().cloned().unwrap_or_default()),
            annotations: None,
            icons: None,
            meta: None,
            output_schema: None,
            title: None,
        }
    }

    #[test]
    fn test_json_schema_validation() {
        let valid_schema = serde_json::json!({
            "type": "object",
            "properties": {"prompt": {"type": "string"}},
            "required": ["prompt"]
        });
        assert!(validate_json_schema(&valid_schema).is_ok());

        let invalid_schema = serde_json::json!({"type": "string"});
        assert!(validate_json_schema(&invalid_schema).is_err());
    }

    #[test]
    fn test_tool_validation() {
        let schema = serde_json::json!({"type": "object", "properties": {}});
        assert!(validate_tool(&tool("test_tool", Some("A test tool"), schema.clone())).is_ok());
        assert!(validate_tool(&tool("", Some("A test tool"), schema.clone())).is_err());
        assert!(validate_tool(&tool("test_tool", None, schema)).is_err());
        assert!(validate_tool(&tool("test_tool", Some("A test tool"), serde_json::json!({}))).is_err());
    }

    #[test]
    fn test_generate_image_schema_validity() {
        let schema = serde_json::to_value(schema_for!(GenerateImageParams)).unwrap();
        assert!(validate_json_schema(&schema).is_ok());
        assert!(validate_tool(&tool("generate_image", Some("Generate images"), schema.clone())).is_ok());

        let properties = schema["properties"].as_object().unwrap();
        for field in ["prompt", "images", "outputPath", "count", "options"] {
            assert!(properties.contains_key(field), "Schema should have '{}' property", field);
        }
        assert!(!properties.contains_key("output_path"));
    }

    #[test]
    fn test_generate_image_only_requires_output_path() {
        let schema = serde_json::to_value(schema_for!(GenerateImageParams)).unwrap();
        assert_eq!(required_fields(&schema), vec!["outputPath".to_string()]);
    }

    #[test]
    fn test_image_entry_schema_uses_mime_type_name() {
        let schema = serde_json::to_value(schema_for!(GenerateImageParams)).unwrap();
        let text = schema.to_string();
        assert!(text.contains("\"mimeType\""));
        assert!(!text.contains("\"mime_type\""));
    }

    #[test]
    fn test_validate_image_schema_validity() {
        let schema = serde_json::to_value(schema_for!(ValidateImageToolParams)).unwrap();
        assert!(validate_json_schema(&schema).is_ok());
        assert_eq!(required_fields(&schema), vec!["path".to_string()]);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use schemars::schema_for;

    fn valid_tool_name_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{2,30}".prop_map(|s| s.to_string())
    }

    proptest! {
        /// Any snake_case tool name with a description and object schema is accepted
        #[test]
        fn well_formed_tools_validate(name in valid_tool_name_strategy()) {
            let tool = rmcp::model::Tool {
                name: std::borrow::Cow::Owned(name),
                description: Some(std::borrow::Cow::Borrowed("Does something useful")),
                input_schema: std::sync::Arc::new(
                    serde_json::json!({"type": "object", "properties": {}})
                        .as_object()
                        .cloned()
                        .unwrap(),
                ),
                annotations: None,
                icons: None,
                meta: None,
                output_schema: None,
                title: None,
            };
            prop_assert!(validate_tool(&tool).is_ok());
        }
    }

    #[test]
    fn all_param_types_produce_object_schemas() {
        let schemas = vec![
            (
                "GenerateImageParams",
                serde_json::to_value(schema_for!(gemini_image_mcp::GenerateImageParams)).unwrap(),
            ),
            (
                "ValidateImageToolParams",
                serde_json::to_value(schema_for!(gemini_image_mcp::server::ValidateImageToolParams))
                    .unwrap(),
            ),
        ];

        for (name, schema) in schemas {
            let result = validate_json_schema(&schema);
            assert!(result.is_ok(), "Schema for {} should be valid: {:?}", name, result.err());
            assert_eq!(
                schema.get("type").and_then(|v| v.as_str()),
                Some("object"),
                "Schema type for {} should be 'object'",
                name
            );
        }
    }
}
