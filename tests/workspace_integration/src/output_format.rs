//! Output format tests.
//!
//! Tool results are JSON text content. `generate_image` always reports
//! `success`, `images` and, on failure, an `error` with a stable code;
//! `validate_image` reports a camelCase validation object.

use rmcp::model::{CallToolResult, Content, RawContent};
use serde_json::Value;

/// Validates that a CallToolResult carries JSON text content.
fn validate_tool_result(result: &CallToolResult) -> Result<Value, String> {
    let first = result
        .content
        .first()
        .ok_or_else(|| "Result should have content".to_string())?;
    validate_content(first)
}

/// Parses a content item as JSON text.
fn validate_content(content: &Content) -> Result<Value, String> {
    match &content.raw {
        RawContent::Text(text_content) => {
            if text_content.text.is_empty() {
                return Err("Text content should not be empty".to_string());
            }
            serde_json::from_str(&text_content.text)
                .map_err(|e| format!("Text content should be JSON: {}", e))
        }
        _ => Err("Tool results should be text content".to_string()),
    }
}

/// Validates the shape of a serialized `GenerationResult`.
fn validate_generation_result(value: &Value) -> Result<(), String> {
    let success = value
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| "Result must have a boolean 'success'".to_string())?;
    let images = value
        .get("images")
        .and_then(Value::as_array)
        .ok_or_else(|| "Result must have an 'images' array".to_string())?;

    for image in images {
        if image.get("path").and_then(Value::as_str).is_none() {
            return Err("Each image must have a 'path'".to_string());
        }
        let dims = image
            .get("dimensions")
            .ok_or_else(|| "Each image must have 'dimensions'".to_string())?;
        if dims.get("width").and_then(Value::as_u64).is_none()
            || dims.get("height").and_then(Value::as_u64).is_none()
        {
            return Err("Dimensions must have numeric width and height".to_string());
        }
    }

    match (success, value.get("error")) {
        (true, None) => Ok(()),
        (true, Some(_)) => Err("Successful result must not carry an error".to_string()),
        (false, Some(error)) => {
            let code = error.get("code").and_then(Value::as_str).unwrap_or_default();
            if code.is_empty() || code != code.to_uppercase() {
                return Err(format!("Error code should be SCREAMING_SNAKE_CASE, got {:?}", code));
            }
            if error.get("message").and_then(Value::as_str).is_none() {
                return Err("Error must have a message".to_string());
            }
            Ok(())
        }
        (false, None) => Err("Failed result must carry an error".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemini_image_mcp::handler::{Dimensions, GeneratedImage, ValidationError};
    use gemini_image_mcp::validate::validate_image;
    use gemini_image_mcp::{ErrorCode, GenerationError, GenerationResult};
    use serde_json::json;
    use tempfile::TempDir;

    fn image(path: &str, width: u32, height: u32) -> GeneratedImage {
        GeneratedImage {
            path: path.to_string(),
            dimensions: Dimensions { width, height },
        }
    }

    #[test]
    fn test_text_content_must_be_json() {
        assert!(validate_content(&Content::text("{\"success\": true}")).is_ok());
        assert!(validate_content(&Content::text("not json")).is_err());
        assert!(validate_content(&Content::text("")).is_err());
        assert!(validate_content(&Content::image("aGVsbG8=", "image/png")).is_err());
    }

    #[test]
    fn test_success_result_shape() {
        let result = GenerationResult::success(vec![image("/tmp/a-1.png", 1024, 1024)]);
        let value = serde_json::to_value(&result).unwrap();
        assert!(validate_generation_result(&value).is_ok());
        assert_eq!(
            value,
            json!({
                "success": true,
                "images": [{"path": "/tmp/a-1.png", "dimensions": {"width": 1024, "height": 1024}}]
            })
        );
    }

    #[test]
    fn test_failure_result_shape() {
        let err = GenerationError::invalid_input(vec![ValidationError::new("count", "must be between 1 and 10, got 0")]);
        let value = serde_json::to_value(GenerationResult::from_outcome(Err(err))).unwrap();
        assert!(validate_generation_result(&value).is_ok());
        assert_eq!(value["success"], false);
        assert_eq!(value["images"], json!([]));
        assert_eq!(value["error"]["code"], "INVALID_INPUT");
        assert_eq!(value["error"]["details"]["errors"][0]["field"], "count");
    }

    #[test]
    fn test_no_images_result_reports_attempts() {
        let err = GenerationError::NoImagesGenerated { attempted: 3 };
        let value = serde_json::to_value(GenerationResult::from_outcome(Err(err))).unwrap();
        assert_eq!(value["error"]["code"], "NO_IMAGES_GENERATED");
        assert_eq!(value["error"]["details"]["attempted"], 3);
    }

    #[test]
    fn test_tool_result_wraps_json_text() {
        let result = GenerationResult::success(vec![image("out.png", 10, 10)]);
        let text = serde_json::to_string_pretty(&result).unwrap();
        let tool_result = CallToolResult::success(vec![Content::text(text)]);
        let value = validate_tool_result(&tool_result).unwrap();
        assert!(validate_generation_result(&value).is_ok());
    }

    #[test]
    fn test_every_error_code_is_screaming_snake() {
        for code in ErrorCode::ALL {
            let value = serde_json::to_value(code).unwrap();
            let text = value.as_str().unwrap();
            assert_eq!(text, code.as_str());
            assert!(text.chars().all(|c| c.is_ascii_uppercase() || c == '_'), "{}", text);
        }
    }

    #[tokio::test]
    async fn test_validation_report_shape() {
        let dir = TempDir::new().unwrap();
        let report = validate_image(&dir.path().join("missing.png"), 10).await;
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({"exists": false, "valid": false, "error": "File does not exist"})
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use gemini_image_mcp::GenerationResult;
    use gemini_image_mcp::handler::{Dimensions, GeneratedImage};
    use proptest::prelude::*;

    fn generated_image_strategy() -> impl Strategy<Value = GeneratedImage> {
        ("[a-z]{1,10}-[0-9]\\.png", 1u32..4096, 1u32..4096).prop_map(|(path, width, height)| {
            GeneratedImage {
                path,
                dimensions: Dimensions { width, height },
            }
        })
    }

    proptest! {
        /// Every successful result serializes to the documented shape
        #[test]
        fn success_results_are_well_formed(
            images in prop::collection::vec(generated_image_strategy(), 1..10)
        ) {
            let count = images.len();
            let value = serde_json::to_value(GenerationResult::success(images)).unwrap();
            prop_assert!(validate_generation_result(&value).is_ok());
            prop_assert_eq!(value["images"].as_array().unwrap().len(), count);
        }
    }
}
