//! Input parameter validation tests.
//!
//! Invalid `generate_image` arguments are rejected before any network call,
//! with every failing field reported.

#[cfg(test)]
mod tests {
    use gemini_image_mcp::GenerateImageParams;
    use gemini_image_mcp::input::ImageInput;
    use serde_json::json;

    fn params(value: serde_json::Value) -> GenerateImageParams {
        serde_json::from_value(value).unwrap()
    }

    fn failing_fields(params: &GenerateImageParams) -> Vec<String> {
        params
            .validate()
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn test_prompt_only_request_is_valid() {
        assert!(params(json!({"prompt": "A cat", "outputPath": "cat.png"})).validate().is_ok());
    }

    #[test]
    fn test_images_without_prompt_is_valid() {
        let p = params(json!({"images": [{"data": "ref.png"}], "outputPath": "out.png"}));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_count_out_of_range_is_rejected() {
        for count in [0, 11, 100] {
            let p = params(json!({"prompt": "A cat", "outputPath": "cat.png", "count": count}));
            assert_eq!(failing_fields(&p), vec!["count"], "count {} should be invalid", count);
        }
    }

    #[test]
    fn test_blank_prompt_without_images_is_rejected() {
        let p = params(json!({"prompt": "   ", "outputPath": "cat.png"}));
        assert_eq!(failing_fields(&p), vec!["prompt"]);
    }

    #[test]
    fn test_blank_output_path_is_rejected() {
        let p = params(json!({"prompt": "A cat", "outputPath": " "}));
        assert_eq!(failing_fields(&p), vec!["outputPath"]);
    }

    #[test]
    fn test_blank_image_entry_is_rejected_by_index() {
        let mut p = params(json!({"prompt": "A cat", "outputPath": "cat.png"}));
        p.images = vec![
            ImageInput { data: "a.png".to_string(), mime_type: None },
            ImageInput { data: "".to_string(), mime_type: None },
        ];
        assert_eq!(failing_fields(&p), vec!["images[1].data"]);
    }

    #[test]
    fn test_all_failures_are_reported_together() {
        let p = params(json!({"outputPath": "", "count": 0}));
        assert_eq!(failing_fields(&p), vec!["count", "prompt", "outputPath"]);
    }

    #[test]
    fn test_missing_output_path_fails_to_parse() {
        let result = serde_json::from_value::<GenerateImageParams>(json!({"prompt": "A cat"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_count_defaults_to_one() {
        let p = params(json!({"prompt": "A cat", "outputPath": "cat.png"}));
        assert_eq!(p.count, 1);
    }
}

#[cfg(test)]
mod property_tests {
    use gemini_image_mcp::GenerateImageParams;
    use gemini_image_mcp::handler::{MAX_COUNT, MIN_COUNT};
    use proptest::prelude::*;
    use serde_json::json;

    fn valid_prompt_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9 ]{0,60}"
    }

    fn valid_output_path_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,12}\\.(png|jpg|webp)"
    }

    proptest! {
        #[test]
        fn valid_params_combination_passes(
            prompt in valid_prompt_strategy(),
            output in valid_output_path_strategy(),
            count in MIN_COUNT..=MAX_COUNT,
        ) {
            let params: GenerateImageParams = serde_json::from_value(json!({
                "prompt": prompt,
                "outputPath": output,
                "count": count,
            })).unwrap();
            prop_assert!(params.validate().is_ok());
        }

        #[test]
        fn oversized_count_is_rejected(count in (MAX_COUNT + 1)..1000u32) {
            let params: GenerateImageParams = serde_json::from_value(json!({
                "prompt": "A cat",
                "outputPath": "cat.png",
                "count": count,
            })).unwrap();
            let errors = params.validate().unwrap_err();
            prop_assert!(errors.iter().any(|e| e.field == "count"));
        }

        #[test]
        fn negative_count_fails_to_parse(count in i64::MIN..0i64) {
            let result = serde_json::from_value::<GenerateImageParams>(json!({
                "prompt": "A cat",
                "outputPath": "cat.png",
                "count": count,
            }));
            prop_assert!(result.is_err());
        }
    }
}
