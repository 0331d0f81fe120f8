//! Prompt template and response schema for the skin-analysis call.

use serde_json::{json, Value};

/// Instruction sent alongside the selfie. Placeholders are filled with the
/// Russian labels of the user's selections.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = "\
Act as a world-class dermatologist and celebrity makeup artist speaking Russian.
Analyze the attached photo of the user's face.

User Profile Data (in Russian):
- Self-reported Skin Type: {skin_type}
- Primary Concerns: {concerns}
- Budget Preference: {budget}

Task:
1. Analyze the photo to determine actual skin tone, undertone, and visible skin conditions.
2. Compare visual findings with their self-reported data.
3. Recommend 4-5 specific cosmetic or skincare products (cleanser, serum, moisturizer, foundation, etc.) that perfectly match their needs.
4. Ensure all text output is in Russian language.
5. Prices should be in Russian Rubles (₽).

Output strictly in JSON format conforming to the schema.";

/// Strict output schema declared to the API. Every field of
/// [`crate::models::AnalysisResult`] is required, as is every field of each
/// recommendation object.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "skinTone": {
                "type": "STRING",
                "description": "Detected skin tone in Russian (e.g., Светлый, Смуглый)"
            },
            "undertone": {
                "type": "STRING",
                "description": "Detected undertone in Russian (e.g., Холодный, Теплый, Нейтральный)"
            },
            "detectedFeatures": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of detected skin features visible in the photo in Russian"
            },
            "analysisText": {
                "type": "STRING",
                "description": "A friendly, professional analysis summary of the skin based on the photo and user data in Russian. Max 2 sentences."
            },
            "recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "brand": { "type": "STRING" },
                        "category": {
                            "type": "STRING",
                            "description": "Category in Russian (e.g. Увлажняющий крем)"
                        },
                        "price": {
                            "type": "STRING",
                            "description": "Estimated price in Rubles (₽)"
                        },
                        "reason": {
                            "type": "STRING",
                            "description": "Why this specific product matches the user's skin profile in Russian."
                        },
                        "rating": {
                            "type": "NUMBER",
                            "description": "A simulated rating out of 5 (e.g., 4.5)"
                        }
                    },
                    "required": ["name", "brand", "category", "price", "reason", "rating"]
                }
            }
        },
        "required": ["skinTone", "undertone", "detectedFeatures", "analysisText", "recommendations"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_every_result_field() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        for field in [
            "skinTone",
            "undertone",
            "detectedFeatures",
            "analysisText",
            "recommendations",
        ] {
            assert!(required.contains(&field), "{field} must be required");
        }
    }

    #[test]
    fn test_schema_requires_every_recommendation_field() {
        let schema = response_schema();
        let required: Vec<&str> = schema["properties"]["recommendations"]["items"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        for field in ["name", "brand", "category", "price", "reason", "rating"] {
            assert!(required.contains(&field), "{field} must be required");
        }
    }
}
