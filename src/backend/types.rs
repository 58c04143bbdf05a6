//! Wire types for the analysis backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Result of `POST /evaluate`.
///
/// Produced wholly by the backend and never mutated by the client. A new
/// analysis replaces it; a reset drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Data Quality Score, 0-100.
    pub dqs: f64,
    /// Dimension name to score (0-100). Ordered by name.
    #[serde(default)]
    pub dimensions: BTreeMap<String, f64>,
    #[serde(default)]
    pub insights: Insights,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Insight payload: normally prose, occasionally a structured object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Insights {
    Text(String),
    Structured(serde_json::Value),
}

impl Default for Insights {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Insights {
    /// Text shown in the insight card. Structured values render as compact JSON.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => value.to_string(),
        }
    }
}

/// Body of `POST /fix`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FixRequest<'a> {
    pub issue: &'a str,
}

/// Response of `POST /fix`.
#[derive(Debug, Deserialize)]
pub struct FixResponse {
    pub fix: String,
}

/// Body of `POST /chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Response of `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_text_insights() {
        let json = r#"{
            "dqs": 62,
            "dimensions": {"Uniqueness": 40, "Completeness": 90.5},
            "insights": "Duplicates dominate.",
            "recommendations": ["Dedupe IDs"]
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.dqs, 62.0);
        let names: Vec<&str> = result.dimensions.keys().map(String::as_str).collect();
        assert_eq!(names, ["Completeness", "Uniqueness"]);
        assert_eq!(result.insights, Insights::Text("Duplicates dominate.".into()));
        assert_eq!(result.recommendations, vec!["Dedupe IDs".to_string()]);
    }

    #[test]
    fn deserialize_structured_insights() {
        let json = r#"{"dqs": 88.2, "dimensions": {}, "insights": {"risk": "low"}, "recommendations": []}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.insights.display_text(), r#"{"risk":"low"}"#);
    }

    #[test]
    fn missing_optional_fields_default() {
        let result: AnalysisResult = serde_json::from_str(r#"{"dqs": 10}"#).unwrap();
        assert!(result.dimensions.is_empty());
        assert!(result.recommendations.is_empty());
        assert_eq!(result.insights.display_text(), "");
    }

    #[test]
    fn request_bodies_use_backend_field_names() {
        let fix = serde_json::to_string(&FixRequest { issue: "Dedupe IDs" }).unwrap();
        assert_eq!(fix, r#"{"issue":"Dedupe IDs"}"#);
        let chat = serde_json::to_string(&ChatRequest { message: "why?" }).unwrap();
        assert_eq!(chat, r#"{"message":"why?"}"#);
    }
}
