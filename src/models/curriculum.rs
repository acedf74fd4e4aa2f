// Curriculum hierarchy embedded in a product: modules -> lessons -> resources.
// Durations are free text ("2 hours", "15 minutes") and are never parsed.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// STORED SHAPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub order: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub lesson_type: String,
    pub duration: String,
    pub order: u32,
    pub locked: bool,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub url: String,
    pub downloadable: bool,
}

/// Modules ordered by position. The sort is stable so ties keep storage order.
pub fn sorted_modules(modules: &[Module]) -> Vec<Module> {
    let mut sorted = modules.to_vec();
    sorted.sort_by_key(|m| m.order);
    sorted
}

// =============================================================================
// DASHBOARD INPUT
// =============================================================================

/// Accepts strings and numbers ("2 hours" or 2), everything else reads as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Module as submitted by the curriculum editor. Client `order` is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleInput {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    pub lessons: Option<Vec<LessonInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonInput {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub lesson_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    pub locked: Option<bool>,
    pub completed: Option<bool>,
    #[serde(deserialize_with = "lenient_string")]
    pub video_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub transcript: Option<String>,
    pub resources: Option<Vec<ResourceInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceInput {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub resource_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    pub downloadable: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_input_accepts_numeric_duration_and_ignores_order() {
        let input: ModuleInput = serde_json::from_value(json!({
            "title": "Intro",
            "duration": 2,
            "order": 7,
            "lessons": [{ "type": "video", "locked": false }]
        }))
        .unwrap();

        assert_eq!(input.duration.as_deref(), Some("2"));
        assert!(input.description.is_none());
        let lessons = input.lessons.unwrap();
        assert_eq!(lessons[0].lesson_type.as_deref(), Some("video"));
        assert_eq!(lessons[0].locked, Some(false));
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let input: ResourceInput =
            serde_json::from_value(json!({ "title": null, "url": null })).unwrap();
        assert!(input.title.is_none());
        assert!(input.url.is_none());
    }

    #[test]
    fn test_sorted_modules_is_stable() {
        let module = |id: &str, order: u32| Module {
            id: id.to_string(),
            title: id.to_string(),
            description: "d".to_string(),
            duration: "1h".to_string(),
            order,
            lessons: vec![],
        };
        let sorted = sorted_modules(&[module("b", 1), module("a", 0), module("c", 1)]);
        let ids: Vec<&str> = sorted.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
