//! Payload extraction from assistant replies
//!
//! Models rarely answer with bare JSON. The reply is scanned for the first
//! well-formed JSON object carrying both `title` and `priority`; any prose or
//! code fences around it are ignored.

use serde_json::{Map, Value};
use taskstore::Priority;
use thiserror::Error;
use tracing::debug;

/// A task suggestion parsed out of an assistant reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantResponse {
    pub title: String,
    pub priority: Priority,
}

/// Why a reply could not be turned into a task
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Reply contained no JSON object with title and priority")]
    NotFound,

    #[error("Reply object is missing the '{0}' field")]
    MissingField(&'static str),

    #[error("Field '{0}' must be a string")]
    NotAString(&'static str),

    #[error("Task title is empty")]
    EmptyTitle,

    #[error("Unknown priority '{0}' (expected low, medium or high)")]
    InvalidPriority(String),
}

/// Locate and validate the `{title, priority}` payload in a reply
pub fn extract_payload(reply: &str) -> Result<AssistantResponse, PayloadError> {
    debug!(reply_len = reply.len(), "extract_payload: called");
    // First object that had only one of the two fields, for a better error
    let mut missing: Option<&'static str> = None;

    for (start, _) in reply.match_indices('{') {
        let Some(object) = parse_object_at(&reply[start..]) else {
            continue;
        };

        match (object.get("title"), object.get("priority")) {
            (Some(title), Some(priority)) => {
                debug!(start, "extract_payload: found payload");
                return validate(title, priority);
            }
            (Some(_), None) => {
                missing.get_or_insert("priority");
            }
            (None, Some(_)) => {
                missing.get_or_insert("title");
            }
            (None, None) => {}
        }
    }

    debug!(?missing, "extract_payload: no payload");
    Err(missing.map_or(PayloadError::NotFound, PayloadError::MissingField))
}

/// Parse one JSON object from the start of `text`, ignoring what follows it
fn parse_object_at(text: &str) -> Option<Map<String, Value>> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Object(object))) => Some(object),
        _ => None,
    }
}

fn validate(title: &Value, priority: &Value) -> Result<AssistantResponse, PayloadError> {
    let title = title.as_str().ok_or(PayloadError::NotAString("title"))?.trim();
    if title.is_empty() {
        return Err(PayloadError::EmptyTitle);
    }

    let priority = match priority {
        Value::String(s) => serde_json::from_value::<Priority>(Value::String(s.clone()))
            .map_err(|_| PayloadError::InvalidPriority(s.clone()))?,
        other => return Err(PayloadError::InvalidPriority(other.to_string())),
    };

    Ok(AssistantResponse {
        title: title.to_string(),
        priority,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_payload() {
        let parsed = extract_payload(r#"{"title": "Buy milk", "priority": "low"}"#).unwrap();
        assert_eq!(
            parsed,
            AssistantResponse {
                title: "Buy milk".to_string(),
                priority: Priority::Low,
            }
        );
    }

    #[test]
    fn test_payload_surrounded_by_prose() {
        let reply = r#"Sure! Here is your task: {"title": "Buy milk", "priority": "low"} Let me know if you need more."#;
        let parsed = extract_payload(reply).unwrap();
        assert_eq!(parsed.title, "Buy milk");
        assert_eq!(parsed.priority, Priority::Low);
    }

    #[test]
    fn test_payload_in_code_fence() {
        let reply = "```json\n{\n  \"title\": \"File taxes\",\n  \"priority\": \"high\"\n}\n```";
        let parsed = extract_payload(reply).unwrap();
        assert_eq!(parsed.title, "File taxes");
        assert_eq!(parsed.priority, Priority::High);
    }

    #[test]
    fn test_braces_in_prose_are_skipped() {
        let reply = r#"Use {curly} braces like {"title": "Water plants", "priority": "medium"}"#;
        let parsed = extract_payload(reply).unwrap();
        assert_eq!(parsed.title, "Water plants");
    }

    #[test]
    fn test_first_matching_object_wins() {
        let reply = r#"{"note": "ignore"} {"title": "First", "priority": "high"} {"title": "Second", "priority": "low"}"#;
        let parsed = extract_payload(reply).unwrap();
        assert_eq!(parsed.title, "First");
        assert_eq!(parsed.priority, Priority::High);
    }

    #[test]
    fn test_nested_payload() {
        let reply = r#"{"task": {"title": "Book flights", "priority": "medium"}}"#;
        let parsed = extract_payload(reply).unwrap();
        assert_eq!(parsed.title, "Book flights");
        assert_eq!(parsed.priority, Priority::Medium);
    }

    #[test]
    fn test_title_is_trimmed_and_extra_fields_ignored() {
        let reply = r#"{"title": "  Email Bob  ", "priority": "low", "due": "friday"}"#;
        let parsed = extract_payload(reply).unwrap();
        assert_eq!(parsed.title, "Email Bob");
    }

    #[test]
    fn test_out_of_enum_priority_rejected() {
        let reply = r#"{"title": "Buy milk", "priority": "urgent"}"#;
        assert_eq!(
            extract_payload(reply),
            Err(PayloadError::InvalidPriority("urgent".to_string()))
        );
    }

    #[test]
    fn test_priority_is_not_coerced() {
        assert!(matches!(
            extract_payload(r#"{"title": "x", "priority": "High"}"#),
            Err(PayloadError::InvalidPriority(_))
        ));
        assert!(matches!(
            extract_payload(r#"{"title": "x", "priority": 3}"#),
            Err(PayloadError::InvalidPriority(_))
        ));
        assert!(matches!(
            extract_payload(r#"{"title": "x", "priority": null}"#),
            Err(PayloadError::InvalidPriority(_))
        ));
    }

    #[test]
    fn test_no_payload() {
        assert_eq!(extract_payload("I could not understand that."), Err(PayloadError::NotFound));
        assert_eq!(extract_payload(""), Err(PayloadError::NotFound));
    }

    #[test]
    fn test_malformed_payload() {
        assert_eq!(
            extract_payload(r#"{"title": "Buy milk", "priority": "low""#),
            Err(PayloadError::NotFound)
        );
        assert_eq!(
            extract_payload(r#"{title: Buy milk, priority: low}"#),
            Err(PayloadError::NotFound)
        );
    }

    #[test]
    fn test_missing_field() {
        assert_eq!(
            extract_payload(r#"{"title": "Buy milk"}"#),
            Err(PayloadError::MissingField("priority"))
        );
        assert_eq!(
            extract_payload(r#"{"priority": "low"}"#),
            Err(PayloadError::MissingField("title"))
        );
    }

    #[test]
    fn test_empty_or_non_string_title() {
        assert_eq!(
            extract_payload(r#"{"title": "   ", "priority": "low"}"#),
            Err(PayloadError::EmptyTitle)
        );
        assert_eq!(
            extract_payload(r#"{"title": 42, "priority": "low"}"#),
            Err(PayloadError::NotAString("title"))
        );
    }
}
