//! Argument checks shared by the tool handlers. Pure predicates: nothing
//! is trimmed or coerced.

use crate::errors::ToolError;
use serde_json::Value;

fn invalid(msg: String) -> ToolError {
    ToolError::Validation(msg)
}

pub fn require_non_empty<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a Value, ToolError> {
    match value {
        None | Some(Value::Null) => Err(invalid(format!("{field} is required"))),
        Some(Value::String(s)) if s.is_empty() => Err(invalid(format!("{field} is required"))),
        Some(v) => Ok(v),
    }
}

pub fn require_string<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a str, ToolError> {
    require_non_empty(value, field)?
        .as_str()
        .ok_or_else(|| invalid(format!("{field} must be a string")))
}

/// Absent, null and empty strings all read as "not given".
pub fn optional_string<'a>(value: Option<&'a Value>, field: &str) -> Result<Option<&'a str>, ToolError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(invalid(format!("{field} must be a string"))),
    }
}

pub fn optional_object<'a>(value: Option<&'a Value>, field: &str) -> Result<Option<&'a Value>, ToolError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Object(_)) => Ok(Some(v)),
        Some(_) => Err(invalid(format!("{field} must be an object"))),
    }
}

pub fn optional_array<'a>(value: Option<&'a Value>, field: &str) -> Result<Option<&'a Value>, ToolError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Array(_)) => Ok(Some(v)),
        Some(_) => Err(invalid(format!("{field} must be an array"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(err: ToolError) -> String {
        match err {
            ToolError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn required_rejects_absent_null_and_empty() {
        assert_eq!(message(require_non_empty(None, "query").unwrap_err()), "query is required");
        assert_eq!(message(require_non_empty(Some(&Value::Null), "query").unwrap_err()), "query is required");
        assert_eq!(message(require_string(Some(&json!("")), "query").unwrap_err()), "query is required");
    }

    #[test]
    fn required_string_rejects_other_types() {
        assert_eq!(message(require_string(Some(&json!(42)), "pageId").unwrap_err()), "pageId must be a string");
        assert_eq!(require_string(Some(&json!("abc")), "pageId").unwrap(), "abc");
    }

    #[test]
    fn whitespace_is_not_trimmed() {
        assert_eq!(require_string(Some(&json!("  ")), "title").unwrap(), "  ");
    }

    #[test]
    fn optional_values() {
        assert_eq!(optional_string(Some(&json!("")), "parentId").unwrap(), None);
        assert!(optional_string(Some(&json!(1)), "parentId").is_err());
        assert!(optional_object(Some(&json!([])), "filter").is_err());
        assert!(optional_array(Some(&json!({})), "sorts").is_err());
        assert!(optional_array(Some(&json!([{"property": "Name"}])), "sorts").unwrap().is_some());
    }
}
