//! Tool outcome model.
//!
//! Every tool call ends in a [`ToolOutcome`]: a display text, an optional
//! structured payload and an error flag. Error outcomes never carry a payload.

use crate::error::{DbError, DbResult};
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub text: String,
    pub data: Option<JsonValue>,
    pub is_error: bool,
}

impl ToolOutcome {
    /// Successful outcome with no structured payload.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
            is_error: false,
        }
    }

    /// Successful outcome carrying a structured payload.
    pub fn with_data(text: impl Into<String>, data: &impl Serialize) -> DbResult<Self> {
        let data = serde_json::to_value(data)
            .map_err(|e| DbError::internal(format!("Failed to serialize result: {}", e)))?;
        Ok(Self {
            text: text.into(),
            data: Some(data),
            is_error: false,
        })
    }

    /// Error outcome. The display text is the error message.
    pub fn error(err: &DbError) -> Self {
        Self {
            text: err.to_string(),
            data: None,
            is_error: true,
        }
    }

    /// Collapse a handler result into an outcome, logging failures.
    pub fn from_result(tool: &str, result: DbResult<ToolOutcome>) -> Self {
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    tool = tool,
                    error = %err,
                    sql_state = ?err.sql_state(),
                    "Tool call failed"
                );
                Self::error(&err)
            }
        }
    }

    /// Convert into the MCP wire result.
    pub fn into_call_tool_result(self) -> CallToolResult {
        let content = vec![Content::text(self.text)];
        if self.is_error {
            return CallToolResult::error(content);
        }
        let mut result = CallToolResult::success(content);
        result.structured_content = self.data;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_outcome_has_no_payload() {
        let outcome = ToolOutcome::error(&DbError::NotConnected);
        assert!(outcome.is_error);
        assert!(outcome.data.is_none());
        assert_eq!(
            outcome.text,
            "Not connected to database. Use connect tool first."
        );
    }

    #[test]
    fn test_from_result_converts_errors() {
        let outcome = ToolOutcome::from_result(
            "execute_query",
            Err(DbError::invalid_input("Query cannot be empty")),
        );
        assert!(outcome.is_error);
        assert_eq!(outcome.text, "Query cannot be empty");
    }

    #[test]
    fn test_call_tool_result_error_flag() {
        let result = ToolOutcome::error(&DbError::NotConnected).into_call_tool_result();
        assert_eq!(result.is_error, Some(true));
        assert!(result.structured_content.is_none());
    }

    #[test]
    fn test_call_tool_result_carries_payload() {
        let outcome = ToolOutcome::with_data("Found 1 databases:\n", &vec!["a"]).unwrap();
        let result = outcome.into_call_tool_result();
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content, Some(serde_json::json!(["a"])));
    }
}
