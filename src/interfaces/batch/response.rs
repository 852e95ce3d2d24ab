use crate::error::ServiceError;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Body(Value),
    Error(String),
    /// Per-field validation messages.
    Errors(Vec<String>),
}

/// One output line: `{"line", "status", "body" | "error" | "errors"}`.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Response {
    pub line: usize,
    pub status: u16,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    pub fn success(line: usize, status: u16, body: Value) -> Self {
        Self {
            line,
            status,
            outcome: Outcome::Body(body),
        }
    }

    pub fn failure(line: usize, error: &ServiceError) -> Self {
        let outcome = match error {
            ServiceError::Validation(errors) => Outcome::Errors(errors.clone()),
            other => Outcome::Error(other.to_string()),
        };
        Self {
            line,
            status: error.class().status(),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Body(_))
    }
}
