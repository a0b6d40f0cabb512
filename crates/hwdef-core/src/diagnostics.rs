//! Non-fatal problems collected while parsing a board

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Referenced file does not exist
    MissingFile,
    /// File exists but could not be read
    UnreadableFile,
    /// Include nesting exceeded the configured depth
    IncludeDepth,
    /// `include` line without a path
    MalformedInclude,
    /// Wrong arity or non-numeric value where a number was expected
    MalformedDirective,
    /// A PWM output number defined more than once
    DuplicateOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}
