use serde::{Deserialize, Serialize};

/// A single validation error or warning reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub message: String,
    /// Identifier of the rule that fired
    pub test: String,
    /// XPath of the offending node, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u64>,
}

/// Structured outcome of validating one document.
///
/// Counts come from the service as-is; a well-behaved service keeps them
/// equal to the lengths of the issue lists, but nothing here enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub error_count: u64,
    pub warning_count: u64,
    #[serde(default)]
    pub errors: Vec<Issue>,
    #[serde(default)]
    pub warnings: Vec<Issue>,
    /// Display name of the rule set the service selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    /// Whether the counts agree with the issue lists
    pub fn is_consistent(&self) -> bool {
        self.error_count == self.errors.len() as u64
            && self.warning_count == self.warnings.len() as u64
    }

    /// Process exit code for this result: the error count, saturated so a
    /// multiple of 256 never reads as success.
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.error_count).unwrap_or(u8::MAX)
    }
}
