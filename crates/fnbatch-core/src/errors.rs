//! Structured error types shared across fnbatch crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`BatchError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code, `<area>.<snake_case>` (`param.invalid_range`).
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (parameter names, dependency names, sizes).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help a schema author resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for batch input generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum BatchError {
    /// The schema document matches neither supported dialect or is malformed.
    #[error("unsupported schema: {0}")]
    Schema(ErrorInfo),
    /// A parameter has no sampling rule and no default value.
    #[error("unsupported parameter kind: {0}")]
    ParameterKind(ErrorInfo),
    /// One or more required model dependencies were not supplied.
    #[error("missing model dependency: {0}")]
    Dependency(ErrorInfo),
    /// The evenly distributed sampler was called with invalid arguments.
    #[error("invalid sampler arguments: {0}")]
    Sampler(ErrorInfo),
    /// Generator configuration is invalid.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization and deserialization errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Filesystem errors raised at the read/write boundary.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl BatchError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            BatchError::Schema(info)
            | BatchError::ParameterKind(info)
            | BatchError::Dependency(info)
            | BatchError::Sampler(info)
            | BatchError::Config(info)
            | BatchError::Serde(info)
            | BatchError::Io(info) => info,
        }
    }

    /// Shorthand for the stable error code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
