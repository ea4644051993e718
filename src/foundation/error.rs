/// Convenience result type used across cuegen.
pub type CuegenResult<T> = Result<T, CuegenError>;

/// Top-level error taxonomy used by extractor, protocol and synthesizer APIs.
#[derive(thiserror::Error, Debug)]
pub enum CuegenError {
    /// Source file unreadable or malformed. Surfaced to the caller, never retried.
    #[error("load error: {0}")]
    Load(String),

    /// Update payload unparsable after every lenient-recovery step.
    #[error("parse error: {0}")]
    Parse(String),

    /// A single typed accessor rejected a write.
    #[error("property write error on '{name}': {message}")]
    PropertyWrite {
        /// Canonical (or literal, when unresolved) property name.
        name: String,
        /// Accessor failure message.
        message: String,
    },

    /// Invalid user-provided options or schema data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Document template failed to render.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CuegenError {
    /// Build a [`CuegenError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`CuegenError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`CuegenError::PropertyWrite`] value.
    pub fn property_write(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PropertyWrite {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Build a [`CuegenError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CuegenError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CuegenError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CuegenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
