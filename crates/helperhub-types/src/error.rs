use thiserror::Error;

/// A stored list column could not be decoded.
#[derive(Debug, Error)]
#[error("stored {element} list is malformed: {source}")]
pub struct FormatError {
    pub element: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// A request payload failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("no fields to update")]
    NothingToUpdate,
}
