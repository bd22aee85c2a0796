use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeatingModelError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified during scenario evaluation: {0}")]
    FailureInCalculation(#[from] ModelError),
    #[error("Error while writing outputs: {0:#}")]
    ErrorInOutput(OutputError),
}

/// Errors raised synchronously by the catalogue or the evaluator. None of these are retried:
/// evaluation is deterministic, so the same input would fail the same way.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl ModelError {
    fn kind(&self) -> &'static str {
        match self {
            ModelError::Validation(_) => "validation",
            ModelError::InvalidInput(_) => "invalid_input",
            ModelError::NotFound(_) => "not_found",
        }
    }
}

impl Serialize for ModelError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ModelError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("detail", &self.to_string())?;
        state.end()
    }
}

/// A catalogue edit that would break a technology profile invariant.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("Technology profile '{id}' is invalid: {message}")]
pub struct ValidationError {
    id: String,
    message: String,
}

impl ValidationError {
    pub(crate) fn new(id: &str, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("Invalid input: {0}")]
pub struct InvalidInputError(String);

impl InvalidInputError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A technology id that could not be resolved in the catalogue.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("Unknown technology '{id}' given as {role}")]
pub struct NotFoundError {
    id: String,
    role: &'static str,
}

impl NotFoundError {
    pub(crate) fn new(id: &str, role: &'static str) -> Self {
        Self {
            id: id.to_string(),
            role,
        }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
