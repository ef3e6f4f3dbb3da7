use thiserror::Error;

use crate::validation::ValidationFailure;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropmodelError {
    #[error("Coercion error: cannot convert {value} to {target} for property '{property}': {reason}")]
    Coercion {
        property: String,
        target: String,
        value: String,
        reason: String,
    },
    #[error("Validation error: {}", join_failures(.0))]
    Validation(Vec<ValidationFailure>),
    #[error("Unknown property: {0}")]
    UnknownProperty(String),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PropmodelError>;

impl PropmodelError {
    /// The failures carried by a validation error, empty for every other kind.
    pub fn failures(&self) -> &[ValidationFailure] {
        match self {
            Self::Validation(failures) => failures,
            _ => &[],
        }
    }
}

fn join_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

// Helper conversions
impl From<config::ConfigError> for PropmodelError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
