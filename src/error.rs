use thiserror::Error;

use crate::lang::Rule;

/// Every failure aborts the running script. The session, if one was opened,
/// is still released by the executor before the error reaches the caller.
#[derive(Debug, Error)]
pub enum WashError {
    /// Script text does not match the grammar.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Malformed or semantically invalid script construct.
    #[error("language error: {0}")]
    Language(String),

    /// Structurally valid value that breaks a runtime constraint.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Browser session could not be established or used.
    #[error("session error: {0}")]
    Session(String),

    /// Construct the evaluator does not know how to run. Internal fault, not user error.
    #[error("unsupported construct: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WashError>;

impl From<pest::error::Error<Rule>> for WashError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        WashError::Syntax(err.to_string())
    }
}

impl WashError {
    pub fn language(message: impl Into<String>) -> Self {
        WashError::Language(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        WashError::Runtime(message.into())
    }

    pub fn session(message: impl Into<String>) -> Self {
        WashError::Session(message.into())
    }
}
