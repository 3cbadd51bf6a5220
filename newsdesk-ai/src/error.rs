//! Error types for text services

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AiError {
    pub fn api(msg: impl Into<String>) -> Self {
        AiError::Api(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        AiError::Parse(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AiError::Internal(msg.into())
    }
}
