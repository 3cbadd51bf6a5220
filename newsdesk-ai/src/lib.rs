//! Text services for Newsdesk
//!
//! This crate wraps the language model behind the [`TextService`] trait:
//! short summaries, trending-topic extraction, full-article summaries and
//! explanations of selected passages. A keyword [`TopicExtractor`] covers
//! topic extraction when the model is unavailable.

pub mod error;
pub mod openai;
pub mod service;
pub mod topics;

pub use error::AiError;
pub use openai::OpenAIClient;
pub use service::TextService;
pub use topics::TopicExtractor;
