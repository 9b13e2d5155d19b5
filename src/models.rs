//! Core data models used throughout the validator.
//!
//! These types represent the extracted upload, the payload sent to the
//! model, and the verdict that flows back to the HTTP caller.

use serde::Serialize;

/// Content recovered from an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// Plain text (from `.txt` or `.pdf`).
    Text(String),
    /// An image encoded as a `data:` URI.
    Image(String),
}

/// The unit of work sent to the model for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Image(String),
    Multimodal { text: String, image: String },
}

impl Payload {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Image(_) => "image",
            Payload::Multimodal { .. } => "multimodal",
        }
    }
}

/// The verdict body returned to the caller on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Overall quality score in `0..=100`.
    pub score: u8,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}
