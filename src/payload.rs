//! Payload assembly.
//!
//! Combines the optional free-text field with the optional extracted upload
//! into the single [`Payload`] the model client consumes.

use crate::models::{Extracted, Payload};

/// Separator placed between free text and extracted file text.
const PART_SEPARATOR: &str = "\n\n";

/// Builds the model payload from the request inputs.
///
/// An empty `input_text` counts as absent. Free text precedes file text
/// when both are present. With no input at all the result is an empty
/// text payload.
pub fn assemble(input_text: Option<&str>, file: Option<Extracted>) -> Payload {
    let input_text = input_text.filter(|t| !t.is_empty());

    let mut parts: Vec<String> = Vec::new();
    if let Some(text) = input_text {
        parts.push(text.to_string());
    }

    match file {
        Some(Extracted::Image(image)) if !parts.is_empty() => Payload::Multimodal {
            text: parts.join(PART_SEPARATOR),
            image,
        },
        Some(Extracted::Image(image)) => Payload::Image(image),
        Some(Extracted::Text(text)) => {
            parts.push(text);
            Payload::Text(parts.join(PART_SEPARATOR))
        }
        None => Payload::Text(parts.join(PART_SEPARATOR)),
    }
}
