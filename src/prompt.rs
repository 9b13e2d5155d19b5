//! Chat message construction for the validation request.
//!
//! Every request carries two user messages: the document itself (text,
//! image, or both) followed by [`VALIDATION_PROMPT`] with the document
//! rendering appended.

use serde::Serialize;

use crate::models::Payload;

/// Fixed instructions sent with every document.
pub const VALIDATION_PROMPT: &str = "You are a Requirements Validator. Do NOT use markdown or code blocks. Respond ONLY with valid JSON.
Check the following requirements document and provide a JSON object with exactly these keys:
{
  \"score\": int (0-100),
  \"issues\": list of strings,
  \"suggestions\": list of strings
}
- Check if acceptance criteria are mentioned.
- Detect conflicting statements.
- Check if design is attached and referenced.
- Identify dependencies (API, data, third-party) mentioned.

Here is the requirements document:
";

const PROMPT_TRAILER: &str = "\n\nReturn JSON ONLY, no explanations, no markdown, no backticks.";

const IMAGE_LEAD: &str = "Please extract text from this image and validate requirements:";
const MULTIMODAL_LEAD: &str = "Validate the following requirements document:\nText:\n";
const ATTACHED_IMAGE: &str = "[attached image]";

/// One OpenAI-style chat message.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

/// Message content: a bare string or a list of typed parts.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

impl ContentPart {
    fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    fn image(url: &str) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.to_string(),
            },
        }
    }
}

fn user(content: MessageContent) -> ChatMessage {
    ChatMessage {
        role: "user",
        content,
    }
}

/// Builds the message list for one payload. The list always ends with the
/// instruction prompt.
pub fn build_messages(payload: &Payload) -> Vec<ChatMessage> {
    let document = match payload {
        Payload::Text(text) => user(MessageContent::Text(text.clone())),
        Payload::Image(uri) => user(MessageContent::Parts(vec![
            ContentPart::text(IMAGE_LEAD),
            ContentPart::image(uri),
        ])),
        Payload::Multimodal { text, image } => user(MessageContent::Parts(vec![
            ContentPart::text(format!("{}{}", MULTIMODAL_LEAD, text)),
            ContentPart::image(image),
        ])),
    };

    vec![document, user(MessageContent::Text(instruction(payload)))]
}

/// The instruction prompt with the document rendered inline. Images are
/// referenced rather than repeated, since they already travel as a part.
fn instruction(payload: &Payload) -> String {
    let rendered = match payload {
        Payload::Text(text) => text.clone(),
        Payload::Image(_) => ATTACHED_IMAGE.to_string(),
        Payload::Multimodal { text, .. } => format!("{}\n{}", text, ATTACHED_IMAGE),
    };
    format!("{}{}{}", VALIDATION_PROMPT, rendered, PROMPT_TRAILER)
}
