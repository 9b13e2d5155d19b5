//! # Requirement Validator
//!
//! An HTTP service that scores software requirements documents with a
//! chat-completion model.
//!
//! A caller posts free text and/or a document (`.txt`, `.pdf`, `.png`,
//! `.jpg`, `.jpeg`). The service extracts the content, sends it to the
//! model with a fixed evaluation prompt, and returns a verdict:
//!
//! ```json
//! { "score": 64, "issues": ["..."], "suggestions": ["..."] }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐
//! │  Upload  │──▶│ Extract  │──▶│ Assemble │──▶│ Validator │──▶ verdict
//! │ (axum)   │   │ txt/pdf/ │   │ payload  │   │ (chat API)│
//! └──────────┘   │ image    │   └──────────┘   └───────────┘
//!                └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=...
//! reqval serve                          # POST /validate on 0.0.0.0:8000
//! reqval check ./srs.pdf --text "v2"    # one-off validation from the shell
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Upload classification and text extraction |
//! | [`payload`] | Payload assembly |
//! | [`prompt`] | Chat message construction |
//! | [`validator`] | Model client and verdict parsing |
//! | [`server`] | HTTP server |

pub mod config;
pub mod extract;
pub mod models;
pub mod payload;
pub mod prompt;
pub mod server;
pub mod validator;
