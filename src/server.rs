//! HTTP server.
//!
//! Exposes the validation pipeline as a multipart form endpoint.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/validate` | Score an uploaded document and/or free text |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one shape:
//!
//! ```json
//! { "error": "Provide either input_text or file." }
//! ```
//!
//! | Status | Cause |
//! |--------|-------|
//! | 400 | no usable input, or a malformed multipart body |
//! | 415 | unsupported file type, unreadable PDF, non-UTF-8 text file |
//! | 500 | any other processing failure |
//!
//! Model failures are not errors: a degraded verdict is still a `200`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::extract::{extract_upload, ExtractError};
use crate::models::ValidationResult;
use crate::payload::assemble;
use crate::validator::{OpenAiValidator, RequirementsModel, Verdict};

/// Shared application state passed to route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn RequirementsModel>,
}

impl AppState {
    pub fn new(model: Arc<dyn RequirementsModel>) -> Self {
        Self { model }
    }
}

/// Starts the HTTP server.
///
/// Builds an [`OpenAiValidator`] from `[model]`, binds to `[server].bind`,
/// and serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let api_key = config.model.api_key();
    if api_key.is_none() {
        tracing::warn!(
            env = %config.model.api_key_env,
            "no API key configured; every validation will report a model call failure"
        );
    }
    let validator = OpenAiValidator::new(config.model.clone(), api_key)?;
    let app = router(AppState::new(Arc::new(validator)), &config.server);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        model = %config.model.model,
        "requirement validator listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the router with CORS, tracing, and the configured body limit.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = match server.max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/validate", post(handle_validate))
        .route("/health", get(handle_health))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Errors ============

/// Request-level failures of the validation pipeline.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("Provide either input_text or file.")]
    MissingInput,
    #[error("{0}")]
    Multipart(String),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("Server error: {0}")]
    Internal(String),
}

impl ValidateError {
    pub fn status(&self) -> StatusCode {
        match self {
            ValidateError::MissingInput | ValidateError::Multipart(_) => StatusCode::BAD_REQUEST,
            ValidateError::Extract(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ValidateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ValidateError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// ============ Pipeline ============

/// An uploaded file as read from the form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Runs extract → assemble → validate for one submission.
///
/// Shared by the HTTP handler and the `check` CLI command.
pub async fn validate_submission(
    model: &dyn RequirementsModel,
    input_text: Option<&str>,
    upload: Option<Upload>,
) -> Result<Verdict, ValidateError> {
    let input_text = input_text.filter(|t| !t.is_empty());
    if input_text.is_none() && upload.is_none() {
        return Err(ValidateError::MissingInput);
    }

    let extracted = match upload {
        Some(Upload { filename, bytes }) => {
            let extracted = tokio::task::spawn_blocking(move || extract_upload(&filename, bytes))
                .await
                .map_err(|e| ValidateError::Internal(e.to_string()))?;
            Some(extracted?)
        }
        None => None,
    };

    let payload = assemble(input_text, extracted);
    let verdict = model.validate(&payload).await;

    match &verdict {
        Verdict::Parsed(result) => {
            tracing::info!(
                model = model.model_name(),
                kind = payload.kind(),
                score = result.score,
                "validation complete"
            )
        }
        Verdict::Unparseable { reason } => {
            tracing::warn!(kind = payload.kind(), %reason, "model reply could not be parsed")
        }
        Verdict::CallFailed { reason } => {
            tracing::warn!(kind = payload.kind(), %reason, "model call failed")
        }
    }

    Ok(verdict)
}

// ============ POST /validate ============

#[derive(Debug, Default)]
struct ValidateForm {
    input_text: Option<String>,
    file: Option<Upload>,
}

/// Reads the `input_text` and `file` fields; other fields are ignored.
/// A file part with neither a filename nor content counts as absent.
async fn read_form(mut multipart: Multipart) -> Result<ValidateForm, ValidateError> {
    let mut form = ValidateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ValidateError::Multipart(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("input_text") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ValidateError::Multipart(e.to_string()))?;
                form.input_text = Some(text);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ValidateError::Multipart(e.to_string()))?;
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.file = Some(Upload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Handler for `POST /validate`.
///
/// A request that is not multipart at all carries no readable fields and is
/// treated as empty input.
async fn handle_validate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ValidationResult>, ValidateError> {
    let form = match multipart {
        Ok(multipart) => read_form(multipart).await?,
        Err(_) => ValidateForm::default(),
    };

    let result = validate_submission(state.model.as_ref(), form.input_text.as_deref(), form.file)
        .await
        .inspect_err(|e| tracing::info!(status = %e.status(), error = %e, "request rejected"))?;

    Ok(Json(result.into_result()))
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses() {
        assert_eq!(ValidateError::MissingInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ValidateError::Extract(ExtractError::UnsupportedFileType).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ValidateError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_messages_pass_through() {
        assert_eq!(
            ValidateError::MissingInput.to_string(),
            "Provide either input_text or file."
        );
        assert_eq!(
            ValidateError::Extract(ExtractError::UnsupportedFileType).to_string(),
            "Unsupported file type."
        );
    }
}
