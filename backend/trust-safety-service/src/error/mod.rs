use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrustSafetyError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("The {content_type} content was flagged as inappropriate and cannot be published.")]
    ContentRejected {
        content_type: String,
        flagged_categories: Vec<String>,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged_categories: Option<Vec<String>>,
}

impl ResponseError for TrustSafetyError {
    fn status_code(&self) -> StatusCode {
        match self {
            TrustSafetyError::InvalidInput(_) | TrustSafetyError::ContentRejected { .. } => {
                StatusCode::BAD_REQUEST
            }
            TrustSafetyError::Forbidden(_) => StatusCode::FORBIDDEN,
            TrustSafetyError::Http(_)
            | TrustSafetyError::Classifier(_)
            | TrustSafetyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        let body = match self {
            TrustSafetyError::InvalidInput(msg) | TrustSafetyError::Forbidden(msg) => {
                ErrorResponse {
                    error: msg.clone(),
                    code: code.as_u16(),
                    reason: None,
                    flagged_categories: None,
                }
            }
            TrustSafetyError::ContentRejected {
                flagged_categories,
                ..
            } => ErrorResponse {
                error: self.to_string(),
                code: code.as_u16(),
                reason: Some(
                    "Content moderation detected potentially harmful or inappropriate material."
                        .to_string(),
                ),
                flagged_categories: Some(flagged_categories.clone()),
            },
            other => {
                tracing::error!(error = %other, "Request failed");
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    code: code.as_u16(),
                    reason: None,
                    flagged_categories: None,
                }
            }
        };

        HttpResponse::build(code).json(body)
    }
}

impl From<validator::ValidationErrors> for TrustSafetyError {
    fn from(err: validator::ValidationErrors) -> Self {
        TrustSafetyError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrustSafetyError>;
