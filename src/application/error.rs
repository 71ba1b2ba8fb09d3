use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{domain::error::DomainError, infra::error::InfraError};

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failures talking to the remote content API.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content endpoint is not configured")]
    MissingEndpoint,
    #[error("content endpoint is invalid: {reason}")]
    InvalidEndpoint { reason: String },
    #[error("content request failed: {source}")]
    Transport {
        #[source]
        source: BoxError,
    },
    #[error("content API responded with status {status}")]
    Status { status: u16, body: String },
    #[error("failed to encode `{operation}` request")]
    Encode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode `{operation}` response")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ContentError {
    pub fn transport(source: impl Into<BoxError>) -> Self {
        Self::Transport {
            source: source.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ContentError::MissingEndpoint | ContentError::InvalidEndpoint { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("resource not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Domain(DomainError::Validation { .. }) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Content(content) if content.is_configuration() => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Content(_) => StatusCode::BAD_GATEWAY,
            AppError::Infra(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::NotFound => "Resource not found",
            AppError::Domain(DomainError::Validation { .. }) | AppError::Validation(_) => {
                "Request could not be processed"
            }
            AppError::Content(content) if content.is_configuration() => "Service misconfigured",
            AppError::Content(_) => "Content service unavailable",
            AppError::Infra(InfraError::Bind { .. }) => "Listener could not be opened",
            AppError::Infra(InfraError::HttpClient(_)) => "Content client could not start",
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Io(_)) => "Server I/O failure",
            AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_endpoint_is_a_server_misconfiguration() {
        let error = AppError::from(ContentError::MissingEndpoint);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.presentation_message(), "Service misconfigured");

        let error = AppError::from(ContentError::InvalidEndpoint {
            reason: "unsupported scheme `ftp`".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let error = AppError::from(ContentError::Status {
            status: 503,
            body: "maintenance".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn report_collects_the_source_chain() {
        let decode = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let error = ContentError::Decode {
            operation: "getAllPosts",
            source: decode,
        };
        let report = ErrorReport::from_error("test", StatusCode::BAD_GATEWAY, &error);
        assert_eq!(report.messages.len(), 2);
        assert!(report.messages[0].contains("getAllPosts"));
    }
}
