use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::budget::{QuotaError, QuotaServiceError};
use crate::workflows::snapshot::SnapshotImportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Snapshot(SnapshotImportError),
    Quota(QuotaServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Snapshot(err) => write!(f, "snapshot error: {}", err),
            AppError::Quota(err) => write!(f, "quota error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Snapshot(err) => Some(err),
            AppError::Quota(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Quota(QuotaServiceError::Quota(QuotaError::InvalidInput(_))) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Quota(QuotaServiceError::Quota(QuotaError::NotFound { .. })) => {
                StatusCode::NOT_FOUND
            }
            AppError::Quota(QuotaServiceError::Quota(QuotaError::Unavailable { .. })) => {
                StatusCode::CONFLICT
            }
            AppError::Quota(QuotaServiceError::Quota(QuotaError::TemplateMissing { .. })) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Snapshot(_) => StatusCode::BAD_REQUEST,
            AppError::Quota(QuotaServiceError::Store(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<SnapshotImportError> for AppError {
    fn from(value: SnapshotImportError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<QuotaServiceError> for AppError {
    fn from(value: QuotaServiceError) -> Self {
        Self::Quota(value)
    }
}

impl From<QuotaError> for AppError {
    fn from(value: QuotaError) -> Self {
        Self::Quota(QuotaServiceError::Quota(value))
    }
}
