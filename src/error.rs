use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("External API error: {0}")]
    ExternalAPI(String),
}

/// Recoverable conditions raised inside the decoding core. None of these
/// cross a public decode boundary; they are reported to a sink and the value
/// falls back to `fallback_value()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed hex input: {input:?}")]
    MalformedHex { input: String },

    #[error("decoded value exceeds the displayable range")]
    OutOfRange,

    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("numeric cell {value} is not an exact unsigned integer")]
    InexactNumber { value: String },

    #[error("field repeats {kept} with different case; ignored")]
    DuplicateField { kept: String },
}

impl DecodeError {
    /// Value a fail-closed decode returns for this condition. Saturating on
    /// overflow keeps decoding monotone in the input.
    pub fn fallback_value(&self) -> Decimal {
        match self {
            DecodeError::OutOfRange => Decimal::MAX,
            DecodeError::MalformedHex { .. }
            | DecodeError::InvalidCalibration(_)
            | DecodeError::InexactNumber { .. }
            | DecodeError::DuplicateField { .. } => Decimal::ZERO,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::ExternalAPI(ref msg) => {
                (StatusCode::BAD_GATEWAY, "QUERY_SERVICE_ERROR", msg.clone())
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
