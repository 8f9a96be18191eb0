use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Failures surfaced to HTTP callers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Scoring model is not available")]
    ModelUnavailable,

    #[error("{0}")]
    LoadFailure(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "InvalidInput",
            ApiError::ModelUnavailable => "ModelUnavailable",
            ApiError::LoadFailure(_) => "LoadFailure",
            ApiError::Unauthorized(_) => "Unauthorized",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    kind: &'a str,
}

impl From<hybridrec_core::Error> for ApiError {
    fn from(e: hybridrec_core::Error) -> Self {
        use hybridrec_core::Error;
        match e {
            Error::InvalidInput(msg) => ApiError::InvalidInput(msg),
            Error::ModelUnavailable => ApiError::ModelUnavailable,
            other => ApiError::LoadFailure(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::ModelUnavailable | ApiError::LoadFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        })
    }
}
