use actix_web::{http::StatusCode, HttpResponse};
use lembra_api_structs::status::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LembraError {
    #[error("Internal server error")]
    InternalError,
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("Unauthorized request. Error message: `{0}`")]
    Unauthorized(String),
    #[error("Forbidden request. Error message: `{0}`")]
    Forbidden(String),
    #[error("404 Not found. Error message: `{0}`")]
    NotFound(String),
    #[error("More than one event matched. Error message: `{0}`")]
    AmbiguousIdentifier(String),
    #[error("Invalid status transition. Error message: `{0}`")]
    InvalidTransition(String),
    #[error("Messaging provider unavailable. Error message: `{0}`")]
    ProviderUnavailable(String),
    #[error("LLM unavailable. Error message: `{0}`")]
    LlmUnavailable(String),
    #[error("Database unavailable. Error message: `{0}`")]
    DbUnavailable(String),
    #[error("Operation timed out. Error message: `{0}`")]
    Timeout(String),
}

impl LembraError {
    /// Stable machine-readable code carried in the response body
    fn code(&self) -> &'static str {
        match self {
            Self::InternalError => "internal",
            Self::BadClientData(_) => "invalid_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::AmbiguousIdentifier(_) => "ambiguous_identifier",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::LlmUnavailable(_) => "llm_unavailable",
            Self::DbUnavailable(_) => "db_unavailable",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl actix_web::error::ResponseError for LembraError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadClientData(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AmbiguousIdentifier(_) => StatusCode::CONFLICT,
            Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::LlmUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DbUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code().into(),
            message: self.to_string(),
        })
    }
}
