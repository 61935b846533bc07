use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use kindred_core::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("No viewing history for user: {0}")]
    NoActivity(String),

    #[error("{0}")]
    Engine(EngineError),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::UnknownProduct(id) => ApiError::ProductNotFound(id),
            other => ApiError::Engine(other),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ProductNotFound(_) | ApiError::UserNotFound(_) | ApiError::NoActivity(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
