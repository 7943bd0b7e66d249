use actix_web::{error::JsonPayloadError, error::QueryPayloadError, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use edualign_core::{Error as CoreError, ValidationError};
use thiserror::Error;

/// Handler failure, rendered as `{"error": message}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(v) => v.into(),
            CoreError::CollegeNotFound(_) => ApiError::NotFound(e.to_string()),
            CoreError::InsufficientCostData(_) => ApiError::BadRequest(e.to_string()),
            CoreError::InvalidConfig(_) | CoreError::Io(_) | CoreError::Serialization(_) => {
                tracing::error!(error = %e, "Internal error while handling request");
                ApiError::Internal(e.to_string())
            }
        }
    }
}

pub(crate) fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid request body: {err}")).into()
}

pub(crate) fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid query string: {err}")).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use edualign_core::ExperienceDimension;

    #[test]
    fn test_status_mapping() {
        let unknown: ApiError = CoreError::CollegeNotFound(7).into();
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

        let invalid: ApiError = CoreError::from(ValidationError::MissingDimension(
            ExperienceDimension::SocialLife,
        ))
        .into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "Missing dimension: social_life");

        let io: ApiError = CoreError::InvalidConfig("bad".to_string()).into();
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
