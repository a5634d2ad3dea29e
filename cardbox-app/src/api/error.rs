use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cardbox_core::{CoreError, FieldError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status_code: u16,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<FieldError>,
}

#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// Body or path segment that does not parse into the expected shape.
    BadInput(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadInput(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail, extra) = match self {
            ApiError::Core(CoreError::NotFound(label)) => {
                (StatusCode::NOT_FOUND, format!("{label} is not found"), vec![])
            }
            ApiError::Core(CoreError::Uniqueness { message }) => {
                (StatusCode::BAD_REQUEST, message, vec![])
            }
            ApiError::Core(CoreError::ForeignKey { message, key }) => (
                StatusCode::BAD_REQUEST,
                format!("Foreign key violation on {key}"),
                vec![FieldError { key, message }],
            ),
            ApiError::Core(CoreError::Validation(fields)) => {
                (StatusCode::BAD_REQUEST, "Validation failed".to_string(), fields)
            }
            ApiError::Core(CoreError::Storage(context)) => {
                tracing::error!(context, "request failed on storage");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    vec![],
                )
            }
            ApiError::BadInput(detail) => (StatusCode::BAD_REQUEST, detail, vec![]),
        };

        let body = Json(ErrorBody {
            status_code: status.as_u16(),
            detail,
            extra,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn maps_taxonomy_to_statuses() {
        assert_eq!(status_of(CoreError::NotFound("Deck")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(CoreError::Uniqueness { message: "dup".into() }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::ForeignKey {
                message: "missing".into(),
                key: "deck_id".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::invalid("name", "field required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::Storage("list")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
