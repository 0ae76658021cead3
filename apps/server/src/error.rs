use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use givebox_core::errors::{
    AuthorizationError, DatabaseError, Error as CoreError, FieldErrors, ValidationError,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

const GENERIC_FAILURE: &str = "Internal server error";

/// Status, client-facing message and per-field errors for a core error.
///
/// Storage and unexpected failures are logged here and replaced by a generic
/// message.
pub fn classify_core(err: &CoreError) -> (StatusCode, String, Option<FieldErrors>) {
    match err {
        CoreError::Validation(ValidationError::Fields(fields)) => (
            StatusCode::BAD_REQUEST,
            "Validation failed".to_string(),
            Some(fields.clone()),
        ),
        CoreError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string(), None),
        CoreError::Unauthorized(AuthorizationError::NotAuthenticated) => {
            (StatusCode::UNAUTHORIZED, err.to_string(), None)
        }
        CoreError::Unauthorized(
            AuthorizationError::NotOrganizer | AuthorizationError::NotAdmin,
        ) => (StatusCode::FORBIDDEN, err.to_string(), None),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
        CoreError::NotFound(msg) | CoreError::Database(DatabaseError::NotFound(msg)) => {
            (StatusCode::NOT_FOUND, msg.clone(), None)
        }
        CoreError::Database(DatabaseError::UniqueViolation(msg)) => {
            (StatusCode::CONFLICT, msg.clone(), None)
        }
        CoreError::Database(_) | CoreError::Unexpected(_) => {
            tracing::error!(error = %err, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE.to_string(),
                None,
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match &self {
            ApiError::Core(e) => classify_core(e),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string(), None),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone(), None),
            ApiError::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, reason.clone(), None),
            ApiError::Internal(reason) => {
                tracing::error!(error = %reason, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_FAILURE.to_string(),
                    None,
                )
            }
            ApiError::Anyhow(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_FAILURE.to_string(),
                    None,
                )
            }
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
            errors,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Turns a body decoding failure into per-field validation errors.
///
/// Decoder messages read `<prefix>: <path>: <reason>` or mention the
/// missing field in backticks; anything else is reported under `body`.
pub fn rejected_body(detail: &str) -> CoreError {
    let detail = detail
        .rsplit_once(" at line ")
        .map_or(detail, |(head, _)| head);
    let detail = match detail.strip_prefix("Failed to deserialize") {
        Some(rest) => rest.split_once(": ").map_or(rest, |(_, tail)| tail),
        None => detail,
    };

    let mut errors = FieldErrors::new();
    if let Some(name) = detail
        .split_once("missing field `")
        .and_then(|(_, tail)| tail.split_once('`'))
        .map(|(name, _)| name)
    {
        errors.add(name, "is required");
    } else if let Some((path, reason)) = detail
        .split_once(": ")
        .filter(|(path, _)| !path.is_empty() && !path.contains(' '))
    {
        errors.add(path, reason);
    } else {
        errors.add("body", detail);
    }
    CoreError::Validation(ValidationError::Fields(errors))
}

/// `Json` whose rejection is reported as a validation error.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::Core(rejected_body(&rejection.body_text()))),
        }
    }
}
