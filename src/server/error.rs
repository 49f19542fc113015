use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::auth::AuthError;
use crate::show_store::ShowStoreError;

use super::metrics::record_error;

pub const SHOW_EXISTS_DETAIL: &str = "Show already exists with given show_id.";
pub const SHOW_NOT_FOUND_DETAIL: &str = "Show not found.";
pub const CREDENTIALS_DETAIL: &str = "Could not validate credentials";
const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    Unauthorized(String),
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized(CREDENTIALS_DETAIL.to_string())
    }
}

impl From<ShowStoreError> for ApiError {
    fn from(err: ShowStoreError) -> Self {
        match err {
            ShowStoreError::InvalidParameter(msg) => ApiError::BadRequest(msg),
            ShowStoreError::Conflict(_) => ApiError::BadRequest(SHOW_EXISTS_DETAIL.to_string()),
            ShowStoreError::NotFound(_) => ApiError::NotFound,
            ShowStoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UnknownIdentity => ApiError::Unauthorized(err.to_string()),
            AuthError::InvalidToken(ref e) => {
                debug!("Token rejected: {}", e);
                ApiError::unauthorized()
            }
            AuthError::Signing(e) => ApiError::Internal(e.to_string()),
            AuthError::ExpiryOutOfRange => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(detail) => {
                record_error("bad_request");
                (StatusCode::BAD_REQUEST, Json(ErrorBody { detail: &detail })).into_response()
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    detail: SHOW_NOT_FOUND_DETAIL,
                }),
            )
                .into_response(),
            ApiError::Unauthorized(detail) => {
                record_error("unauthorized");
                (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    Json(ErrorBody { detail: &detail }),
                )
                    .into_response()
            }
            ApiError::Internal(cause) => {
                error!("Internal error: {}", cause);
                record_error("internal");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        detail: INTERNAL_ERROR_DETAIL,
                    }),
                )
                    .into_response()
            }
        }
    }
}
