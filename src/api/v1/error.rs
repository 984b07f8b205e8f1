use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, error) = if let Some(rejection) = err.find::<ApiRejection>() {
        (rejection.code.status(), rejection.to_api_error())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            ApiError {
                code: ApiErrorCode::InvalidInput,
                message: e.to_string(),
            },
        )
    } else if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ApiError {
                code: ApiErrorCode::NotFound,
                message: ApiErrorCode::NotFound.to_string(),
            },
        )
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ApiError {
                code: ApiErrorCode::NotFound,
                message: "Method not allowed".to_string(),
            },
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError {
                code: ApiErrorCode::InternalError,
                message: format!("Unhandled error: {:?}", err),
            },
        )
    };

    let json = warp::reply::json(&ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(error),
    });
    Ok(warp::reply::with_status(json, status))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Identity already registered")]
    DuplicateIdentity,
    #[error("Token is malformed")]
    MalformedToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Wrong token type")]
    WrongTokenType,
    #[error("Token has been revoked")]
    TokenRevoked,
    #[error("Refresh token already used")]
    TokenAlreadyRotated,
    #[error("No token provided")]
    MissingToken,
    #[error("Invalid input")]
    InvalidInput,
    #[error("Not found")]
    NotFound,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::MalformedToken
            | ApiErrorCode::TokenExpired
            | ApiErrorCode::WrongTokenType
            | ApiErrorCode::TokenRevoked
            | ApiErrorCode::TokenAlreadyRotated
            | ApiErrorCode::MissingToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::DuplicateIdentity => StatusCode::CONFLICT,
            ApiErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Rejection carried through warp filters until [`recover_error`] renders it.
#[derive(Debug, Clone)]
pub struct ApiRejection {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiRejection {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiRejection {
        warn!("Internal error: {}", error);
        ApiRejection::from(ApiErrorCode::InternalError)
    }

    fn to_api_error(&self) -> ApiError {
        ApiError {
            code: self.code,
            message: self.message.clone(),
        }
    }
}

impl reject::Reject for ApiRejection {}

impl From<ApiErrorCode> for ApiRejection {
    fn from(code: ApiErrorCode) -> Self {
        ApiRejection {
            code,
            message: code.to_string(),
        }
    }
}

impl From<AuthError> for ApiRejection {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials.into(),
            AuthError::DuplicateIdentity => ApiErrorCode::DuplicateIdentity.into(),
            AuthError::MalformedToken => ApiErrorCode::MalformedToken.into(),
            AuthError::TokenExpired => ApiErrorCode::TokenExpired.into(),
            AuthError::WrongTokenType => ApiErrorCode::WrongTokenType.into(),
            AuthError::TokenRevoked => ApiErrorCode::TokenRevoked.into(),
            AuthError::TokenAlreadyRotated => ApiErrorCode::TokenAlreadyRotated.into(),
            AuthError::MissingToken => ApiErrorCode::MissingToken.into(),
            AuthError::InvalidInput(message) => ApiRejection {
                code: ApiErrorCode::InvalidInput,
                message,
            },
            AuthError::Store(e) => ApiRejection::internal(e),
            AuthError::InternalError(e) => ApiRejection::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_are_unauthorized() {
        for error in [
            AuthError::InvalidCredentials,
            AuthError::MalformedToken,
            AuthError::TokenExpired,
            AuthError::WrongTokenType,
            AuthError::TokenRevoked,
            AuthError::TokenAlreadyRotated,
            AuthError::MissingToken,
        ] {
            let rejection = ApiRejection::from(error.clone());
            assert_eq!(rejection.code.status(), StatusCode::UNAUTHORIZED, "{error}");
        }
    }

    #[test]
    fn infrastructure_detail_is_not_leaked() {
        let rejection = ApiRejection::from(AuthError::Store("connection refused".to_string()));
        assert_eq!(rejection.code, ApiErrorCode::InternalError);
        assert!(!rejection.message.contains("connection refused"));
    }

    #[test]
    fn input_errors_keep_their_detail() {
        let rejection = ApiRejection::from(AuthError::InvalidInput("secret too short".to_string()));
        assert_eq!(rejection.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(rejection.message, "secret too short");
    }

    #[test]
    fn codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&ApiErrorCode::TokenAlreadyRotated).unwrap();
        assert_eq!(json, "\"TOKEN_ALREADY_ROTATED\"");
    }
}
