use super::error::*;
use crate::application_port::{AuthService, AuthTokens, LoginInput, SignupInput};
use crate::domain_model::UserId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub identity: String,
    pub secret: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: UserId,
}

pub async fn signup(
    body: SignupRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let signup_input = SignupInput {
        identity: body.identity,
        secret: body.secret,
        display_name: body.display_name,
    };
    let user_id = auth_service
        .signup(signup_input)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(SignupResponse { user_id })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identity: String,
    pub secret: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub auth_tokens: AuthTokens,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let login_input = LoginInput {
        identity: body.identity,
        secret: body.secret,
    };
    let login_result = auth_service
        .login(login_input)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    let login_response = LoginResponse {
        user_id: login_result.user_id,
        auth_tokens: login_result.tokens,
    };
    Ok(warp::reply::json(&ApiResponse::ok(login_response)))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    body: RefreshRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let auth_tokens = auth_service
        .refresh_token(&body.refresh_token)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(auth_tokens)))
}

/// A missing bearer token is not an error here; the client is simply told so.
pub async fn logout(
    token: Option<String>,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let Some(token) = token else {
        return Ok(warp::reply::json(&ApiResponse::ok(MessageResponse {
            message: "No token provided",
        })));
    };

    auth_service
        .logout(&token)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(MessageResponse {
        message: "Logged out successfully",
    })))
}

pub async fn profile(
    token: String,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let profile = auth_service
        .profile(&token)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}
