use super::error::*;
use super::handler;
use crate::application_port::AuthService;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Routes under `authentication/`. Mount behind `api/v1` and finish with
/// [`super::recover_error`].
pub fn routes(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let signup = warp::post()
        .and(warp::path("signup"))
        .and(warp::path::end())
        .and(json_body())
        .and(with(auth_service.clone()))
        .and_then(handler::signup);

    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(json_body())
        .and(with(auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(json_body())
        .and(with(auth_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(optional_bearer())
        .and(with(auth_service.clone()))
        .and_then(handler::logout);

    let profile = warp::get()
        .and(warp::path("profile"))
        .and(warp::path::end())
        .and(required_bearer())
        .and(with(auth_service))
        .and_then(handler::profile);

    warp::path("authentication").and(signup.or(login).or(refresh).or(logout).or(profile))
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Token from `Authorization: Bearer <token>`, or `None` if absent or not a bearer header.
pub(crate) fn bearer_token(header: Option<&str>) -> Option<String> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

fn optional_bearer() -> impl Filter<Extract = (Option<String>,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>(http::header::AUTHORIZATION.as_str())
        .map(|header: Option<String>| bearer_token(header.as_deref()))
}

fn required_bearer() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    optional_bearer().and_then(|token: Option<String>| async move {
        token.ok_or_else(|| reject::custom(ApiRejection::from(ApiErrorCode::MissingToken)))
    })
}
