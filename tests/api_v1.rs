use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tollgate::api;
use tollgate::application_impl::*;
use tollgate::application_port::AuthService;
use tollgate::domain_port::SystemClock;
use tollgate::infra_memory::{MemoryRevocationStore, MemoryUserStore};
use warp::Filter;
use warp::http::{Response, StatusCode};
use warp::hyper::body::Bytes;

fn auth_service() -> Arc<dyn AuthService> {
    let clock = Arc::new(SystemClock);
    Arc::new(RealAuthService::new(
        Arc::new(MemoryUserStore::new(clock.clone())),
        Arc::new(Argon2PasswordHasher),
        Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: "tollgate.test".to_string(),
            audience: "tollgate-client".to_string(),
            signing_key: b"api-test-signing-key-0123456789abcdef".to_vec(),
        })),
        Arc::new(MemoryRevocationStore::new(clock.clone())),
        clock,
        TokenLifetimes {
            issuer: "tollgate.test".to_string(),
            audience: "tollgate-client".to_string(),
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(3600),
        },
        AuthPolicy::default(),
    ))
}

fn api(
    service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(service))
        .recover(api::v1::recover_error)
}

fn body(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

async fn post<F>(filter: &F, path: &str, payload: Value) -> Response<Bytes>
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    warp::test::request()
        .method("POST")
        .path(path)
        .json(&payload)
        .reply(filter)
        .await
}

async fn logged_in<F>(filter: &F) -> Value
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let credentials = json!({ "identity": "alice", "secret": "correct-horse-battery" });
    let response = post(filter, "/api/v1/authentication/signup", credentials.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = post(filter, "/api/v1/authentication/login", credentials).await;
    assert_eq!(response.status(), StatusCode::OK);
    body(&response)["data"]["auth_tokens"].clone()
}

#[tokio::test]
async fn login_refresh_and_profile() {
    let filter = api(auth_service());
    let tokens = logged_in(&filter).await;

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/authentication/profile")
        .header("authorization", format!("Bearer {}", tokens["access_token"].as_str().unwrap()))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["data"]["identity"], "alice");

    let refresh = json!({ "refresh_token": tokens["refresh_token"] });
    let response = post(&filter, "/api/v1/authentication/refresh", refresh.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_ne!(body(&response)["data"]["refresh_token"], tokens["refresh_token"]);

    let response = post(&filter, "/api/v1/authentication/refresh", refresh).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&response)["error"]["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let filter = api(auth_service());
    logged_in(&filter).await;

    let response = post(
        &filter,
        "/api/v1/authentication/login",
        json!({ "identity": "alice", "secret": "wrong-secret-value" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body(&response);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let filter = api(auth_service());
    logged_in(&filter).await;

    let response = post(
        &filter,
        "/api/v1/authentication/signup",
        json!({ "identity": "alice", "secret": "another-secret-value" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body(&response)["error"]["code"], "DUPLICATE_IDENTITY");
}

#[tokio::test]
async fn logout_without_token_is_informational() {
    let filter = api(auth_service());

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/authentication/logout")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["data"]["message"], "No token provided");
}

#[tokio::test]
async fn logout_revokes_access_token() {
    let filter = api(auth_service());
    let tokens = logged_in(&filter).await;
    let bearer = format!("Bearer {}", tokens["access_token"].as_str().unwrap());

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/authentication/logout")
        .header("authorization", &bearer)
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["data"]["message"], "Logged out successfully");

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/authentication/profile")
        .header("authorization", &bearer)
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&response)["error"]["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn profile_requires_bearer_token() {
    let filter = api(auth_service());

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/authentication/profile")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&response)["error"]["code"], "MISSING_TOKEN");

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/authentication/profile")
        .header("authorization", "Bearer garbage")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&response)["error"]["code"], "MALFORMED_TOKEN");
}

#[tokio::test]
async fn invalid_body_is_bad_request() {
    let filter = api(auth_service());

    let response = post(&filter, "/api/v1/authentication/login", json!({ "identity": 42 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["error"]["code"], "INVALID_INPUT");

    let response = post(
        &filter,
        "/api/v1/authentication/signup",
        json!({ "identity": "bob", "secret": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
