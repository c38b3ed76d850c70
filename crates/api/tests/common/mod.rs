#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use casebox_api::auth::jwt::{generate_access_token, JwtConfig};
use casebox_api::config::ServerConfig;
use casebox_api::engine::CaseOpeningEngine;
use casebox_api::routes;
use casebox_api::state::AppState;
use casebox_core::random::{FixedDraw, RandomSource};
use casebox_core::types::{DbId, Money};
use casebox_db::models::boost::CreateBoostOption;
use casebox_db::models::case::{CreateCase, CreatePrize, RewardType};
use casebox_db::models::user::CreateUser;
use casebox_db::repositories::{BoostRepo, CaseRepo, LedgerRepo, UserRepo};

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and a known JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with a draw fixed at `0.7`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(FixedDraw::new(0.7)))
}

/// Build the full application router with all middleware layers, using the
/// given database pool and random source.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack production uses.
pub fn build_test_app_with(pool: PgPool, random: Arc<dyn RandomSource>) -> Router {
    let config = test_config();

    let state = AppState {
        engine: Arc::new(CaseOpeningEngine::new(pool.clone(), random)),
        pool,
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Mint a valid access token for `user_id`.
pub fn token_for(user_id: DbId) -> String {
    generate_access_token(user_id, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request, optionally authenticated.
pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a POST request with a JSON body, optionally authenticated.
pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    post_raw(app, uri, token, body.to_string()).await
}

/// Send a POST request whose body is sent verbatim as `application/json`.
pub async fn post_raw(app: Router, uri: &str, token: Option<&str>, body: String) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a user funded with `balance` through a ledger deposit.
pub async fn funded_user(pool: &PgPool, username: &str, balance: i64) -> DbId {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
        },
    )
    .await
    .unwrap();
    if balance > 0 {
        LedgerRepo::deposit(pool, user.id, Money::from(balance), "Initial deposit")
            .await
            .unwrap();
    }
    user.id
}

/// Create an active case priced at `price` with currency prizes of the given
/// `(name, base_chance)` in order. Returns the case id and prize ids.
pub async fn case_with_prizes(
    pool: &PgPool,
    price: i64,
    prizes: &[(&str, f64)],
) -> (DbId, Vec<DbId>) {
    let case = CaseRepo::create(
        pool,
        &CreateCase {
            name: "Test case".to_string(),
            base_price: Money::from(price),
            is_active: None,
            timer_ends_at: None,
        },
    )
    .await
    .unwrap();

    let mut prize_ids = Vec::with_capacity(prizes.len());
    for (order, (name, chance)) in prizes.iter().enumerate() {
        let prize = CaseRepo::add_prize(
            pool,
            case.id,
            &CreatePrize {
                name: name.to_string(),
                base_chance: *chance,
                reward_type: RewardType::Currency,
                reward_amount: Some(Money::from(10)),
                product_id: None,
                duration_days: None,
                sell_value: None,
                sort_order: Some(order as i32),
            },
        )
        .await
        .unwrap();
        prize_ids.push(prize.id);
    }
    (case.id, prize_ids)
}

/// Register a default catalog boost.
pub async fn default_boost(pool: &PgPool, key: &str, cost_delta: i64, chance_multiplier: f64) {
    BoostRepo::create(
        pool,
        &CreateBoostOption {
            key: key.to_string(),
            name: key.to_string(),
            cost_delta: Money::from(cost_delta),
            chance_multiplier,
        },
    )
    .await
    .unwrap();
}

/// Current stored balance of a user.
pub async fn balance_of(pool: &PgPool, user_id: DbId) -> Money {
    UserRepo::find_by_id(pool, user_id)
        .await
        .unwrap()
        .unwrap()
        .balance
}
