//! Shared harness for API integration tests: test configuration, a stub
//! payment gateway, the app router, request helpers, and fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use leadlot_api::auth::jwt::{generate_access_token, JwtConfig};
use leadlot_api::config::{ServerConfig, StripeConfig};
use leadlot_api::payments::gateway::{
    CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway, SessionStatus,
};
use leadlot_api::router::build_app_router;
use leadlot_api::state::AppState;
use leadlot_core::types::{DbId, Timestamp};

/// Webhook signing secret used across the webhook tests.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: test_jwt_config(),
        stripe: StripeConfig {
            secret_key: "sk_test_key".to_string(),
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
            api_base: "http://stripe.invalid".to_string(),
            success_url: "http://localhost:5173/dashboard?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "http://localhost:5173/dashboard".to_string(),
            currency: "cad".to_string(),
        },
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-with-enough-length".to_string(),
        access_token_expiry_mins: 60,
    }
}

/// Mint a bearer token for a dealer (or admin) id.
pub fn bearer_for(dealer_id: DbId, role: &str) -> String {
    let token = generate_access_token(dealer_id, role, &test_jwt_config())
        .expect("token generation should succeed");
    format!("Bearer {token}")
}

// ---------------------------------------------------------------------------
// Stub payment gateway
// ---------------------------------------------------------------------------

/// In-memory gateway stub. Sessions are "paid" by default; flip `paid` to
/// exercise the unpaid path, `fail_create` to exercise gateway failures.
pub struct MockGateway {
    pub paid: AtomicBool,
    pub fail_create: AtomicBool,
    counter: AtomicU64,
    sessions: Mutex<HashMap<String, i64>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            paid: AtomicBool::new(true),
            fail_create: AtomicBool::new(false),
            counter: AtomicU64::new(0),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 402,
                message: "card setup failed".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let session_id = format!("cs_mock_{n}");
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.clone(), request.amount_cents);
        Ok(CheckoutSession {
            redirect_url: format!("https://checkout.example.test/{session_id}"),
            session_id,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        let amount = self
            .sessions
            .lock()
            .unwrap()
            .get(session_id)
            .copied()
            .unwrap_or(0);
        Ok(SessionStatus {
            session_id: session_id.to_string(),
            paid: self.paid.load(Ordering::SeqCst),
            payment_id: format!("pi_{session_id}"),
            amount_total_cents: amount,
        })
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with the default stub gateway.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_gateway(pool, Arc::new(MockGateway::default()))
}

/// Build the app with a caller-controlled gateway stub. Mirrors the router
/// construction in `main.rs` so tests exercise the production middleware
/// stack.
pub fn build_test_app_with_gateway(pool: PgPool, gateway: Arc<dyn PaymentGateway>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        gateway,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request with optional bearer auth and JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("Authorization", auth);
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, auth: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(auth), None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    auth: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(auth), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, auth: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(auth), None).await
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status and return the parsed body.
pub async fn expect_json(
    response: Response<Body>,
    status: StatusCode,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a dealer row and return its id.
pub async fn seed_dealer(pool: &PgPool, name: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO dealers (name, email) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(format!("{name}@example.test"))
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

/// Insert a submitted lead with the given age in days.
pub async fn seed_lead_aged(pool: &PgPool, full_name: &str, age_days: i64) -> DbId {
    let submitted: Timestamp = chrono::Utc::now() - chrono::Duration::days(age_days);
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO leads \
             (full_name, email, phone_number, city, vehicle_type, status_id, submitted_at) \
         VALUES ($1, 'contact@example.test', '555-0100', 'Calgary', 'SUV', 2, $2) \
         RETURNING id",
    )
    .bind(full_name)
    .bind(submitted)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

/// Sign a webhook body the way the gateway does.
pub fn webhook_signature(body: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let signature = leadlot_core::signature::sign_payload(
        TEST_WEBHOOK_SECRET,
        timestamp,
        body.as_bytes(),
    );
    format!("t={timestamp},v1={signature}")
}

/// Post a signed webhook event.
pub async fn post_webhook(app: Router, body: &str, signature: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/webhooks/stripe")
        .header("Content-Type", "application/json")
        .header("Stripe-Signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}
