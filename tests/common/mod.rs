#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU16, AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Behaviour knobs for the fake flight-search provider.
#[derive(Clone)]
pub struct Upstream {
    pub token_calls: Arc<AtomicUsize>,
    pub search_calls: Arc<AtomicUsize>,
    pub expires_in: i64,
    pub search_status: StatusCode,
    /// After this many searches, `token-1` is answered with 401.
    pub revoke_after: Option<usize>,
    token_status: Arc<AtomicU16>,
}

impl Upstream {
    pub fn new(expires_in: i64) -> Self {
        Self {
            token_calls: Arc::new(AtomicUsize::new(0)),
            search_calls: Arc::new(AtomicUsize::new(0)),
            expires_in,
            search_status: StatusCode::OK,
            revoke_after: None,
            token_status: Arc::new(AtomicU16::new(StatusCode::OK.as_u16())),
        }
    }

    /// Status the token endpoint answers with from now on.
    pub fn set_token_status(&self, status: StatusCode) {
        self.token_status.store(status.as_u16(), Ordering::SeqCst);
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

async fn issue_token(
    State(up): State<Upstream>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = up.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let status = StatusCode::from_u16(up.token_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status != StatusCode::OK {
        return (status, Json(json!({ "error": "server_error", "code": 38189 }))).into_response();
    }
    let ok = form.get("grant_type").map(String::as_str) == Some("client_credentials")
        && form.get("client_id").map(String::as_str) == Some("test-key")
        && form.get("client_secret").map(String::as_str) == Some("test-secret");
    if !ok {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }
    Json(json!({
        "type": "amadeusOAuth2Token",
        "access_token": format!("token-{n}"),
        "expires_in": up.expires_in,
    }))
    .into_response()
}

async fn flight_offers(
    State(up): State<Upstream>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let n = up.search_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !auth.starts_with("Bearer token-") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "errors": [{ "code": 38191 }] })))
            .into_response();
    }
    let revoked = up.revoke_after.is_some_and(|k| n > k) && auth == "Bearer token-1";
    if revoked {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "errors": [{ "code": 38192, "title": "Access token expired" }] })),
        )
            .into_response();
    }
    if up.search_status != StatusCode::OK {
        return (
            up.search_status,
            Json(json!({ "errors": [{ "code": 477, "title": "INVALID FORMAT" }] })),
        )
            .into_response();
    }
    Json(json!({
        "meta": { "count": 1 },
        "data": [{ "id": "1", "type": "flight-offer" }],
        "echo": { "params": params, "authorization": auth },
    }))
    .into_response()
}

/// Starts the fake provider on an ephemeral port and returns its base URL.
pub async fn spawn_upstream(up: Upstream) -> String {
    let app = Router::new()
        .route("/v1/security/oauth2/token", post(issue_token))
        .route("/v2/shopping/flight-offers", get(flight_offers))
        .with_state(up);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake upstream");
    });
    format!("http://{addr}")
}

pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.expect("router response");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    req.body(Body::from(body.to_string())).expect("request")
}

pub fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    req.body(Body::empty()).expect("request")
}
