use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use storefront_api::{
    config::AppConfig,
    events::{self, EventSender},
    handlers::AppServices,
    services::coupons::CouponCodeGenerator,
    store::StateStore,
    AppState,
};

/// Deterministic coupon code generator so tests can predict issued codes.
pub struct SequentialCodes(AtomicU64);

impl SequentialCodes {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }
}

impl CouponCodeGenerator for SequentialCodes {
    fn generate(&self) -> String {
        let n = self.0.fetch_add(1, Ordering::SeqCst);
        format!("DISCOUNT-TEST{}", n)
    }
}

/// Helper harness wiring a fresh in-memory store behind the full router.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_threshold(3).await
    }

    pub async fn with_threshold(nth_order_threshold: u32) -> Self {
        let cfg = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 18080,
            environment: "test".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            nth_order_threshold,
            request_timeout_secs: 5,
        };

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let store = Arc::new(StateStore::new(nth_order_threshold));
        let services = AppServices::with_code_generator(
            store.clone(),
            Arc::new(event_sender.clone()),
            Arc::new(SequentialCodes::new()),
        );

        let state = AppState {
            store,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .merge(storefront_api::handlers::health::health_routes())
            .nest("/api/v1", storefront_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Issue a request against the router without binding a socket.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        let request = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router request")
    }
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
