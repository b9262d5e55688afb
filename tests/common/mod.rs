#![allow(dead_code)]

use axum::{
    Router,
    extract::ConnectInfo,
    middleware,
    routing::{get, post},
};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use shortly::api::handlers::{health_handler, redirect_handler, unlock_handler};
use shortly::api::middleware::auth;
use shortly::api::routes::protected_routes;
use shortly::domain::click_event::ClickEvent;
use shortly::domain::entities::{Link, NewLink};
use shortly::domain::repositories::LinkRepository;
use shortly::infrastructure::cache::MemoryCache;
use shortly::infrastructure::memory::MemoryStore;
use shortly::state::{AppState, StateSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;

pub const BASE_URL: &str = "https://sho.rt";
pub const PEER_IP: &str = "127.0.0.1";

/// State over in-memory backends, with handles to inspect them.
pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
    pub cache: MemoryCache,
    pub clicks: mpsc::Receiver<ClickEvent>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(100, Duration::from_secs(2))
}

pub fn create_test_app_with(click_capacity: usize, resolve_timeout: Duration) -> TestApp {
    let store = MemoryStore::new();
    let cache = MemoryCache::default();
    let (tx, rx) = mpsc::channel(click_capacity);

    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(cache.clone()),
        tx,
        StateSettings {
            base_url: BASE_URL.to_string(),
            behind_proxy: false,
            short_code_length: 7,
            resolve_timeout,
            token_signing_secret: "test-signing-secret".to_string(),
        },
    );

    TestApp {
        state,
        store,
        cache,
        clicks: rx,
    }
}

/// Issues a token and returns the raw value.
pub async fn create_token(app: &TestApp, name: &str) -> String {
    let (_, raw) = app.state.auth_service.issue(name).await.unwrap();
    raw
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Inserts a link directly into the store, bypassing the cache hooks.
pub async fn insert_link(store: &MemoryStore, code: &str, url: &str) -> Link {
    insert_link_with(store, code, url, None, None).await
}

pub async fn insert_link_with(
    store: &MemoryStore,
    code: &str,
    url: &str,
    expires_at: Option<DateTime<Utc>>,
    max_clicks: Option<i64>,
) -> Link {
    store
        .create(NewLink {
            code: code.to_string(),
            destination_url: url.to_string(),
            title: None,
            owner_id: None,
            expires_at,
            max_clicks,
            password_hash: None,
            tags: Vec::new(),
        })
        .await
        .unwrap()
}

/// Public routes and the authenticated API, without rate limiting.
pub fn test_router(state: AppState) -> Router {
    let api = protected_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::layer,
    ));

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/{code}/unlock", post(unlock_handler))
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(MockConnectInfoLayer)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(test_router(state)).unwrap()
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = format!("{PEER_IP}:12345").parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
