//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the single dispatch handler
//! - Wire up middleware (request ID, tracing, CORS)
//! - Dispatch each request to exactly one handler via the route table
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::content::{placeholder, ContentStore, StaticDocument, StaticResponder};
use crate::http::middleware::cors_middleware;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::not_found;
use crate::lifecycle::{shutdown, signals};
use crate::observability::metrics;
use crate::preview;
use crate::routing::{RouteTarget, Router as RouteTable};
use crate::upstream::{self, UpstreamError, UpstreamProxy};

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub store: Arc<ContentStore>,
    pub statics: Arc<StaticResponder>,
    pub upstream: Arc<UpstreamProxy>,
    /// Served by `GET /preview` when the store has nothing readable.
    pub fallback: Arc<str>,
    pub body_limit: usize,
}

/// The gateway's HTTP server.
pub struct GatewayServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl GatewayServer {
    /// Build the server around an existing content store.
    pub fn new(config: GatewayConfig, store: Arc<ContentStore>) -> Result<Self, UpstreamError> {
        let config = Arc::new(config);
        let upstream = Arc::new(UpstreamProxy::new(&config.upstream)?);

        tracing::info!(
            endpoint = %upstream.endpoint(),
            preview = ?store.path(),
            app_document = ?config.content.app_document,
            "Gateway components ready"
        );

        let state = AppState {
            routes: Arc::new(RouteTable::from_config(&config.content)),
            store,
            statics: Arc::new(StaticResponder::new(&config.content)),
            upstream,
            fallback: placeholder::fallback_document(&config.listener.local_url()).into(),
            body_limit: config.security.max_body_size,
        };

        Ok(Self {
            router: Self::build_router(state),
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(middleware::from_fn(cors_middleware))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %req.request_id(),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// A clone of the router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until an OS signal or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = signals::shutdown_signal() => {},
                    _ = shutdown::wait(shutdown_rx) => {},
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point: look up the route, run its handler.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request.request_id().to_owned();

    let Some(route) = state.routes.match_request(&method, &path) else {
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
        metrics::record_request(method.as_str(), "none", 404, start);
        return not_found();
    };

    let body = request.into_body();
    let response = match route.target {
        RouteTarget::AppDocument => state.statics.respond(StaticDocument::App).await,
        RouteTarget::LandingDocument => state.statics.respond(StaticDocument::Landing).await,
        RouteTarget::PreviewRead => preview::read_preview(&state.store, &state.fallback).await,
        RouteTarget::PreviewUpdate => {
            preview::update_preview(&state.store, body, state.body_limit, &request_id).await
        }
        RouteTarget::ChatRelay => {
            upstream::relay_chat(&state.upstream, body, state.body_limit, &request_id).await
        }
    };

    metrics::record_request(method.as_str(), route.name, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    struct Fixture {
        _dir: tempfile::TempDir,
        server: GatewayServer,
        store: Arc<ContentStore>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("obert-ai.html"), "<main>app</main>").unwrap();
        std::fs::write(dir.path().join("landing.html"), "<main>landing</main>").unwrap();

        // Port nobody listens on.
        let dead = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

        let mut config = GatewayConfig::default();
        config.upstream.api_key = "sk-test".into();
        config.upstream.url = format!("http://{dead}/chat/completions");
        config.content.preview_path = dir.path().join("preview.html");
        config.content.app_document = dir.path().join("obert-ai.html");
        config.content.landing_document = dir.path().join("landing.html");

        let store = Arc::new(ContentStore::new(config.content.preview_path.clone()));
        let server = GatewayServer::new(config, store.clone()).unwrap();
        Fixture { _dir: dir, server, store }
    }

    async fn send(server: &GatewayServer, method: Method, uri: &str, body: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let res = server
            .router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec();
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_preview_scenario() {
        let f = fixture();
        let (status, _, body) = send(&f.server, Method::POST, "/preview/update", r#"{"html":"<h1>Hi</h1>"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, br#"{"success":true}"#);

        let (status, headers, body) = send(&f.server, Method::GET, "/preview", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html");
        assert_eq!(body, b"<h1>Hi</h1>");
    }

    #[tokio::test]
    async fn test_preview_before_any_update_is_fallback() {
        let f = fixture();
        let (status, _, body) = send(&f.server, Method::GET, "/preview", "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("http://localhost:3001"));
    }

    #[tokio::test]
    async fn test_static_routes() {
        let f = fixture();
        for path in ["/", "/app", "/app/settings", "/obert-ai.html"] {
            let (status, headers, body) = send(&f.server, Method::GET, path, "").await;
            assert_eq!(status, StatusCode::OK, "path {path}");
            assert_eq!(headers[header::CONTENT_TYPE], "text/html");
            assert_eq!(body, b"<main>app</main>");
        }
        let (_, _, body) = send(&f.server, Method::GET, "/landing.html", "").await;
        assert_eq!(body, b"<main>landing</main>");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_with_cors() {
        let f = fixture();
        let (status, headers, body) = send(&f.server, Method::GET, "/nope", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"Not found");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_options_anywhere() {
        let f = fixture();
        for path in ["/preview/update", "/api/chat", "/not/a/route"] {
            let (status, headers, body) = send(&f.server, Method::OPTIONS, path, "").await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.is_empty());
            assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
            assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
            assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
        }
    }

    #[tokio::test]
    async fn test_chat_invalid_json_is_400() {
        let f = fixture();
        let (status, headers, body) = send(&f.server, Method::POST, "/api/chat", "{oops").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, br#"{"error":"Invalid JSON"}"#);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_chat_unreachable_upstream_is_500_and_preview_untouched() {
        let f = fixture();
        f.store.replace("<p>keep</p>").await.unwrap();

        let (status, _, body) = send(&f.server, Method::POST, "/api/chat", r#"{"messages":[]}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(!envelope["error"].as_str().unwrap().is_empty());
        assert_eq!(envelope["code"], "ECONNREFUSED");

        assert_eq!(f.store.read().await.unwrap(), b"<p>keep</p>");
    }
}
