//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (CORS headers, request ID, tracing, panics)
//! - Serve the static frontend and the 404 page
//! - Hand stream requests to the dispatcher
//! - Bind server to listener and shut down gracefully

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, get_service, MethodRouter},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::addon::dispatch::{Dispatcher, Reply, StreamCall, INVALID_REQUEST_TEXT};
use crate::config::{AddonConfig, ManifestConfig};
use crate::engine::{ServiceValidator, UpstreamEngineFactory};
use crate::http::request::{make_span, request_id_header, UuidRequestId};
use crate::http::root_url::RootUrlResolver;
use crate::lifecycle::shutdown_signal;
use crate::manifest::{manifest, Manifest};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub root_url: RootUrlResolver,
    pub manifest: Arc<ManifestConfig>,
}

/// HTTP server for the addon.
pub struct HttpServer {
    router: Router,
    config: AddonConfig,
}

impl HttpServer {
    /// Create a server around an existing dispatcher.
    pub fn new(config: AddonConfig, dispatcher: Dispatcher) -> Self {
        let state = AppState {
            dispatcher,
            root_url: RootUrlResolver::new(config.listener.port, config.listener.trust_proxy),
            manifest: Arc::new(config.manifest.clone()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Create a server with the default validator and upstream engine.
    pub fn with_default_engine(config: AddonConfig) -> Result<Self, reqwest::Error> {
        let engines = UpstreamEngineFactory::new(&config.engine)?;
        let dispatcher = Dispatcher::new(Arc::new(ServiceValidator), Arc::new(engines));
        Ok(Self::new(config, dispatcher))
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Only GET and HEAD are answered; every other method, on any path,
    /// gets the static 404 page.
    fn build_router(config: &AddonConfig, state: AppState) -> Router {
        let statics = &config.static_files;
        let not_found = {
            let page = Arc::new(statics.not_found_path());
            move || not_found_page(page.clone())
        };
        let configure_page =
            get_service(ServeFile::new(statics.configure_path())).fallback(not_found.clone());
        let assets: MethodRouter = get_service(
            ServeDir::new(&statics.root)
                .not_found_service(ServeFile::new(statics.not_found_path())),
        )
        .fallback(not_found.clone());

        Router::new()
            .route("/", get(redirect_to_configure).fallback(not_found.clone()))
            .route("/configure", configure_page.clone())
            .route("/{config}/configure", configure_page)
            .route("/manifest.json", get(plain_manifest).fallback(not_found.clone()))
            .route(
                "/{config}/manifest.json",
                get(configured_manifest).fallback(not_found.clone()),
            )
            .route(
                "/stream/{kind}/{id}",
                get(stream_without_config).fallback(not_found.clone()),
            )
            .route(
                "/{config}/stream/{kind}/{id}",
                get(stream_with_config).fallback(not_found),
            )
            .fallback_service(assets)
            .with_state(state)
            .layer(CatchPanicLayer::new())
            .layer(PropagateRequestIdLayer::new(request_id_header()))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(SetRequestIdLayer::new(request_id_header(), UuidRequestId))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET,PUT,POST,DELETE"),
            ))
    }

    /// Run the server until `shutdown` fires or the process is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AddonConfig {
        &self.config
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Reply::Streams(body) | Reply::MissingConfig(body) | Reply::InvalidConfig(body) => {
                (status, Json(body)).into_response()
            }
            Reply::BadRequest(text) => (status, text).into_response(),
            Reply::EngineFault(message) => (status, message).into_response(),
        }
    }
}

async fn not_found_page(page: Arc<PathBuf>) -> Response {
    match tokio::fs::read(page.as_path()).await {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(e) => {
            tracing::warn!(page = %page.display(), error = %e, "Not-found page unreadable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn redirect_to_configure() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/configure")])
}

async fn plain_manifest(State(state): State<AppState>) -> Json<Manifest> {
    Json(manifest(&state.manifest, false))
}

async fn configured_manifest(
    State(state): State<AppState>,
    Path(_config): Path<String>,
) -> Json<Manifest> {
    Json(manifest(&state.manifest, true))
}

/// `/stream/{kind}/{id}`: no configuration segment at all.
async fn stream_without_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Reply {
    let root_url = state.root_url.resolve(&headers);
    state
        .dispatcher
        .dispatch(StreamCall {
            config_segment: None,
            path: uri.path(),
            root_url: &root_url,
        })
        .await
}

/// `/{config}/stream/{kind}/{id}`: the full pipeline.
async fn stream_with_config(
    State(state): State<AppState>,
    params: Result<Path<(String, String, String)>, PathRejection>,
    headers: HeaderMap,
    uri: Uri,
) -> Reply {
    let Ok(Path((config, _kind, _id))) = params else {
        tracing::warn!("Invalid request: undecodable path parameters");
        return Reply::BadRequest(INVALID_REQUEST_TEXT);
    };

    let root_url = state.root_url.resolve(&headers);
    state
        .dispatcher
        .dispatch(StreamCall {
            config_segment: Some(&config),
            path: uri.path(),
            root_url: &root_url,
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, EngineFactory, StreamEngine, ValidatedConfig};
    use crate::StreamRequest;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    #[derive(Debug)]
    struct PanickingEngines;

    struct PanickingEngine;

    #[async_trait]
    impl StreamEngine for PanickingEngine {
        async fn streams(&self, _request: &StreamRequest) -> Result<Vec<Value>, EngineError> {
            panic!("engine exploded");
        }
    }

    impl EngineFactory for PanickingEngines {
        fn engine(&self, _config: &ValidatedConfig) -> Box<dyn StreamEngine> {
            Box::new(PanickingEngine)
        }
    }

    /// Answers after `delay` with a single stream.
    #[derive(Debug)]
    struct SlowEngines {
        delay: Duration,
    }

    struct SlowEngine {
        delay: Duration,
    }

    #[async_trait]
    impl StreamEngine for SlowEngine {
        async fn streams(&self, _request: &StreamRequest) -> Result<Vec<Value>, EngineError> {
            tokio::time::sleep(self.delay).await;
            Ok(vec![serde_json::json!({"id": "x"})])
        }
    }

    impl EngineFactory for SlowEngines {
        fn engine(&self, _config: &ValidatedConfig) -> Box<dyn StreamEngine> {
            Box::new(SlowEngine { delay: self.delay })
        }
    }

    fn server(engines: impl EngineFactory + 'static) -> HttpServer {
        let dispatcher = Dispatcher::new(Arc::new(crate::engine::ServiceValidator), Arc::new(engines));
        HttpServer::new(AddonConfig::default(), dispatcher)
    }

    fn services_segment() -> String {
        let config = serde_json::json!({
            "services": [{"id": "a", "enabled": true, "url": "http://127.0.0.1:9"}]
        });
        crate::addon::codec::encode(&crate::UserConfig::from(config))
    }

    async fn get(uri: &str) -> Response {
        get_with(PanickingEngines, uri).await
    }

    async fn get_with(engines: impl EngineFactory + 'static, uri: &str) -> Response {
        server(engines)
            .router()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header("host", "localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_redirects_to_configure() {
        let res = get("/").await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()[header::LOCATION], "/configure");
        assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_missing_config_uses_localhost_root() {
        let res = get("/stream/series/tt1234567:1:2.json").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body["streams"][0]["externalUrl"],
            "http://localhost:3000/configure"
        );
    }

    #[tokio::test]
    async fn test_engine_panic_becomes_internal_error() {
        let res = get(&format!("/{}/stream/movie/tt1234567.json", services_segment())).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_engine_is_not_cut_short() {
        let engines = SlowEngines {
            delay: Duration::from_secs(120),
        };
        let uri = format!("/{}/stream/movie/tt1234567.json", services_segment());
        let res = get_with(engines, &uri).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"streams":[{"id":"x"}]}"#);
    }
}
