//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use stream_addon::addon::codec::{encode, UserConfig};
use stream_addon::config::AddonConfig;
use stream_addon::engine::{
    ConfigValidator, EngineError, EngineFactory, StreamEngine, ValidatedConfig, ValidationOutcome,
};
use stream_addon::{Dispatcher, HttpServer, Shutdown, StreamRequest};

/// Start the addon on an ephemeral loopback port.
pub async fn spawn_server(server: HttpServer) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Config whose static root points at `dir`, populated with the two pages.
pub fn config_with_static_root(dir: &Path) -> AddonConfig {
    std::fs::write(dir.join("configure.html"), "<h1>configure</h1>").unwrap();
    std::fs::write(dir.join("404.html"), "<h1>not found</h1>").unwrap();
    std::fs::write(dir.join("logo.svg"), "<svg/>").unwrap();

    let mut config = AddonConfig::default();
    config.static_files.root = dir.to_path_buf();
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub fn segment(value: Value) -> String {
    encode(&UserConfig::from(value))
}

/// Validator returning a fixed outcome.
#[derive(Debug)]
pub struct FixedValidator(pub ValidationOutcome);

impl ConfigValidator for FixedValidator {
    fn validate(&self, _config: &UserConfig) -> ValidationOutcome {
        self.0.clone()
    }
}

/// Engine factory returning canned streams or a canned fault.
#[derive(Debug)]
pub struct CannedEngines {
    pub result: Result<Vec<Value>, String>,
    pub calls: Arc<AtomicUsize>,
}

impl CannedEngines {
    pub fn streams(streams: Vec<Value>) -> Self {
        Self {
            result: Ok(streams),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fault(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

struct CannedEngine {
    result: Result<Vec<Value>, String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl StreamEngine for CannedEngine {
    async fn streams(&self, _request: &StreamRequest) -> Result<Vec<Value>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(EngineError::Fault)
    }
}

impl EngineFactory for CannedEngines {
    fn engine(&self, _config: &ValidatedConfig) -> Box<dyn StreamEngine> {
        Box::new(CannedEngine {
            result: self.result.clone(),
            calls: self.calls.clone(),
        })
    }
}

pub fn dispatcher(validator: impl ConfigValidator + 'static, engines: CannedEngines) -> Dispatcher {
    Dispatcher::new(Arc::new(validator), Arc::new(engines))
}

/// Start a mock upstream addon; `f` maps the request path to (status, body).
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let path = read_request_path(&mut socket).await;
                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_path(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string()
}
