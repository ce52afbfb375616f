//! Root URL resolution.
//!
//! Structured error bodies link back to the configure page, so they need the
//! scheme and host the client used. The listening port is appended only when
//! the host is `localhost`; anywhere else the addon is assumed to sit behind a
//! proxy on a default port.

use axum::http::{header, HeaderMap};

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Builds root URLs for one listener.
#[derive(Debug, Clone, Copy)]
pub struct RootUrlResolver {
    port: u16,
    trust_proxy: bool,
}

impl RootUrlResolver {
    pub fn new(port: u16, trust_proxy: bool) -> Self {
        Self { port, trust_proxy }
    }

    /// `scheme://hostname[:port]` for the request carrying `headers`.
    pub fn resolve(&self, headers: &HeaderMap) -> String {
        let scheme = self
            .forwarded(headers, FORWARDED_PROTO)
            .unwrap_or("http");
        let host = self
            .forwarded(headers, FORWARDED_HOST)
            .or_else(|| header_str(headers, header::HOST.as_str()))
            .map(hostname)
            .filter(|h| !h.is_empty())
            .unwrap_or("localhost");

        if host == "localhost" {
            format!("{scheme}://{host}:{}", self.port)
        } else {
            format!("{scheme}://{host}")
        }
    }

    fn forwarded<'a>(&self, headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        if !self.trust_proxy {
            return None;
        }
        header_str(headers, name)
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Strip the port from a Host header value, keeping IPv6 brackets.
fn hostname(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split(':').next().unwrap_or(host)
}
