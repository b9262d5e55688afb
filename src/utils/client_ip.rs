//! Client address extraction for click recording.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Returns the client IP of a request.
///
/// Behind a reverse proxy the first `X-Forwarded-For` entry is used, then
/// `X-Real-IP`. Headers are ignored when not behind a proxy.
/// Falls back to the peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> Option<String> {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return Some(ip.to_string());
        }
    }

    peer.map(|addr| addr.ip().to_string())
}
