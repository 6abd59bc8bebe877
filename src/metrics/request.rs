// src/metrics/request.rs

//! What the emitter reads off a request before handing it on, and off the
//! response once it comes back.

use axum::{
    extract::ConnectInfo,
    http::{header, HeaderMap, Request, Response},
};
use http_body::Body as HttpBody;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Request attributes that end up as point tags or values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub path: String,
    pub client_ip: String,
    pub method: String,
    pub user_agent: String,
    /// Request body size in bytes, `-1` when unknown.
    pub content_length: i64,
}

impl RequestInfo {
    pub fn from_request<B: HttpBody>(request: &Request<B>) -> Self {
        let headers = request.headers();
        Self {
            path: request.uri().path().to_string(),
            client_ip: client_ip(request),
            method: request.method().as_str().to_string(),
            user_agent: headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
            content_length: content_length(headers)
                .or_else(|| exact_size(request.body()))
                .unwrap_or(-1),
        }
    }
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// peer address when the server was started with connect info.
pub fn client_ip<B>(request: &Request<B>) -> String {
    let headers = request.headers();

    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get(X_REAL_IP)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

/// Response body size in bytes, `-1` when the body is streamed without a
/// known length.
pub fn response_size<B: HttpBody>(response: &Response<B>) -> i64 {
    exact_size(response.body())
        .or_else(|| content_length(response.headers()))
        .unwrap_or(-1)
}

fn content_length(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|len| *len >= 0)
}

fn exact_size<B: HttpBody>(body: &B) -> Option<i64> {
    body.size_hint()
        .exact()
        .and_then(|len| i64::try_from(len).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use futures::stream;

    fn request() -> axum::http::request::Builder {
        Request::builder().uri("/ping?verbose=1")
    }

    #[test]
    fn test_request_info_from_plain_get() {
        let req = request()
            .header("user-agent", "curl/8.4.0")
            .body(Body::empty())
            .unwrap();

        let info = RequestInfo::from_request(&req);
        assert_eq!(info.path, "/ping");
        assert_eq!(info.method, "GET");
        assert_eq!(info.user_agent, "curl/8.4.0");
        assert_eq!(info.content_length, 0);
        assert_eq!(info.client_ip, "");
    }

    #[test]
    fn test_content_length_header_wins_over_body() {
        let req = request()
            .method("POST")
            .header("content-length", "42")
            .body(Body::from("short"))
            .unwrap();
        assert_eq!(RequestInfo::from_request(&req).content_length, 42);
    }

    #[test]
    fn test_content_length_from_body_size() {
        let req = request().method("POST").body(Body::from("hello")).unwrap();
        assert_eq!(RequestInfo::from_request(&req).content_length, 5);
    }

    #[test]
    fn test_unknown_content_length_is_negative() {
        let chunks = stream::iter(vec![Ok::<_, std::io::Error>("a"), Ok("b")]);
        let req = request()
            .method("POST")
            .body(Body::from_stream(chunks))
            .unwrap();
        assert_eq!(RequestInfo::from_request(&req).content_length, -1);
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let req = request()
            .header("x-forwarded-for", " 203.0.113.7 , 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_peer() {
        let req = request()
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req), "198.51.100.2");

        let mut req = request().body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 54321))));
        assert_eq!(client_ip(&req), "192.0.2.1");
    }

    #[test]
    fn test_response_size() {
        let resp = Response::new(Body::from("{\"message\":\"pong\"}"));
        assert_eq!(response_size(&resp), 18);

        let resp = Response::new(Body::empty());
        assert_eq!(response_size(&resp), 0);

        let chunks = stream::iter(vec![Ok::<_, std::io::Error>("a")]);
        let resp = Response::builder()
            .header("content-length", "1")
            .body(Body::from_stream(chunks))
            .unwrap();
        assert_eq!(response_size(&resp), 1);
    }
}
