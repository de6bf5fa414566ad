use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::types::Payload;
use crate::{ReqdeckError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    /// 发送请求并读取完整响应体
    ///
    /// 任何 HTTP 状态码都视为正常响应；只有请求无法完成时才返回
    /// `ReqdeckError::TransportError`
    pub async fn execute(&self, request: &Request) -> Result<Response> {
        let url = reqwest::Url::parse_with_params(&request.url, request.query_pairs())
            .map_err(|e| transport(format!("Invalid URL '{}': {}", request.url, e)))?;
        let headers = build_headers(request)?;

        debug!(method = %request.method, %url, "dispatching request");

        let mut req = self
            .inner
            .request(request.method.to_reqwest(), url)
            .headers(headers);

        req = match &request.payload {
            Some(Payload::Json(value)) => req.json(value),
            Some(Payload::Text(text)) => req.body(text.clone()),
            None => req,
        };

        let response = req.send().await.map_err(transport_from)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(transport_from)?;

        Ok(Response::new(status, headers, body))
    }
}

fn build_headers(request: &Request) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (key, value) in request.header_pairs() {
        let name = HeaderName::from_bytes(key.trim().as_bytes())
            .map_err(|e| transport(format!("Invalid header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| transport(format!("Invalid value for header '{}': {}", key, e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn transport(message: String) -> ReqdeckError {
    ReqdeckError::TransportError(message)
}

/// reqwest 的错误信息很简略，把 source 链拼接起来
fn transport_from(err: reqwest::Error) -> ReqdeckError {
    transport(format!("{:#}", anyhow::Error::from(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_headers() {
        let request = Request::new("GET", "http://example.com")
            .unwrap()
            .with_header("X-Token", " abc ")
            .with_header("Accept", "application/json");

        let headers = build_headers(&request).unwrap();
        assert_eq!(headers["x-token"], "abc");
        assert_eq!(headers["accept"], "application/json");
    }

    #[test]
    fn test_invalid_header_name_is_transport_error() {
        let request = Request::new("GET", "http://example.com")
            .unwrap()
            .with_header("bad header", "x");

        assert!(matches!(
            build_headers(&request),
            Err(ReqdeckError::TransportError(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_is_transport_error() {
        let client = Client::new().unwrap();
        let request = Request::new("GET", "not a url").unwrap();

        let err = client.execute(&request).await.unwrap_err();
        match err {
            ReqdeckError::TransportError(msg) => assert!(msg.contains("Invalid URL")),
            other => panic!("Expected TransportError, got {:?}", other),
        }
    }
}
