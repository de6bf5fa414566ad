use crate::http::types::Payload;
use reqwest::StatusCode;
use reqwest::header::HeaderMap as Headers;

/// 目标服务器返回的原始响应
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, headers: Headers, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("OK")
    }

    /// 响应数据：可解析为 JSON 时返回 JSON，否则返回原始文本
    pub fn into_payload(self) -> Payload {
        Payload::from_response_text(self.body)
    }
}
