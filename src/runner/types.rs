use crate::http::serialization;
use crate::http::{Payload, Response};
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// 单次请求的归一化结果
///
/// 序列化为 `{ status, statusText, headers, data, time, size, error? }`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseOutcome {
    /// HTTP 状态码；0 表示请求未能完成
    pub status: u16,

    /// 状态描述；请求失败时为错误信息
    pub status_text: String,

    #[serde(with = "serialization::header_map")]
    pub headers: HeaderMap,

    /// 完整的响应数据（未截断）
    pub data: Payload,

    /// 请求耗时 (毫秒)，包含响应体传输时间
    #[serde(rename = "time")]
    pub elapsed_millis: u64,

    /// 序列化后响应体的 UTF-8 字节数
    #[serde(rename = "size")]
    pub size_bytes: u64,

    /// 仅在请求失败时存在
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(skip)]
    serialized: String,
}

impl ResponseOutcome {
    pub fn from_response(response: Response, elapsed: Duration) -> Self {
        let status = response.status.as_u16();
        let status_text = response.status_text().to_string();
        let headers = response.headers.clone();
        let data = response.into_payload();

        Self::build(status, status_text, headers, data, elapsed, None)
    }

    pub fn transport_failure(message: String, elapsed: Duration) -> Self {
        let data = Payload::Json(json!({ "error": message }));
        Self::build(
            0,
            message.clone(),
            HeaderMap::new(),
            data,
            elapsed,
            Some(message),
        )
    }

    fn build(
        status: u16,
        status_text: String,
        headers: HeaderMap,
        data: Payload,
        elapsed: Duration,
        error_message: Option<String>,
    ) -> Self {
        let serialized = data.to_text();
        Self {
            status,
            status_text,
            headers,
            data,
            elapsed_millis: elapsed.as_millis() as u64,
            size_bytes: serialized.len() as u64,
            error_message,
            serialized,
        }
    }

    /// 用于存储和计算大小的响应文本
    pub fn serialized_body(&self) -> &str {
        &self.serialized
    }

    pub fn is_transport_failure(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.status)
    }
}
