use std::fmt;
use std::str::FromStr;

use crate::ReqdeckError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl FromStr for Method {
    type Err = ReqdeckError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            _ => Err(ReqdeckError::validation(format!(
                "Invalid HTTP method: {}",
                s
            ))),
        }
    }
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 请求体 / 响应数据：已解析的 JSON 或原始文本
///
/// 序列化时不带标签：`Json` 输出 JSON 值本身，`Text` 输出 JSON 字符串
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// 将用户输入的请求体转换为出站 payload
    ///
    /// - 去除首尾空白后为空：不发送 payload
    /// - 以 `{` 或 `[` 开头：尝试解析 JSON，失败则原样发送去空白后的文本
    /// - 其他：原样发送原始文本
    pub fn from_request_body(body: &str) -> Option<Self> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            return Some(match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => Payload::Json(value),
                Err(_) => Payload::Text(trimmed.to_string()),
            });
        }

        Some(Payload::Text(body.to_string()))
    }

    /// 将响应体文本转换为响应数据：能解析为 JSON 则使用 JSON，否则保留文本
    ///
    /// JSON 字符串字面量视为文本
    pub fn from_response_text(text: String) -> Self {
        if text.trim().is_empty() {
            return Payload::Text(text);
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::String(s)) => Payload::Text(s),
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(text),
        }
    }

    /// 用于存储和计算大小的文本形式
    pub fn to_text(&self) -> String {
        match self {
            Payload::Text(s) => s.clone(),
            Payload::Json(value) => {
                serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}
