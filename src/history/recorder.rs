use crate::config::HistoryConfig;
use crate::history::model::NewHistoryRecord;
use crate::http::Request;
use crate::runner::types::ResponseOutcome;
use chrono::Utc;

/// 追加在被截断的 responseBody 末尾
pub const TRUNCATION_MARKER: &str = "\n… [truncated]";

/// 历史记录中响应文本的长度限制（按字符计）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationLimits {
    pub preview_chars: usize,
    pub body_max_chars: usize,
}

impl Default for TruncationLimits {
    fn default() -> Self {
        Self {
            preview_chars: 200,
            body_max_chars: 50_000,
        }
    }
}

impl From<&HistoryConfig> for TruncationLimits {
    fn from(config: &HistoryConfig) -> Self {
        Self::new(config.preview_chars, config.body_max_chars)
    }
}

impl TruncationLimits {
    /// preview 上限不超过 body 上限，保证 responsePreview 是 responseBody 的前缀
    pub fn new(preview_chars: usize, body_max_chars: usize) -> Self {
        Self {
            preview_chars: preview_chars.min(body_max_chars),
            body_max_chars,
        }
    }

    /// 前 `preview_chars` 个字符（不超过 `body_max_chars`）
    pub fn preview<'a>(&self, text: &'a str) -> &'a str {
        char_prefix(text, self.preview_chars.min(self.body_max_chars))
    }

    /// 不超过 `body_max_chars` 时原样返回，否则截断并追加标记
    pub fn body(&self, text: &str) -> String {
        let prefix = char_prefix(text, self.body_max_chars);
        if prefix.len() == text.len() {
            text.to_string()
        } else {
            format!("{}{}", prefix, TRUNCATION_MARKER)
        }
    }
}

fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// 根据一次请求及其结果生成历史记录
pub fn capture(
    request: &Request,
    outcome: &ResponseOutcome,
    limits: &TruncationLimits,
) -> NewHistoryRecord {
    let text = outcome.serialized_body();

    NewHistoryRecord {
        url: request.url.clone(),
        method: request.method.as_str().to_string(),
        headers: request.headers.clone(),
        query_params: request.query_params.clone(),
        request_body: request.body.clone(),
        response_status: Some(outcome.status),
        response_time_millis: Some(outcome.elapsed_millis),
        response_size_bytes: Some(outcome.size_bytes),
        response_preview: limits.preview(text).to_string(),
        response_body: limits.body(text),
        created_at: Utc::now(),
    }
}
