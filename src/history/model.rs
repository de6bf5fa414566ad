use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::StringMap;

/// 历史记录条目
///
/// 写入后不可修改，只能删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// 自增 ID，由存储层在写入时分配
    pub id: u64,

    #[serde(flatten)]
    pub entry: NewHistoryRecord,
}

impl std::ops::Deref for HistoryRecord {
    type Target = NewHistoryRecord;

    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}

/// 尚未分配 ID 的历史记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryRecord {
    pub url: String,
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<StringMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<StringMap>,

    /// 用户输入的原始请求体
    #[serde(
        default,
        rename = "body",
        alias = "requestBody",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_body: Option<String>,

    #[serde(default)]
    pub response_status: Option<u16>,

    /// 请求耗时 (毫秒)
    #[serde(default, rename = "responseTime", alias = "responseTimeMillis")]
    pub response_time_millis: Option<u64>,

    /// 序列化后响应体的字节数
    #[serde(default, rename = "responseSize", alias = "responseSizeBytes")]
    pub response_size_bytes: Option<u64>,

    /// 响应体前缀，用于列表展示
    #[serde(default)]
    pub response_preview: String,

    /// 响应体（超长时截断并追加标记）
    #[serde(default)]
    pub response_body: String,

    pub created_at: DateTime<Utc>,
}

impl NewHistoryRecord {
    pub fn with_id(self, id: u64) -> HistoryRecord {
        HistoryRecord { id, entry: self }
    }
}
