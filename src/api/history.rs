use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::error::ApiError;
use crate::history::{self, HistoryPage, HistoryRecord, HistoryStorage, PageRequest};
use crate::{ReqdeckError, Result};

/// 原始查询参数，保留重复的键
///
/// 同名参数出现多次时只取第一个值
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    fn from_extractor(query: std::result::Result<Query<Self>, QueryRejection>) -> Result<Self> {
        query
            .map(|Query(pairs)| pairs)
            .map_err(|rejection| ReqdeckError::validation(rejection.body_text()))
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// `GET /api/history?page=&limit=`
pub async fn list(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<QueryPairs>, QueryRejection>,
) -> std::result::Result<Json<HistoryPage>, ApiError> {
    // 无法解析的查询串按默认分页处理
    let query = QueryPairs::from_extractor(query).unwrap_or_default();
    let page = PageRequest::from_query(query.first("page"), query.first("limit"));
    let result = with_storage(&state, move |storage| storage.list(page)).await?;
    Ok(Json(result))
}

/// `GET /api/history/{id}`
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> std::result::Result<Json<HistoryRecord>, ApiError> {
    let id = history::parse_id(Some(&raw_id))?;
    let record = with_storage(&state, move |storage| storage.get(id)).await?;
    Ok(Json(record))
}

/// `DELETE /api/history?id=`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<QueryPairs>, QueryRejection>,
) -> std::result::Result<Json<DeleteResponse>, ApiError> {
    let query = QueryPairs::from_extractor(query)?;
    let id = history::parse_id(query.first("id"))?;
    with_storage(&state, move |storage| storage.delete(id)).await?;

    tracing::info!(id, "history record deleted");
    Ok(Json(DeleteResponse { success: true }))
}

/// 存储层是阻塞文件 IO，放到 blocking 线程池执行
async fn with_storage<T, F>(state: &AppState, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&HistoryStorage) -> Result<T> + Send + 'static,
{
    let storage = state.storage.clone();
    tokio::task::spawn_blocking(move || f(&storage))
        .await
        .map_err(ReqdeckError::storage)?
}
