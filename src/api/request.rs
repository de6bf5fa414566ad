use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use super::AppState;
use super::error::ApiError;
use crate::ReqdeckError;
use crate::http::RequestDescription;
use crate::runner::ResponseOutcome;

/// `POST /api/request` — 发送请求并返回归一化结果
///
/// 目标服务器返回任何状态码、甚至无法连接时都返回 200，
/// 由 `status` 字段区分（0 表示请求未能完成）。
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RequestDescription>, JsonRejection>,
) -> Result<Json<ResponseOutcome>, ApiError> {
    let Json(description) =
        payload.map_err(|rejection| ReqdeckError::validation(rejection.body_text()))?;

    let outcome = state.executor.execute(description).await?;
    Ok(Json(outcome))
}
