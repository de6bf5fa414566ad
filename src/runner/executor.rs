use crate::config::AppConfig;
use crate::history::recorder::{self, TruncationLimits};
use crate::history::{HistoryRecord, HistoryStorage};
use crate::http::{Client, Request, RequestDescription};
use crate::runner::types::ResponseOutcome;
use crate::{ReqdeckError, Result};
use std::time::Instant;
use tracing::{error, info, warn};

/// 执行用户描述的请求，并为每次尝试写入一条历史记录
#[derive(Clone)]
pub struct RequestExecutor {
    client: Client,
    storage: HistoryStorage,
    limits: TruncationLimits,
}

impl RequestExecutor {
    pub fn new(client: Client, storage: HistoryStorage) -> Self {
        Self {
            client,
            storage,
            limits: TruncationLimits::default(),
        }
    }

    /// 按配置构建客户端、历史存储和截断限制
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::with_timeout(config.client.timeout())?;
        let storage = HistoryStorage::new(&config.history.dir);
        Ok(Self::new(client, storage).with_limits(TruncationLimits::from(&config.history)))
    }

    pub fn with_limits(mut self, limits: TruncationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn storage(&self) -> &HistoryStorage {
        &self.storage
    }

    /// 校验、发送请求并记录历史
    ///
    /// - 缺少 url / method 时返回 `ValidationError`，不发请求也不写历史
    /// - 网络层失败不会返回错误，而是 status = 0 的降级结果
    /// - 历史写入失败返回 `StorageError`，不会重发请求
    pub async fn execute(&self, description: RequestDescription) -> Result<ResponseOutcome> {
        let request = Request::try_from(description)?;
        self.execute_request(&request).await
    }

    /// 重新发送一条历史记录中的请求（作为新的一次尝试记录）
    pub async fn replay(&self, record: &HistoryRecord) -> Result<ResponseOutcome> {
        self.execute(RequestDescription {
            url: Some(record.url.clone()),
            method: Some(record.method.clone()),
            headers: record.headers.clone(),
            query_params: record.query_params.clone(),
            body: record.request_body.clone(),
        })
        .await
    }

    async fn execute_request(&self, request: &Request) -> Result<ResponseOutcome> {
        // 开始计时
        let start = Instant::now();
        let result = self.client.execute(request).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(response) => ResponseOutcome::from_response(response, elapsed),
            Err(e) => {
                warn!(method = %request.method, url = %request.url, "Request failed: {}", e);
                ResponseOutcome::transport_failure(e.to_string(), elapsed)
            }
        };

        info!(
            method = %request.method,
            url = %request.url,
            status = outcome.status,
            time_ms = outcome.elapsed_millis,
            size = outcome.size_bytes,
            "request completed"
        );

        let entry = recorder::capture(request, &outcome, &self.limits);
        let storage = self.storage.clone();
        let record = tokio::task::spawn_blocking(move || storage.append(entry))
            .await
            .map_err(ReqdeckError::storage)?
            .inspect_err(|e| error!("Failed to save request history: {}", e))?;

        tracing::debug!(id = record.id, "history recorded");

        Ok(outcome)
    }
}
