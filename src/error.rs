use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReqdeckError {
    #[error("参数校验失败: {0}")]
    ValidationError(String),

    #[error("历史记录不存在: {0}")]
    NotFound(u64),

    #[error("存储错误: {0}")]
    StorageError(String),

    /// 请求未能完成（DNS、连接、超时、TLS 等），由执行器吸收为降级结果
    #[error("{0}")]
    TransportError(String),

    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Other(String),
}

impl ReqdeckError {
    pub fn validation(message: impl Into<String>) -> Self {
        ReqdeckError::ValidationError(message.into())
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        ReqdeckError::StorageError(err.to_string())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReqdeckError::ValidationError(_) | ReqdeckError::NotFound(_)
        )
    }
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for ReqdeckError {
    fn from(err: anyhow::Error) -> Self {
        ReqdeckError::Other(err.to_string())
    }
}

/// Result type for reqdeck crate
pub type Result<T> = std::result::Result<T, ReqdeckError>;
