use crate::{ReqdeckError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 运行配置，对应 reqdeck.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub history: HistoryConfig,
    pub client: ClientConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// 历史记录目录
    pub dir: PathBuf,
    /// responsePreview 的最大字符数
    pub preview_chars: usize,
    /// responseBody 截断前的最大字符数
    pub body_max_chars: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".reqdeck"),
            preview_chars: 200,
            body_max_chars: 50_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 出站请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "reqdeck.toml";
    /// 覆盖历史目录的环境变量
    const HISTORY_DIR_ENV: &'static str = "REQDECK_HISTORY_DIR";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ReqdeckError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<AppConfig> {
        let config: AppConfig = toml::from_str(content).map_err(|e| {
            ReqdeckError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &AppConfig) -> Result<()> {
        if config.client.timeout_secs == 0 {
            return Err(ReqdeckError::ConfigError(
                "client.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if config.history.preview_chars > config.history.body_max_chars {
            tracing::warn!(
                preview_chars = config.history.preview_chars,
                body_max_chars = config.history.body_max_chars,
                "history.preview_chars exceeds body_max_chars, preview will be capped"
            );
        }
        Ok(())
    }

    /// 加载配置
    /// 查找顺序：
    /// 1. 显式指定的路径（不存在则报错）
    /// 2. 当前目录及父目录
    /// 3. 用户配置目录 ~/.config/reqdeck/
    /// 4. 默认值
    ///
    /// 最后应用 REQDECK_HISTORY_DIR 环境变量覆盖
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::find_config_file() {
                Some(path) => {
                    tracing::debug!("Loading config from {}", path.display());
                    Self::load_from_path(path)?
                }
                None => AppConfig::default(),
            },
        };

        if let Ok(dir) = std::env::var(Self::HISTORY_DIR_ENV)
            && !dir.trim().is_empty()
        {
            config.history.dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        Self::find_in_current_dir().or_else(Self::find_in_user_dir)
    }

    /// 从当前目录向上查找
    fn find_in_current_dir() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("reqdeck").join(Self::CONFIG_FILE);

        config_path.exists().then_some(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.history.preview_chars, 200);
        assert_eq!(config.history.body_max_chars, 50_000);
        assert_eq!(config.client.timeout(), Duration::from_secs(30));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
[server]
port = 8080

[history]
preview_chars = 50
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.history.preview_chars, 50);
        assert_eq!(config.history.body_max_chars, 50_000);
        assert_eq!(config.client.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_config() {
        let err = ConfigLoader::parse("[server]\nport = \"not a number\"").unwrap_err();
        assert!(matches!(err, ReqdeckError::ConfigError(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = ConfigLoader::parse("[client]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ReqdeckError::ConfigError(ref msg) if msg.contains("timeout_secs")));
    }

    #[test]
    fn test_preview_larger_than_body_is_accepted() {
        let config =
            ConfigLoader::parse("[history]\npreview_chars = 500\nbody_max_chars = 100\n").unwrap();
        assert_eq!(config.history.preview_chars, 500);
        assert_eq!(config.history.body_max_chars, 100);
    }

    #[test]
    fn test_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reqdeck.toml");
        fs::write(&path, "[client]\ntimeout_secs = 5\n[log]\nlevel = \"debug\"\n").unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_missing_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigLoader::load_from_path(temp_dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ReqdeckError::ConfigError(_))));
    }
}
