use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别，未设置时使用配置文件中的级别
/// 默认级别: info
///
/// 示例:
/// - RUST_LOG=debug reqdeck serve
/// - RUST_LOG=reqdeck=trace,tower_http=debug reqdeck serve
pub fn init_logger(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化（例如测试中）时忽略错误
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    tracing::info!("Logger initialized");
}
