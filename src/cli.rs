use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use reqdeck::api::{AppState, create_router};
use reqdeck::config::AppConfig;
use reqdeck::history::selector::{self, SelectionStrategy};
use reqdeck::history::{PageRequest, printer};
use reqdeck::http::{RequestDescription, StringMap};
use reqdeck::runner::{RequestExecutor, ResponseOutcome};
use reqdeck::utils::{ResponseFormat, ResponseFormatter};
use tokio::net::TcpListener;
use tracing::info;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径（默认查找 reqdeck.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 启动 HTTP 服务
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// 发送一个 curl 风格的请求并记录到历史
    Send {
        /// 输出响应头和完整响应体
        #[arg(long)]
        verbose: bool,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// 管理请求历史
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// 分页列出历史记录（最新在前）
    List {
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
        #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
        limit: i64,
    },
    /// 以 JSON 输出一条历史记录
    Show { id: u64 },
    /// 删除一条历史记录
    Delete { id: u64 },
    /// 重新发送一条历史记录；不指定 ID 时交互式选择
    Replay {
        id: Option<u64>,
        #[arg(long)]
        verbose: bool,
    },
}

pub struct CliRunner {
    config: AppConfig,
}

impl CliRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Serve { host, port } => {
                if let Some(host) = host {
                    self.config.server.host = host;
                }
                if let Some(port) = port {
                    self.config.server.port = port;
                }
                self.serve().await
            }
            Commands::Send { verbose, args } => {
                let description = parse_curl(args)?;
                let outcome = self.executor()?.execute(description).await?;
                print_outcome(&outcome, verbose);
                Ok(())
            }
            Commands::History { action } => self.history(action).await,
        }
    }

    fn executor(&self) -> Result<RequestExecutor> {
        Ok(RequestExecutor::from_config(&self.config)?)
    }

    async fn serve(&self) -> Result<()> {
        let state = Arc::new(AppState::new(self.executor()?));
        let app = create_router(state);

        let addr = self.config.server.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!(
            history_dir = %self.config.history.dir.display(),
            "reqdeck listening on http://{}",
            addr
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }

    async fn history(&self, action: HistoryCommand) -> Result<()> {
        let executor = self.executor()?;
        let storage = executor.storage();

        match action {
            HistoryCommand::List { page, limit } => {
                let page = storage.list(PageRequest::new(page, limit))?;
                println!("{}", printer::render_page(&page));
            }
            HistoryCommand::Show { id } => {
                let record = storage.get(id)?;
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            HistoryCommand::Delete { id } => {
                storage.delete(id)?;
                println!("Deleted history record #{}", id);
            }
            HistoryCommand::Replay { id, verbose } => {
                let strategy = match id {
                    Some(id) => SelectionStrategy::Id(id),
                    None => SelectionStrategy::Interactive,
                };
                let record = selector::select_record(storage, strategy)?;
                println!("Replaying #{}: {} {}", record.id, record.method, record.url);

                let outcome = executor.replay(&record).await?;
                print_outcome(&outcome, verbose);
            }
        }

        Ok(())
    }
}

fn print_outcome(outcome: &ResponseOutcome, verbose: bool) {
    let format = if verbose {
        ResponseFormat::Verbose
    } else {
        ResponseFormat::Compact
    };
    println!("{}", ResponseFormatter::new(format).format(outcome));
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// 解析 curl 风格参数
///
/// 支持 `-X/--request`、`-H/--header`、`-d/--data/--data-raw`、`-G/--get`
/// 以及 `--query key=value`；第一个位置参数为 URL。
fn parse_curl(args: Vec<String>) -> Result<RequestDescription> {
    let args = if args.first().map(|s| s == "curl").unwrap_or(false) {
        args[1..].to_vec()
    } else {
        args
    };

    let mut method: Option<String> = None;
    let mut url = String::new();
    let mut headers = StringMap::new();
    let mut query_params = StringMap::new();
    let mut body = String::new();
    let mut force_get = false;

    let mut args_iter = args.into_iter();

    while let Some(arg) = args_iter.next() {
        match arg.as_str() {
            // HTTP Method
            "-X" | "--request" => {
                if let Some(m) = args_iter.next() {
                    method = Some(m.to_uppercase());
                }
            }
            // Header
            "-H" | "--header" => {
                if let Some(header) = args_iter.next()
                    && let Some((key, value)) = header.split_once(':')
                {
                    headers.insert(key.trim().to_string(), value.trim().to_string());
                }
            }
            // Data (body)
            "-d" | "--data" | "--data-raw" => {
                if let Some(data) = args_iter.next() {
                    body = data;
                }
            }
            "--query" => {
                if let Some(pair) = args_iter.next() {
                    insert_pairs(&mut query_params, &pair);
                }
            }
            // Force GET, data becomes query string
            "-G" | "--get" => {
                force_get = true;
            }
            s if s.starts_with('-') => {
                // -X=POST 这种形式
                if let Some((opt, val)) = s.split_once('=') {
                    match opt {
                        "-X" | "--request" => method = Some(val.to_uppercase()),
                        "-d" | "--data" | "--data-raw" => body = val.to_string(),
                        _ => {} // 忽略其他选项
                    }
                }
            }
            // URL (位置参数)
            _ => {
                if url.is_empty() {
                    url = arg;
                }
            }
        }
    }

    if url.is_empty() {
        return Err(anyhow!("URL is required"));
    }

    if force_get && !body.is_empty() {
        insert_pairs(&mut query_params, &body);
        body.clear();
    }

    // 有 body 且未指定方法时默认 POST
    let method = match method {
        Some(m) if !force_get => m,
        _ if force_get => "GET".to_string(),
        _ if !body.is_empty() => "POST".to_string(),
        _ => "GET".to_string(),
    };

    Ok(RequestDescription {
        url: Some(url),
        method: Some(method),
        headers: (!headers.is_empty()).then_some(headers),
        query_params: (!query_params.is_empty()).then_some(query_params),
        body: (!body.is_empty()).then_some(body),
    })
}

fn insert_pairs(target: &mut StringMap, raw: &str) {
    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        target.insert(key.to_string(), value.to_string());
    }
}
