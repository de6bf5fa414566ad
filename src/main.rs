mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, CliRunner};
use reqdeck::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref())?;

    // 初始化日志系统
    reqdeck::logger::init_logger(&config.log.level);

    CliRunner::new(config).run(cli.command).await
}
