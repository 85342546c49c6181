//! gh-notify CLI
//!
//! 在 GitHub Action 中运行：不带参数时执行 notify，输入全部来自环境变量

use anyhow::Result;
use clap::{Parser, Subcommand};
use gh_notify::cli::{DecodeArgs, NotifyArgs};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "gh-notify")]
#[command(about = "gh-notify - 将 GitHub 仓库事件推送到 Mattermost")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    notify: NotifyArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// 渲染事件并投递通知（默认）
    Notify(NotifyArgs),
    /// 归一化 JSON/base64 输入并输出
    Decode(DecodeArgs),
}

fn main() -> Result<()> {
    // 通过 RUST_LOG 控制日志级别，默认为 info
    // 例如: RUST_LOG=debug gh-notify --dry-run
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gh_notify=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Notify(args)) => gh_notify::cli::handle_notify(args)?,
        Some(Commands::Decode(args)) => gh_notify::cli::handle_decode(args)?,
        None => gh_notify::cli::handle_notify(cli.notify)?,
    }

    Ok(())
}
