//! # Sentiment CLI
//!
//! 社交情绪与股价关联分析命令行入口

mod app;

use anyhow::Result;
use dotenv::dotenv;
use tracing::info;

pub use app::bootstrap::{build_config, normalize_tickers, run, Cli};
pub use app::report::{render_json, render_table};

/// 应用初始化：加载 .env 并设置日志
pub fn app_init() -> Result<()> {
    dotenv().ok();
    sentiment_quant_core::logger::setup_logging()?;
    info!("应用初始化完成");
    Ok(())
}
