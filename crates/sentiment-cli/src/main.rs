use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = sentiment_cli::Cli::parse();
    sentiment_cli::app_init()?;
    sentiment_cli::run(cli).await
}
