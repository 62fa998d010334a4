//! # 应用启动引导模块
//!
//! 解析命令行、组装数据源与分析服务、输出结果

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Parser;
use sentiment_quant_ai_analysis::LexiconSentimentAnalyzer;
use sentiment_quant_analytics::SummaryBuilder;
use sentiment_quant_common::utils::{parse_period, truncate_to_bucket};
use sentiment_quant_common::TimeRange;
use sentiment_quant_core::config::AnalysisConfig;
use sentiment_quant_market::{
    CollectorConfig, FallbackPriceSource, PriceSource, ScoredSentimentSource, SentimentSource,
    SyntheticMarketData, YahooChartSource,
};
use sentiment_quant_orchestration::SentimentAnalysisService;
use tracing::{info, warn};

use super::report::{render_json, render_table};

#[derive(Debug, Clone, Parser)]
#[command(name = "sentiment-cli", version, about = "社交情绪与股价关联分析")]
pub struct Cli {
    /// 逗号分隔的股票代码
    #[arg(long, value_delimiter = ',', default_value = "AAPL,TSLA,MSFT,GOOGL,AMZN")]
    pub tickers: Vec<String>,

    /// 回看天数，缺省读取 COLLECTOR_HISTORY_DAYS
    #[arg(long)]
    pub days: Option<i64>,

    /// 只使用模拟数据，不请求 Yahoo
    #[arg(long)]
    pub offline: bool,

    /// 分桶周期，如 1H / 15m / 1D
    #[arg(long)]
    pub bucket: Option<String>,

    /// 异常检测 z-score 阈值
    #[arg(long)]
    pub threshold: Option<f64>,

    /// 领先相关的滞后桶数
    #[arg(long)]
    pub lag: Option<usize>,

    /// 用词典打分器重新给帖子打分
    #[arg(long)]
    pub rescore: bool,

    /// 模拟数据随机种子
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 大写、去空、按首次出现去重
pub fn normalize_tickers(tickers: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ticker in tickers {
        let ticker = ticker.trim().to_uppercase();
        if !ticker.is_empty() && !out.contains(&ticker) {
            out.push(ticker);
        }
    }
    out
}

/// 环境变量为底，命令行参数覆盖
pub fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::from_env()?;
    if let Some(bucket) = &cli.bucket {
        config = config.with_bucket_width(parse_period(bucket)?);
    }
    if let Some(threshold) = cli.threshold {
        config = config.with_anomaly_threshold(threshold);
    }
    if let Some(lag) = cli.lag {
        config = config.with_leading_lag(lag);
    }
    config.validate()?;
    Ok(config)
}

fn build_service(cli: &Cli, config: AnalysisConfig, collector: CollectorConfig) -> Result<SentimentAnalysisService> {
    let synthetic = Arc::new(SyntheticMarketData::new(cli.seed).with_posts_per_day(collector.posts_per_day));

    let prices: Arc<dyn PriceSource> = if cli.offline {
        synthetic.clone()
    } else {
        Arc::new(FallbackPriceSource::new(
            Arc::new(YahooChartSource::new()?),
            synthetic.clone(),
            collector,
        ))
    };
    let sentiment: Arc<dyn SentimentSource> = if cli.rescore {
        Arc::new(ScoredSentimentSource::new(
            synthetic.clone(),
            Arc::new(LexiconSentimentAnalyzer::default()),
        ))
    } else {
        synthetic
    };

    Ok(SentimentAnalysisService::new(prices, sentiment, SummaryBuilder::new(config)?))
}

/// 运行主程序
pub async fn run(cli: Cli) -> Result<()> {
    let tickers = normalize_tickers(&cli.tickers);
    if tickers.is_empty() {
        return Err(anyhow!("至少需要一个股票代码 (--tickers)"));
    }
    let config = build_config(&cli)?;
    let collector = CollectorConfig::from_env();
    let days = cli.days.unwrap_or(collector.history_days);
    if days <= 0 {
        return Err(anyhow!("--days 必须为正: {}", days));
    }

    // 截止时间对齐到桶边界
    let end = truncate_to_bucket(Utc::now(), config.bucket_width)?;
    let range = TimeRange::last_days(end, days)?;
    info!(
        "分析 {:?}, 区间 {} ~ {}, 桶宽 {}, 离线: {}",
        tickers,
        range.start(),
        range.end(),
        config.bucket_width,
        cli.offline
    );

    let service = build_service(&cli, config, collector)?;
    let outcomes = service.analyze_many(&tickers, range).await;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();

    if cli.json {
        println!("{}", render_json(&outcomes)?);
    } else {
        println!("{}", render_table(&outcomes));
    }

    if failed == outcomes.len() {
        return Err(anyhow!("全部 {} 个标的分析失败", failed));
    }
    if failed > 0 {
        warn!("{} 个标的分析失败", failed);
    }
    Ok(())
}
