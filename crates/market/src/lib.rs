//! # Sentiment Quant Market
//!
//! 外部数据协作者：价格 K 线与社交情绪数据的获取、重试与模拟数据兜底

pub mod config;
pub mod models;
pub mod sources;

// 重新导出常用类型
pub use config::CollectorConfig;
pub use models::RawPost;
pub use sources::{
    FallbackPriceSource, PostSource, PriceSource, ScoredSentimentSource, SentimentSource,
    SyntheticMarketData, YahooChartSource,
};
