//! # Sentiment Quant Orchestration
//!
//! 编排层：拉取外部数据、调度分析核心、缓存结果

pub mod cache;
pub mod service;

pub use cache::{AnalysisKey, SummaryCache};
pub use service::{InstrumentOutcome, SentimentAnalysisService};
