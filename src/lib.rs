//! # Sentiment Quant
//!
//! 社交情绪与股价关联分析。工作区各 crate 的统一入口：
//! - `common`: 价格 / 情绪事件等领域类型、错误、时间工具
//! - `infra`: 配置、日志、缓存（`sentiment_quant_core`）
//! - `ai_analysis`: 文本情绪打分
//! - `analytics`: 聚合、合并、相关性、异常检测（纯计算）
//! - `market`: 价格与情绪数据源
//! - `orchestration`: 多标的并发分析服务

pub use sentiment_quant_ai_analysis as ai_analysis;
pub use sentiment_quant_analytics as analytics;
pub use sentiment_quant_common as common;
pub use sentiment_quant_core as infra;
pub use sentiment_quant_market as market;
pub use sentiment_quant_orchestration as orchestration;

/// 常用类型
pub mod prelude {
    pub use sentiment_quant_analytics::{
        aggregate, correlate, detect_spikes, merge, summarize, Anomaly, CorrelationResult,
        DetectorParams, InstrumentSummary, MergedRecord, SentimentBucket, SummaryBuilder,
    };
    pub use sentiment_quant_common::{AppError, PriceBar, SentimentEvent, TimeRange};
    pub use sentiment_quant_core::config::AnalysisConfig;
    pub use sentiment_quant_orchestration::{InstrumentOutcome, SentimentAnalysisService};
}
