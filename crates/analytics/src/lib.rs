//! # Sentiment Quant Analytics
//!
//! 情绪-价格关联分析核心（纯函数、同步、无 I/O）：
//! - 聚合：不规则情绪事件 → 固定宽度时间桶
//! - 合并：情绪桶左连接到价格序列，缺失桶中性填充
//! - 相关性：同期 / 领先 Pearson 相关与显著性
//! - 异常检测：滚动 z-score 情绪突变
//! - 汇总：按标的编排以上步骤

pub mod aggregator;
pub mod anomaly;
pub mod correlation;
pub mod merger;
pub mod profile;
pub mod stats;
pub mod summary;
pub mod validation;
pub mod volatility;

pub use aggregator::{aggregate, SentimentBucket};
pub use anomaly::{detect_spikes, Anomaly, DetectorParams};
pub use correlation::{correlate, correlate_with_lag, leading_correlation, CorrelationResult};
pub use merger::{merge, MergedRecord};
pub use profile::{profile_events, sentiment_momentum, top_mentions, Mention, Polarity, SentimentProfile};
pub use summary::{summarize, InstrumentSummary, SummaryBuilder};
pub use volatility::sentiment_volatility;
