//! 按标的汇总：依次执行聚合、合并、相关性、异常检测

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use sentiment_quant_common::{PriceBar, Result, SentimentEvent};
use sentiment_quant_core::config::AnalysisConfig;
use tracing::{debug, info};

use crate::aggregator::aggregate;
use crate::anomaly::{detect_spikes, Anomaly, DetectorParams};
use crate::correlation::{correlate_with_lag, CorrelationResult};
use crate::merger::{merge, MergedRecord};
use crate::profile::{profile_events, sentiment_momentum, top_mentions, Mention, Polarity, SentimentProfile};
use crate::stats::mean;
use crate::validation::{check_bucket_alignment, validate_events, validate_prices};
use crate::volatility::sentiment_volatility;

/// 情绪动量的近期窗口（小时）
pub const MOMENTUM_WINDOW_HOURS: i64 = 24;
/// 汇总中保留的正面 / 负面代表性帖子数
pub const TOP_MENTIONS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub instrument_id: String,
    /// 时间上最后一条事件的分数，无事件时为 0
    pub latest_sentiment: f64,
    /// 原始事件的均值（不经分桶，避免中性填充拉向 0）
    pub avg_sentiment: f64,
    pub sentiment_volatility: f64,
    /// 最近 24 小时相对此前的情绪均值变化（百分比）
    pub momentum: f64,
    pub correlation: CorrelationResult,
    pub anomalies: Vec<Anomaly>,
    pub spike_count: usize,
    pub profile: Option<SentimentProfile>,
    pub top_positive: Vec<Mention>,
    pub top_negative: Vec<Mention>,
    pub merged: Vec<MergedRecord>,
}

/// 汇总构建器，持有一份已校验的分析参数
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    config: AnalysisConfig,
}

impl SummaryBuilder {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn detector_params(&self) -> DetectorParams {
        DetectorParams {
            window_size: self.config.rolling_window_size,
            min_periods: self.config.min_periods,
            threshold: self.config.anomaly_threshold,
        }
    }

    /// 输入校验和桶宽对齐检查失败时直接返回错误；之后的计算不会失败，
    /// 各子结果在数据不足时保持各自的退化约定。
    pub fn summarize(
        &self,
        instrument_id: &str,
        prices: &[PriceBar],
        events: &[SentimentEvent],
    ) -> Result<InstrumentSummary> {
        let prices: Vec<PriceBar> = prices
            .iter()
            .filter(|bar| bar.instrument_id() == instrument_id)
            .cloned()
            .collect();
        let events: Vec<SentimentEvent> = events
            .iter()
            .filter(|e| e.instrument_id() == instrument_id)
            .cloned()
            .collect();

        validate_prices(&prices)?;
        validate_events(&events)?;
        check_bucket_alignment(&prices, self.config.bucket_width)?;

        let buckets = aggregate(&events, instrument_id, self.config.bucket_width);
        let merged = merge(&prices, &buckets, instrument_id);
        let correlation = correlate_with_lag(&merged, self.config.leading_lag);
        let anomalies = detect_spikes(&events, instrument_id, &self.detector_params());
        debug!(
            "summarize {}: {} 根 K 线, {} 条事件, {} 个桶",
            instrument_id,
            prices.len(),
            events.len(),
            buckets.len()
        );

        let latest_sentiment = events
            .iter()
            .max_by_key(|e| e.timestamp())
            .map(|e| e.score())
            .unwrap_or(0.0);
        let scores: Vec<f64> = events.iter().map(|e| e.score()).collect();
        let avg_sentiment = mean(&scores).unwrap_or(0.0);
        // 波动率固定按小时重采样，与分桶宽度无关
        let volatility = sentiment_volatility(
            &events,
            instrument_id,
            TimeDelta::hours(1),
            self.config.volatility_window_hours,
        );

        let summary = InstrumentSummary {
            instrument_id: instrument_id.to_string(),
            latest_sentiment,
            avg_sentiment,
            sentiment_volatility: volatility,
            momentum: sentiment_momentum(&events, instrument_id, MOMENTUM_WINDOW_HOURS),
            correlation,
            spike_count: anomalies.len(),
            anomalies,
            profile: profile_events(&events, instrument_id),
            top_positive: top_mentions(&events, instrument_id, TOP_MENTIONS, Polarity::Positive),
            top_negative: top_mentions(&events, instrument_id, TOP_MENTIONS, Polarity::Negative),
            merged,
        };
        info!(
            "{} 汇总完成: avg={:.3}, r={:.3}, p={:.3}, 异常 {}",
            instrument_id,
            summary.avg_sentiment,
            summary.correlation.contemporaneous_corr,
            summary.correlation.contemporaneous_pvalue,
            summary.spike_count
        );
        Ok(summary)
    }
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }
}

/// 使用默认参数汇总
pub fn summarize(
    instrument_id: &str,
    prices: &[PriceBar],
    events: &[SentimentEvent],
) -> Result<InstrumentSummary> {
    SummaryBuilder::default().summarize(instrument_id, prices, events)
}
