//! 情绪与收益的同期 / 领先相关性

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::merger::MergedRecord;
use crate::stats::{pearson, pearson_p_value};

/// 显著性阈值，p ≥ 0.05 视为不显著（固定约定，不可配置）
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;
/// 计算相关性所需的最少有效配对数
pub const MIN_PAIRED_OBSERVATIONS: usize = 2;
pub const DEFAULT_LEADING_LAG: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub contemporaneous_corr: f64,
    pub contemporaneous_pvalue: f64,
    pub leading_corr: f64,
    pub leading_lag: usize,
    pub volume_corr: f64,
}

impl CorrelationResult {
    /// 样本不足时的固定返回值：相关系数 0，p 值 1
    pub fn degenerate(leading_lag: usize) -> Self {
        Self {
            contemporaneous_corr: 0.0,
            contemporaneous_pvalue: 1.0,
            leading_corr: 0.0,
            leading_lag,
            volume_corr: 0.0,
        }
    }

    pub fn is_significant(&self) -> bool {
        self.contemporaneous_pvalue < SIGNIFICANCE_LEVEL
    }
}

/// 同期相关性，领先相关使用默认滞后 1
pub fn correlate(merged: &[MergedRecord]) -> CorrelationResult {
    correlate_with_lag(merged, DEFAULT_LEADING_LAG)
}

pub fn correlate_with_lag(merged: &[MergedRecord], lag: usize) -> CorrelationResult {
    let valid: Vec<&MergedRecord> = merged
        .iter()
        .filter(|r| r.avg_sentiment.is_finite() && r.price_return.is_finite())
        .collect();

    if valid.len() < MIN_PAIRED_OBSERVATIONS {
        debug!("有效配对 {} < {}, 返回退化结果", valid.len(), MIN_PAIRED_OBSERVATIONS);
        return CorrelationResult::degenerate(lag);
    }

    let sentiment: Vec<f64> = valid.iter().map(|r| r.avg_sentiment).collect();
    let returns: Vec<f64> = valid.iter().map(|r| r.price_return).collect();
    let volume: Vec<f64> = valid.iter().map(|r| r.volume).collect();

    let (contemporaneous_corr, contemporaneous_pvalue) = match pearson(&sentiment, &returns) {
        Some(r) => (r, pearson_p_value(r, valid.len())),
        None => (0.0, 1.0),
    };
    let volume_corr = pearson(&sentiment, &volume).unwrap_or(0.0);
    let leading_corr = leading_correlation(merged, lag);

    debug!(
        "correlate: n={}, r={:.4}, p={:.4}, leading(lag={})={:.4}, volume={:.4}",
        valid.len(),
        contemporaneous_corr,
        contemporaneous_pvalue,
        lag,
        leading_corr,
        volume_corr
    );

    CorrelationResult {
        contemporaneous_corr,
        contemporaneous_pvalue,
        leading_corr,
        leading_lag: lag,
        volume_corr,
    }
}

/// 领先相关：t 时刻情绪与 t+lag 时刻收益配对
///
/// 序列边界上缺失的配对被丢弃；有效配对少于 2 个时返回 0。
pub fn leading_correlation(merged: &[MergedRecord], lag: usize) -> f64 {
    if lag >= merged.len() {
        return 0.0;
    }
    let (sentiment, returns): (Vec<f64>, Vec<f64>) = merged
        .iter()
        .zip(merged.iter().skip(lag))
        .map(|(now, later)| (now.avg_sentiment, later.price_return))
        .filter(|(s, r)| s.is_finite() && r.is_finite())
        .unzip();

    if sentiment.len() < MIN_PAIRED_OBSERVATIONS {
        return 0.0;
    }
    pearson(&sentiment, &returns).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    fn record(i: i64, sentiment: f64, price_return: f64, volume: f64) -> MergedRecord {
        let base: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        MergedRecord {
            instrument_id: "AAPL".to_string(),
            timestamp: base + TimeDelta::hours(i),
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
            volume,
            avg_sentiment: sentiment,
            avg_confidence: sentiment.abs(),
            event_count: 1,
            price_return,
        }
    }

    #[test]
    fn fewer_than_two_pairs_is_degenerate() {
        assert_eq!(correlate(&[]), CorrelationResult::degenerate(1));

        let one = vec![record(0, 0.3, f64::NAN, 10.0), record(1, 0.5, 0.01, 20.0)];
        let result = correlate(&one);
        assert_eq!(result.contemporaneous_corr, 0.0);
        assert_eq!(result.leading_corr, 0.0);
        assert_eq!(result.volume_corr, 0.0);
        assert_eq!(result.contemporaneous_pvalue, 1.0);
        assert!(!result.is_significant());
    }

    #[test]
    fn perfect_linear_relation_is_significant() {
        let returns = [0.01, -0.02, 0.015, 0.03, -0.005, 0.002];
        let merged: Vec<_> = returns
            .iter()
            .enumerate()
            .map(|(i, r)| record(i as i64, *r, *r, 1_000.0 + i as f64))
            .collect();
        let result = correlate(&merged);
        assert_abs_diff_eq!(result.contemporaneous_corr, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.contemporaneous_pvalue, 0.0, epsilon = 1e-6);
        assert!(result.is_significant());
    }

    #[test]
    fn two_pairs_give_exact_unit_correlation_and_unit_p() {
        let merged = vec![
            record(0, 0.1, f64::NAN, 10.0),
            record(1, -0.1, 0.01, 20.0),
            record(2, 0.2, 99.0 / 101.0 - 1.0, 30.0),
        ];
        let result = correlate(&merged);
        assert_eq!(result.contemporaneous_corr, -1.0);
        assert_eq!(result.contemporaneous_pvalue, 1.0);
        assert_eq!(result.volume_corr, 1.0);
    }

    #[test]
    fn constant_sentiment_has_no_correlation() {
        let merged: Vec<_> = (0..5)
            .map(|i| record(i, 0.0, 0.01 * i as f64, 100.0 * i as f64))
            .collect();
        let result = correlate(&merged);
        assert_eq!(result.contemporaneous_corr, 0.0);
        assert_eq!(result.contemporaneous_pvalue, 1.0);
        assert_eq!(result.volume_corr, 0.0);
    }

    #[test]
    fn leading_pairs_sentiment_with_future_return() {
        // 情绪领先一个桶：s[i] == r[i+1]
        let sentiment = [0.5, -0.3, 0.8, 0.1, -0.6, 0.4, 0.0];
        let merged: Vec<_> = (0..sentiment.len())
            .map(|i| {
                let r = if i == 0 { f64::NAN } else { sentiment[i - 1] };
                record(i as i64, sentiment[i], r, 1.0)
            })
            .collect();
        assert_abs_diff_eq!(leading_correlation(&merged, 1), 1.0, epsilon = 1e-9);
        let result = correlate_with_lag(&merged, 1);
        assert_eq!(result.leading_lag, 1);
        assert_abs_diff_eq!(result.leading_corr, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn lag_beyond_series_is_zero() {
        let merged: Vec<_> = (0..3).map(|i| record(i, i as f64, 0.1 * i as f64, 1.0)).collect();
        assert_eq!(leading_correlation(&merged, 3), 0.0);
        assert_eq!(leading_correlation(&merged, 2), 0.0);
    }
}
