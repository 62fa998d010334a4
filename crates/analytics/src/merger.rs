//! 价格序列与情绪桶的左连接

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sentiment_quant_common::PriceBar;
use tracing::debug;

use crate::aggregator::SentimentBucket;

/// 合并记录：价格 K 线字段 + 对齐的情绪桶字段 + 收益率
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedRecord {
    pub instrument_id: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub avg_sentiment: f64,
    pub avg_confidence: f64,
    pub event_count: usize,
    /// close[i] / close[i-1] - 1；首条记录为 NaN，序列化为 null
    #[serde(with = "nan_as_null")]
    pub price_return: f64,
}

// JSON 没有 NaN，缺失收益率与 null 互转
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

impl MergedRecord {
    pub fn price_return_opt(&self) -> Option<f64> {
        if self.price_return.is_nan() {
            None
        } else {
            Some(self.price_return)
        }
    }

    /// 该 K 线是否命中了实际的情绪数据（而不是中性填充）
    pub fn has_sentiment(&self) -> bool {
        self.event_count > 0
    }
}

/// 左连接：每根匹配标的的 K 线恰好输出一条记录
///
/// 情绪桶按 `bucket_start == bar.timestamp` 精确匹配，未命中的 K 线使用中性填充。
/// 输入 K 线需已按时间升序排列。
pub fn merge(
    prices: &[PriceBar],
    buckets: &[SentimentBucket],
    instrument_id: &str,
) -> Vec<MergedRecord> {
    let by_start: HashMap<DateTime<Utc>, &SentimentBucket> = buckets
        .iter()
        .filter(|b| b.instrument_id == instrument_id)
        .map(|b| (b.bucket_start, b))
        .collect();

    let mut prev_close: Option<f64> = None;
    let mut matched = 0usize;
    let merged: Vec<MergedRecord> = prices
        .iter()
        .filter(|bar| bar.instrument_id() == instrument_id)
        .map(|bar| {
            let (avg_sentiment, avg_confidence, event_count) = match by_start.get(&bar.timestamp()) {
                Some(b) => {
                    matched += 1;
                    (b.avg_sentiment, b.avg_confidence, b.event_count)
                }
                None => (0.0, 0.0, 0),
            };
            let price_return = match prev_close {
                Some(prev) => bar.close() / prev - 1.0,
                None => f64::NAN,
            };
            prev_close = Some(bar.close());

            MergedRecord {
                instrument_id: instrument_id.to_string(),
                timestamp: bar.timestamp(),
                open: bar.open(),
                high: bar.high(),
                low: bar.low(),
                close: bar.close(),
                volume: bar.volume(),
                avg_sentiment,
                avg_confidence,
                event_count,
                price_return,
            }
        })
        .collect();

    debug!(
        "merge {}: {} 条记录, {} 条命中情绪桶",
        instrument_id,
        merged.len(),
        matched
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, 0, 0).unwrap()
    }

    fn bar(id: &str, h: u32, close: f64) -> PriceBar {
        PriceBar::new(id, hour(h), close, close, close, close, 1_000.0)
    }

    fn bucket(id: &str, h: u32, avg: f64, count: usize) -> SentimentBucket {
        SentimentBucket {
            instrument_id: id.to_string(),
            bucket_start: hour(h),
            avg_sentiment: avg,
            avg_confidence: avg.abs(),
            event_count: count,
        }
    }

    #[test]
    fn empty_prices_yield_empty_output() {
        let buckets = vec![bucket("AAPL", 9, 0.5, 2)];
        assert!(merge(&[], &buckets, "AAPL").is_empty());
    }

    #[test]
    fn price_returns_are_close_to_close() {
        let prices = vec![bar("AAPL", 9, 100.0), bar("AAPL", 10, 101.0), bar("AAPL", 11, 99.0)];
        let merged = merge(&prices, &[], "AAPL");
        assert_eq!(merged.len(), 3);
        assert!(merged[0].price_return.is_nan());
        assert_eq!(merged[0].price_return_opt(), None);
        assert_eq!(merged[1].price_return, 101.0 / 100.0 - 1.0);
        assert_eq!(merged[2].price_return, 99.0 / 101.0 - 1.0);
        assert_abs_diff_eq!(merged[2].price_return, -0.019_801_98, epsilon = 1e-8);
    }

    #[test]
    fn missing_return_survives_json_as_null() {
        let prices = vec![bar("AAPL", 9, 100.0), bar("AAPL", 10, 101.0)];
        let merged = merge(&prices, &[], "AAPL");
        let json = serde_json::to_string(&merged).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value[0]["price_return"].is_null());
        assert_abs_diff_eq!(value[1]["price_return"].as_f64().unwrap(), 0.01, epsilon = 1e-12);

        let back: Vec<MergedRecord> = serde_json::from_str(&json).unwrap();
        assert!(back[0].price_return.is_nan());
        assert_abs_diff_eq!(back[1].price_return, merged[1].price_return, epsilon = 1e-12);
        assert_eq!(back[1].timestamp, hour(10));
    }

    #[test]
    fn unmatched_bars_are_neutral_filled() {
        let prices = vec![bar("MSFT", 9, 10.0), bar("MSFT", 10, 11.0), bar("MSFT", 11, 12.0)];
        let buckets = vec![bucket("MSFT", 10, 0.4, 3), bucket("MSFT", 13, 0.9, 1)];
        let merged = merge(&prices, &buckets, "MSFT");
        assert_eq!(merged.len(), prices.len());
        assert!(!merged[0].has_sentiment());
        assert_eq!(merged[0].avg_sentiment, 0.0);
        assert_eq!(merged[1].avg_sentiment, 0.4);
        assert_eq!(merged[1].event_count, 3);
        assert_eq!(merged[2].avg_confidence, 0.0);
    }

    #[test]
    fn misaligned_buckets_silently_miss() {
        let prices = vec![bar("TSLA", 9, 10.0), bar("TSLA", 10, 11.0)];
        let shifted = SentimentBucket {
            bucket_start: hour(9) + TimeDelta::minutes(30),
            ..bucket("TSLA", 9, 0.7, 1)
        };
        let merged = merge(&prices, &[shifted], "TSLA");
        assert!(merged.iter().all(|r| !r.has_sentiment()));
    }

    #[test]
    fn other_instruments_are_ignored_on_both_sides() {
        let prices = vec![bar("AAPL", 9, 10.0), bar("GOOGL", 9, 20.0), bar("AAPL", 10, 12.0)];
        let buckets = vec![bucket("GOOGL", 10, -0.5, 1)];
        let merged = merge(&prices, &buckets, "AAPL");
        assert_eq!(merged.len(), 2);
        assert_abs_diff_eq!(merged[1].price_return, 0.2, epsilon = 1e-12);
        assert!(merged.iter().all(|r| r.event_count == 0));
    }
}
