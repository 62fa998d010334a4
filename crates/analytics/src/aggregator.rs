//! 情绪事件分桶聚合
//!
//! 把不规则到达的情绪事件按固定宽度重采样，桶为半开区间
//! `[bucket_start, bucket_start + width)`，`bucket_start` 由事件时间戳
//! 向下截断到 Unix 纪元起 `width` 的整数倍得到，与到达顺序无关。

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sentiment_quant_common::utils::truncate_to_bucket;
use sentiment_quant_common::SentimentEvent;
use tracing::{debug, warn};

/// 情绪桶
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentBucket {
    pub instrument_id: String,
    pub bucket_start: DateTime<Utc>,
    pub avg_sentiment: f64,
    pub avg_confidence: f64,
    pub event_count: usize,
}

impl SentimentBucket {
    /// 中性填充：没有事件的桶记为零情绪、零计数（不是缺失标记）
    pub fn neutral(instrument_id: &str, bucket_start: DateTime<Utc>) -> Self {
        Self {
            instrument_id: instrument_id.to_string(),
            bucket_start,
            avg_sentiment: 0.0,
            avg_confidence: 0.0,
            event_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.event_count == 0
    }
}

/// 单桶累加器
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct BucketAcc {
    pub score_sum: f64,
    pub confidence_sum: f64,
    pub count: usize,
}

impl BucketAcc {
    pub fn mean_score(&self) -> f64 {
        self.score_sum / self.count as f64
    }

    pub fn mean_confidence(&self) -> f64 {
        self.confidence_sum / self.count as f64
    }
}

/// 按桶起点（毫秒）累加指定标的的事件，仅包含有事件的桶
pub(crate) fn accumulate(
    events: &[SentimentEvent],
    instrument_id: &str,
    bucket_width: TimeDelta,
) -> BTreeMap<i64, BucketAcc> {
    let mut buckets: BTreeMap<i64, BucketAcc> = BTreeMap::new();
    for event in events.iter().filter(|e| e.instrument_id() == instrument_id) {
        let start = match truncate_to_bucket(event.timestamp(), bucket_width) {
            Ok(start) => start,
            Err(e) => {
                warn!("事件分桶失败 {} @ {}: {}", instrument_id, event.timestamp(), e);
                continue;
            }
        };
        let acc = buckets.entry(start.timestamp_millis()).or_default();
        acc.score_sum += event.score();
        acc.confidence_sum += event.confidence();
        acc.count += 1;
    }
    buckets
}

/// 连续网格的桶数上限，超出时不再中性填充
pub const MAX_GRID_BUCKETS: i64 = 100_000;

/// 首个到最后一个有事件的桶之间的全部桶起点（毫秒）
///
/// 跨度超过 [`MAX_GRID_BUCKETS`] 时只返回有事件的桶。
pub(crate) fn bucket_grid(
    buckets: &BTreeMap<i64, BucketAcc>,
    bucket_width: TimeDelta,
) -> Vec<i64> {
    let width_ms = bucket_width.num_milliseconds();
    match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(&first), Some(&last)) if width_ms > 0 => {
            let steps = (last - first) / width_ms;
            if steps >= MAX_GRID_BUCKETS {
                warn!(
                    "桶网格过大({} 个, 宽度 {}), 跳过中性填充, 仅保留 {} 个有事件的桶",
                    steps + 1,
                    bucket_width,
                    buckets.len()
                );
                return buckets.keys().copied().collect();
            }
            (0..=steps).map(|i| first + i * width_ms).collect()
        }
        _ => vec![],
    }
}

/// 聚合指定标的的情绪事件
///
/// - 标的不匹配的事件被排除
/// - 无事件时返回空序列（"没有情绪数据"，区别于"零情绪"）
/// - 输出按桶起点升序，覆盖首末事件桶之间的全部区间，中间空桶中性填充
pub fn aggregate(
    events: &[SentimentEvent],
    instrument_id: &str,
    bucket_width: TimeDelta,
) -> Vec<SentimentBucket> {
    if bucket_width <= TimeDelta::zero() {
        warn!("bucket_width 非正({}), 跳过聚合: {}", bucket_width, instrument_id);
        return vec![];
    }

    let accs = accumulate(events, instrument_id, bucket_width);
    let grid = bucket_grid(&accs, bucket_width);

    let buckets: Vec<SentimentBucket> = grid
        .into_iter()
        .filter_map(|start_ms| {
            let bucket_start = DateTime::from_timestamp_millis(start_ms)?;
            Some(match accs.get(&start_ms) {
                Some(acc) => SentimentBucket {
                    instrument_id: instrument_id.to_string(),
                    bucket_start,
                    avg_sentiment: acc.mean_score(),
                    avg_confidence: acc.mean_confidence(),
                    event_count: acc.count,
                },
                None => SentimentBucket::neutral(instrument_id, bucket_start),
            })
        })
        .collect();

    debug!(
        "aggregate {}: {} 个有效桶, 共 {} 个桶",
        instrument_id,
        accs.len(),
        buckets.len()
    );
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap()
    }

    fn event(id: &str, ts: DateTime<Utc>, score: f64, confidence: f64) -> SentimentEvent {
        SentimentEvent::new(id, ts, score, confidence, "Twitter", "post")
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(aggregate(&[], "AAPL", TimeDelta::hours(1)).is_empty());
    }

    #[test]
    fn events_in_one_bucket_average_to_one_bucket() {
        let events = vec![
            event("AAPL", at(10, 5), 0.2, 0.4),
            event("AAPL", at(10, 59), -0.4, 0.8),
            event("AAPL", at(10, 30), 0.5, 0.6),
        ];
        let buckets = aggregate(&events, "AAPL", TimeDelta::hours(1));
        assert_eq!(buckets.len(), 1);
        let b = &buckets[0];
        assert_eq!(b.bucket_start, at(10, 0));
        assert_eq!(b.event_count, 3);
        assert_abs_diff_eq!(b.avg_sentiment, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(b.avg_confidence, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn other_instruments_are_excluded() {
        let events = vec![event("AAPL", at(9, 0), 0.3, 0.3), event("AAPLX", at(9, 10), -1.0, 1.0)];
        let buckets = aggregate(&events, "AAPL", TimeDelta::hours(1));
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].event_count, 1);
        assert!(aggregate(&events, "MSFT", TimeDelta::hours(1)).is_empty());
    }

    #[test]
    fn interior_gaps_are_neutral_filled_in_order() {
        let events = vec![event("TSLA", at(13, 20), -0.5, 0.5), event("TSLA", at(10, 1), 0.5, 0.5)];
        let buckets = aggregate(&events, "TSLA", TimeDelta::hours(1));
        let starts: Vec<_> = buckets.iter().map(|b| b.bucket_start).collect();
        assert_eq!(starts, vec![at(10, 0), at(11, 0), at(12, 0), at(13, 0)]);
        assert!(buckets[1].is_empty());
        assert_eq!(buckets[1], SentimentBucket::neutral("TSLA", at(11, 0)));
        assert_eq!(buckets[3].avg_sentiment, -0.5);
    }

    #[test]
    fn result_is_independent_of_arrival_order() {
        let mut events = vec![
            event("MSFT", at(9, 15), 0.1, 0.1),
            event("MSFT", at(11, 45), 0.9, 0.9),
            event("MSFT", at(9, 50), -0.3, 0.3),
        ];
        let forward = aggregate(&events, "MSFT", TimeDelta::minutes(30));
        events.reverse();
        let backward = aggregate(&events, "MSFT", TimeDelta::minutes(30));
        assert_eq!(forward, backward);
        assert_eq!(forward.first().map(|b| b.bucket_start), Some(at(9, 0)));
        assert_eq!(forward.last().map(|b| b.bucket_start), Some(at(11, 30)));
    }

    #[test]
    fn oversized_grid_keeps_only_occupied_buckets() {
        // 1 秒桶宽跨一年约 3100 万个桶
        let later = at(9, 0) + TimeDelta::days(365);
        let events = vec![event("AAPL", at(9, 0), 0.3, 0.3), event("AAPL", later, -0.3, 0.3)];
        let buckets = aggregate(&events, "AAPL", TimeDelta::seconds(1));
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].bucket_start, at(9, 0));
        assert_eq!(buckets[1].bucket_start, later);
        assert!(buckets.iter().all(|b| !b.is_empty()));

        // 上限以内仍然连续填充
        let near = vec![event("AAPL", at(9, 0), 0.3, 0.3), event("AAPL", at(9, 0) + TimeDelta::seconds(9), 0.1, 0.1)];
        assert_eq!(aggregate(&near, "AAPL", TimeDelta::seconds(1)).len(), 10);
    }

    #[test]
    fn non_positive_width_yields_empty() {
        let events = vec![event("AAPL", at(9, 0), 0.3, 0.3)];
        assert!(aggregate(&events, "AAPL", TimeDelta::zero()).is_empty());
    }
}
