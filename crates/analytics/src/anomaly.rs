//! 情绪突变检测（滚动 z-score）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sentiment_quant_common::SentimentEvent;
use tracing::debug;

use crate::stats::{mean, population_std, STD_EPSILON};

/// 少于此事件数时样本过小，不做检测
pub const MIN_EVENTS_FOR_DETECTION: usize = 10;

/// 滚动窗口参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorParams {
    pub window_size: usize,
    pub min_periods: usize,
    pub threshold: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            window_size: 20,
            min_periods: 1,
            threshold: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub timestamp: DateTime<Utc>,
    pub sentiment_score: f64,
    pub z_score: f64,
    pub source_text: String,
}

/// 检测情绪突变
///
/// 事件按时间升序（稳定排序）后，对每个位置计算包含自身在内、最近
/// `window_size` 个事件的均值和总体标准差；|z| 严格大于阈值即为异常。
/// 观测数不足 `min_periods` 或标准差为零的位置没有 z 值，永远不会被标记。
pub fn detect_spikes(
    events: &[SentimentEvent],
    instrument_id: &str,
    params: &DetectorParams,
) -> Vec<Anomaly> {
    let mut series: Vec<&SentimentEvent> = events
        .iter()
        .filter(|e| e.instrument_id() == instrument_id)
        .collect();
    if series.len() < MIN_EVENTS_FOR_DETECTION {
        debug!(
            "detect_spikes {}: 事件数 {} < {}, 跳过",
            instrument_id,
            series.len(),
            MIN_EVENTS_FOR_DETECTION
        );
        return vec![];
    }
    series.sort_by_key(|e| e.timestamp());

    let scores: Vec<f64> = series.iter().map(|e| e.score()).collect();
    let window = params.window_size.max(1);
    let min_periods = params.min_periods.max(1);

    let anomalies: Vec<Anomaly> = series
        .iter()
        .enumerate()
        .filter_map(|(i, event)| {
            let z = rolling_z_score(&scores, i, window, min_periods)?;
            (z.abs() > params.threshold).then(|| Anomaly {
                timestamp: event.timestamp(),
                sentiment_score: event.score(),
                z_score: z,
                source_text: event.text().to_string(),
            })
        })
        .collect();

    debug!(
        "detect_spikes {}: {} 个事件, {} 个异常",
        instrument_id,
        scores.len(),
        anomalies.len()
    );
    anomalies
}

fn rolling_z_score(scores: &[f64], i: usize, window: usize, min_periods: usize) -> Option<f64> {
    let start = (i + 1).saturating_sub(window);
    let slice = &scores[start..=i];
    if slice.len() < min_periods {
        return None;
    }
    let std = population_std(slice)?;
    if !std.is_finite() || std < STD_EPSILON {
        return None;
    }
    let m = mean(slice)?;
    Some((scores[i] - m) / std)
}
