//! 单标的情绪画像：分布、动量、代表性帖子

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sentiment_quant_ai_analysis::SentimentLabel;
use sentiment_quant_common::SentimentEvent;

use crate::stats::{mean, sample_std};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentProfile {
    pub instrument_id: String,
    pub avg_sentiment: f64,
    /// 样本标准差，少于 2 个事件时为 0
    pub sentiment_std: f64,
    pub total_mentions: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
}

impl SentimentProfile {
    pub fn dominant_label(&self) -> SentimentLabel {
        if self.positive_count > self.negative_count && self.positive_count > self.neutral_count {
            SentimentLabel::Positive
        } else if self.negative_count > self.positive_count && self.negative_count > self.neutral_count {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

pub fn profile_events(events: &[SentimentEvent], instrument_id: &str) -> Option<SentimentProfile> {
    let scores: Vec<f64> = events
        .iter()
        .filter(|e| e.instrument_id() == instrument_id)
        .map(|e| e.score())
        .collect();
    let avg_sentiment = mean(&scores)?;

    let total = scores.len();
    let (mut positive_count, mut negative_count) = (0, 0);
    for score in &scores {
        match SentimentLabel::from_score(*score) {
            SentimentLabel::Positive => positive_count += 1,
            SentimentLabel::Negative => negative_count += 1,
            SentimentLabel::Neutral => {}
        }
    }

    Some(SentimentProfile {
        instrument_id: instrument_id.to_string(),
        avg_sentiment,
        sentiment_std: sample_std(&scores).unwrap_or(0.0),
        total_mentions: total,
        positive_count,
        negative_count,
        neutral_count: total - positive_count - negative_count,
        positive_ratio: positive_count as f64 / total as f64,
        negative_ratio: negative_count as f64 / total as f64,
    })
}

/// 情绪动量（百分比变化）
///
/// 以最新事件时间为基准，`window_hours` 小时内为近期，其余为前期；
/// 任一侧为空或前期均值为 0 时返回 0。
pub fn sentiment_momentum(events: &[SentimentEvent], instrument_id: &str, window_hours: i64) -> f64 {
    let series: Vec<&SentimentEvent> = events
        .iter()
        .filter(|e| e.instrument_id() == instrument_id)
        .collect();
    let Some(latest) = series.iter().map(|e| e.timestamp()).max() else {
        return 0.0;
    };
    let cutoff = latest - TimeDelta::hours(window_hours);

    let (recent, previous): (Vec<&SentimentEvent>, Vec<&SentimentEvent>) =
        series.into_iter().partition(|e| e.timestamp() > cutoff);
    let recent: Vec<f64> = recent.iter().map(|e| e.score()).collect();
    let previous: Vec<f64> = previous.iter().map(|e| e.score()).collect();

    match (mean(&recent), mean(&previous)) {
        (Some(r), Some(p)) if p != 0.0 => (r - p) / p.abs() * 100.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub score: f64,
    pub source_label: String,
}

/// 情绪最强的 n 条帖子：正面按分数降序，负面按分数升序
pub fn top_mentions(
    events: &[SentimentEvent],
    instrument_id: &str,
    n: usize,
    polarity: Polarity,
) -> Vec<Mention> {
    let mut series: Vec<&SentimentEvent> = events
        .iter()
        .filter(|e| e.instrument_id() == instrument_id)
        .collect();
    match polarity {
        Polarity::Positive => series.sort_by(|a, b| b.score().total_cmp(&a.score())),
        Polarity::Negative => series.sort_by(|a, b| a.score().total_cmp(&b.score())),
    }
    series
        .into_iter()
        .take(n)
        .map(|e| Mention {
            timestamp: e.timestamp(),
            text: e.text().to_string(),
            score: e.score(),
            source_label: e.source_label().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    fn event(id: &str, hour: i64, score: f64, text: &str) -> SentimentEvent {
        let base = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        SentimentEvent::new(id, base + TimeDelta::hours(hour), score, score.abs(), "Twitter", text)
    }

    #[test]
    fn profile_counts_categories_at_point_two() {
        let events = vec![
            event("AAPL", 0, 0.5, "a"),
            event("AAPL", 1, 0.2, "b"),
            event("AAPL", 2, -0.21, "c"),
            event("AAPL", 3, 0.0, "d"),
            event("MSFT", 3, 0.9, "e"),
        ];
        let p = profile_events(&events, "AAPL").unwrap();
        assert_eq!(p.total_mentions, 4);
        assert_eq!(p.positive_count, 1);
        assert_eq!(p.negative_count, 1);
        assert_eq!(p.neutral_count, 2);
        assert_abs_diff_eq!(p.positive_ratio, 0.25);
        assert_abs_diff_eq!(p.avg_sentiment, 0.1225, epsilon = 1e-12);
        assert_eq!(p.dominant_label(), SentimentLabel::Neutral);
        assert!(profile_events(&events, "TSLA").is_none());
    }

    #[test]
    fn single_event_profile_has_zero_std() {
        let p = profile_events(&[event("AAPL", 0, 0.7, "x")], "AAPL").unwrap();
        assert_eq!(p.sentiment_std, 0.0);
        assert_eq!(p.dominant_label(), SentimentLabel::Positive);
    }

    #[test]
    fn momentum_compares_recent_window_to_history() {
        let events = vec![
            event("AAPL", 0, 0.2, ""),
            event("AAPL", 1, 0.2, ""),
            event("AAPL", 30, 0.3, ""),
            event("AAPL", 40, 0.3, ""),
        ];
        // cutoff = 40h - 24h = 16h：近期 0.3，前期 0.2
        assert_abs_diff_eq!(sentiment_momentum(&events, "AAPL", 24), 50.0, epsilon = 1e-9);
        assert_eq!(sentiment_momentum(&events, "AAPL", 100), 0.0);
        assert_eq!(sentiment_momentum(&[], "AAPL", 24), 0.0);
    }

    #[test]
    fn momentum_uses_absolute_previous_mean() {
        let events = vec![event("TSLA", 0, -0.4, ""), event("TSLA", 48, -0.2, "")];
        assert_abs_diff_eq!(sentiment_momentum(&events, "TSLA", 24), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn top_mentions_order_by_polarity() {
        let events = vec![
            event("AAPL", 0, 0.1, "meh"),
            event("AAPL", 1, 0.9, "moon"),
            event("AAPL", 2, -0.8, "crash"),
            event("AAPL", 3, 0.5, "nice"),
        ];
        let best: Vec<_> = top_mentions(&events, "AAPL", 2, Polarity::Positive)
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(best, vec!["moon", "nice"]);
        let worst = top_mentions(&events, "AAPL", 1, Polarity::Negative);
        assert_eq!(worst[0].text, "crash");
        assert_eq!(worst[0].source_label, "Twitter");
    }
}
