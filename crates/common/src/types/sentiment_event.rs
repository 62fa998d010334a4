use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};

/// 情绪事件（一条社交媒体帖子 / 新闻的打分结果）
///
/// 到达顺序无保证，同一时间戳可能有多条事件。构造后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentEvent {
    instrument_id: String,
    timestamp: DateTime<Utc>,
    /// 情绪分数，约定范围 [-1, 1]
    score: f64,
    /// 置信度，约定范围 [0, 1]
    confidence: f64,
    /// 来源标签，如 Twitter / Reddit / News
    source_label: String,
    text: String,
}

impl SentimentEvent {
    /// 直接构造，不做范围校验（范围校验见 [`SentimentEvent::validate`]）
    pub fn new(
        instrument_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        score: f64,
        confidence: f64,
        source_label: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            timestamp,
            score,
            confidence,
            source_label: source_label.into(),
            text: text.into(),
        }
    }

    pub fn builder() -> SentimentEventBuilder {
        SentimentEventBuilder::default()
    }

    pub fn instrument_id(&self) -> &str { &self.instrument_id }
    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
    pub fn score(&self) -> f64 { self.score }
    pub fn confidence(&self) -> f64 { self.confidence }
    pub fn source_label(&self) -> &str { &self.source_label }
    pub fn text(&self) -> &str { &self.text }

    /// 打分器契约：score ∈ [-1, 1]，confidence ∈ [0, 1]
    pub fn validate(&self) -> Result<()> {
        if !self.score.is_finite() || !(-1.0..=1.0).contains(&self.score) {
            return Err(AppError::validation(format!(
                "{} @ {}: 情绪分数越界 {}",
                self.instrument_id, self.timestamp, self.score
            )));
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(AppError::validation(format!(
                "{} @ {}: 置信度越界 {}",
                self.instrument_id, self.timestamp, self.confidence
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SentimentEventBuilder {
    instrument_id: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    score: Option<f64>,
    confidence: Option<f64>,
    source_label: Option<String>,
    text: Option<String>,
}

impl SentimentEventBuilder {
    pub fn instrument_id(mut self, val: impl Into<String>) -> Self { self.instrument_id = Some(val.into()); self }
    pub fn timestamp(mut self, val: DateTime<Utc>) -> Self { self.timestamp = Some(val); self }
    pub fn score(mut self, val: f64) -> Self { self.score = Some(val); self }
    pub fn confidence(mut self, val: f64) -> Self { self.confidence = Some(val); self }
    pub fn source_label(mut self, val: impl Into<String>) -> Self { self.source_label = Some(val.into()); self }
    pub fn text(mut self, val: impl Into<String>) -> Self { self.text = Some(val.into()); self }

    /// 构建并校验；来源与正文缺省为空串
    pub fn build(self) -> Result<SentimentEvent> {
        match (self.instrument_id, self.timestamp, self.score, self.confidence) {
            (Some(instrument_id), Some(timestamp), Some(score), Some(confidence)) => {
                let event = SentimentEvent {
                    instrument_id,
                    timestamp,
                    score,
                    confidence,
                    source_label: self.source_label.unwrap_or_default(),
                    text: self.text.unwrap_or_default(),
                };
                event.validate()?;
                Ok(event)
            }
            _ => Err(AppError::validation("SentimentEventIncomplete")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 10, 15, 0).unwrap()
    }

    #[test]
    fn builder_fills_optional_text_fields() {
        let event = SentimentEvent::builder()
            .instrument_id("TSLA")
            .timestamp(ts())
            .score(0.4)
            .confidence(0.4)
            .build()
            .unwrap();
        assert_eq!(event.source_label(), "");
        assert_eq!(event.text(), "");
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let res = SentimentEvent::builder()
            .instrument_id("TSLA")
            .timestamp(ts())
            .score(1.5)
            .confidence(0.4)
            .build();
        assert!(matches!(res, Err(AppError::Validation(_))));

        let nan = SentimentEvent::new("TSLA", ts(), f64::NAN, 0.1, "Reddit", "?");
        assert!(nan.validate().is_err());
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let event = SentimentEvent::new("TSLA", ts(), 0.2, 1.2, "News", "ok");
        assert!(matches!(event.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn unchecked_constructor_keeps_raw_score() {
        let event = SentimentEvent::new("X", ts(), 5.0, 1.0, "Twitter", "spike");
        assert_eq!(event.score(), 5.0);
    }
}
