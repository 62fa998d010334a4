use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};

/// 价格K线
///
/// 由价格数据源产出，同一标的内时间戳严格递增且不重复，构造后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    instrument_id: String,
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl PriceBar {
    pub fn new(
        instrument_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn builder() -> PriceBarBuilder {
        PriceBarBuilder::new()
    }

    pub fn instrument_id(&self) -> &str { &self.instrument_id }
    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
    pub fn open(&self) -> f64 { self.open }
    pub fn high(&self) -> f64 { self.high }
    pub fn low(&self) -> f64 { self.low }
    pub fn close(&self) -> f64 { self.close }
    pub fn volume(&self) -> f64 { self.volume }

    /// 数值合法性校验：价格有限且为正，成交量非负，最低价不高于最高价
    pub fn validate(&self) -> Result<()> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(AppError::validation(format!(
                "{} @ {}: 价格必须为有限正数",
                self.instrument_id, self.timestamp
            )));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(AppError::validation(format!(
                "{} @ {}: 成交量非法 {}",
                self.instrument_id, self.timestamp, self.volume
            )));
        }
        if self.low > self.high {
            return Err(AppError::validation(format!(
                "{} @ {}: low {} > high {}",
                self.instrument_id, self.timestamp, self.low, self.high
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PriceBarBuilder {
    instrument_id: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

impl PriceBarBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn instrument_id(mut self, val: impl Into<String>) -> Self { self.instrument_id = Some(val.into()); self }
    pub fn timestamp(mut self, val: DateTime<Utc>) -> Self { self.timestamp = Some(val); self }
    pub fn open(mut self, val: f64) -> Self { self.open = Some(val); self }
    pub fn high(mut self, val: f64) -> Self { self.high = Some(val); self }
    pub fn low(mut self, val: f64) -> Self { self.low = Some(val); self }
    pub fn close(mut self, val: f64) -> Self { self.close = Some(val); self }
    pub fn volume(mut self, val: f64) -> Self { self.volume = Some(val); self }

    pub fn build(self) -> Result<PriceBar> {
        if let (Some(instrument_id), Some(timestamp), Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            self.instrument_id,
            self.timestamp,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        ) {
            let bar = PriceBar { instrument_id, timestamp, open, high, low, close, volume };
            bar.validate()?;
            Ok(bar)
        } else {
            Err(AppError::validation("PriceBarIncomplete"))
        }
    }
}
