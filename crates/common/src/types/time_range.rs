use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};

/// 半开时间区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(AppError::validation(format!(
                "时间区间非法: start {} >= end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// 截止到 `end` 的最近 `days` 天
    pub fn last_days(end: DateTime<Utc>, days: i64) -> Result<Self> {
        Self::new(end - TimeDelta::days(days), end)
    }

    pub fn start(&self) -> DateTime<Utc> { self.start }
    pub fn end(&self) -> DateTime<Utc> { self.end }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn range_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let range = TimeRange::new(start, end).unwrap();
        assert!(range.contains(start));
        assert!(!range.contains(end));
        assert_eq!(range.duration(), TimeDelta::days(1));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(TimeRange::new(t, t).is_err());
    }
}
