use chrono::{DateTime, TimeDelta, Utc};

use crate::errors::{AppError, Result};
use crate::types::PeriodEnum;

/// 解析周期字符串为 `TimeDelta`
pub fn parse_period(period: &str) -> Result<TimeDelta> {
    Ok(period.parse::<PeriodEnum>()?.duration())
}

/// 将时间戳向下截断到 `width` 的整数倍（以 Unix 纪元为起点）
///
/// 负时间戳同样向下取整，保证分桶结果与事件到达顺序无关。
pub fn truncate_to_bucket(ts: DateTime<Utc>, width: TimeDelta) -> Result<DateTime<Utc>> {
    let width_ms = width.num_milliseconds();
    if width_ms <= 0 {
        return Err(AppError::configuration(format!("桶宽必须为正: {}", width)));
    }
    let start_ms = ts.timestamp_millis().div_euclid(width_ms) * width_ms;
    DateTime::from_timestamp_millis(start_ms)
        .ok_or_else(|| AppError::Parse(format!("时间戳越界: {}", start_ms)))
}

/// 时间戳是否恰好落在桶网格上
pub fn is_bucket_aligned(ts: DateTime<Utc>, width: TimeDelta) -> bool {
    let width_ms = width.num_milliseconds();
    width_ms > 0 && ts.timestamp_millis().rem_euclid(width_ms) == 0
}

/// 时间戳转换为指定格式的字符串
pub fn format_ts(ts: DateTime<Utc>, format: &str) -> String {
    ts.format(format).to_string()
}
