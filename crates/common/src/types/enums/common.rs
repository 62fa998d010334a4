use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// 采样 / 分桶周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodEnum {
    OneMinute,
    FiveMinute,
    FifteenMinute,
    ThirtyMinute,
    OneHour,
    FourHour,
    OneDay,
}

impl PeriodEnum {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodEnum::OneMinute => "1m",
            PeriodEnum::FiveMinute => "5m",
            PeriodEnum::FifteenMinute => "15m",
            PeriodEnum::ThirtyMinute => "30m",
            PeriodEnum::OneHour => "1H",
            PeriodEnum::FourHour => "4H",
            PeriodEnum::OneDay => "1D",
        }
    }

    pub fn duration(&self) -> TimeDelta {
        match self {
            PeriodEnum::OneMinute => TimeDelta::minutes(1),
            PeriodEnum::FiveMinute => TimeDelta::minutes(5),
            PeriodEnum::FifteenMinute => TimeDelta::minutes(15),
            PeriodEnum::ThirtyMinute => TimeDelta::minutes(30),
            PeriodEnum::OneHour => TimeDelta::hours(1),
            PeriodEnum::FourHour => TimeDelta::hours(4),
            PeriodEnum::OneDay => TimeDelta::days(1),
        }
    }
}

impl FromStr for PeriodEnum {
    type Err = AppError;

    // 大小写不敏感，"1m" 与 "1M" 都视为一分钟
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1M" | "1MIN" => Ok(PeriodEnum::OneMinute),
            "5M" | "5MIN" => Ok(PeriodEnum::FiveMinute),
            "15M" | "15MIN" => Ok(PeriodEnum::FifteenMinute),
            "30M" | "30MIN" => Ok(PeriodEnum::ThirtyMinute),
            "1H" => Ok(PeriodEnum::OneHour),
            "4H" => Ok(PeriodEnum::FourHour),
            "1D" => Ok(PeriodEnum::OneDay),
            other => Err(AppError::Parse(format!("Unsupported period format {}", other))),
        }
    }
}
