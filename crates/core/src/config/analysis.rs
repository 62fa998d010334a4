//! 情绪-价格关联分析参数

use chrono::TimeDelta;
use sentiment_quant_common::utils::parse_period;
use sentiment_quant_common::{AppError, Result};
use tracing::warn;

use super::environment::{env_f64, env_or_default, env_usize};

/// 分析参数
///
/// 由调用方持有并注入分析流程，不存在全局单例。
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// 情绪分桶宽度，需与价格采样周期一致
    pub bucket_width: TimeDelta,
    /// 异常检测滚动窗口（事件数）
    pub rolling_window_size: usize,
    /// 滚动统计最少观测数
    pub min_periods: usize,
    /// 异常判定的 z-score 阈值
    pub anomaly_threshold: f64,
    /// 领先相关性的滞后桶数
    pub leading_lag: usize,
    /// 情绪波动率的滚动窗口（桶数）
    pub volatility_window_hours: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bucket_width: TimeDelta::hours(1),
            rolling_window_size: 20,
            min_periods: 1,
            anomaly_threshold: 2.0,
            leading_lag: 1,
            volatility_window_hours: 24,
        }
    }
}

impl AnalysisConfig {
    /// 从环境变量读取，缺失或无法解析的项使用默认值
    pub fn from_env() -> Result<Self> {
        let default = Self::default();
        let period = env_or_default("SENTIMENT_BUCKET_PERIOD", "1H");
        let bucket_width = match parse_period(&period) {
            Ok(width) => width,
            Err(e) => {
                warn!("SENTIMENT_BUCKET_PERIOD={} 无法解析({}), 使用默认 1H", period, e);
                default.bucket_width
            }
        };

        let config = Self {
            bucket_width,
            rolling_window_size: env_usize("SENTIMENT_ROLLING_WINDOW", default.rolling_window_size),
            min_periods: env_usize("SENTIMENT_MIN_PERIODS", default.min_periods),
            anomaly_threshold: env_f64("SENTIMENT_ANOMALY_THRESHOLD", default.anomaly_threshold),
            leading_lag: env_usize("SENTIMENT_LEADING_LAG", default.leading_lag),
            volatility_window_hours: env_usize(
                "SENTIMENT_VOLATILITY_WINDOW_HOURS",
                default.volatility_window_hours,
            ),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_bucket_width(mut self, width: TimeDelta) -> Self {
        self.bucket_width = width;
        self
    }

    pub fn with_anomaly_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_threshold = threshold;
        self
    }

    pub fn with_leading_lag(mut self, lag: usize) -> Self {
        self.leading_lag = lag;
        self
    }

    pub fn with_rolling_window(mut self, window: usize, min_periods: usize) -> Self {
        self.rolling_window_size = window;
        self.min_periods = min_periods;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket_width <= TimeDelta::zero() {
            return Err(AppError::configuration(format!(
                "bucket_width 必须为正: {}",
                self.bucket_width
            )));
        }
        if self.rolling_window_size == 0 {
            return Err(AppError::configuration("rolling_window_size 不能为 0"));
        }
        if self.min_periods == 0 || self.min_periods > self.rolling_window_size {
            return Err(AppError::configuration(format!(
                "min_periods 需在 [1, {}] 内: {}",
                self.rolling_window_size, self.min_periods
            )));
        }
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold < 0.0 {
            return Err(AppError::configuration(format!(
                "anomaly_threshold 非法: {}",
                self.anomaly_threshold
            )));
        }
        if self.volatility_window_hours == 0 {
            return Err(AppError::configuration("volatility_window_hours 不能为 0"));
        }
        Ok(())
    }

    /// 可哈希的配置指纹，用作缓存键的一部分
    pub fn fingerprint(&self) -> ConfigFingerprint {
        ConfigFingerprint {
            bucket_width_ms: self.bucket_width.num_milliseconds(),
            rolling_window_size: self.rolling_window_size,
            min_periods: self.min_periods,
            anomaly_threshold_bits: self.anomaly_threshold.to_bits(),
            leading_lag: self.leading_lag,
            volatility_window_hours: self.volatility_window_hours,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint {
    bucket_width_ms: i64,
    rolling_window_size: usize,
    min_periods: usize,
    anomaly_threshold_bits: u64,
    leading_lag: usize,
    volatility_window_hours: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.bucket_width, TimeDelta::hours(1));
        assert_eq!(config.rolling_window_size, 20);
        assert_eq!(config.min_periods, 1);
        assert_eq!(config.anomaly_threshold, 2.0);
        assert_eq!(config.leading_lag, 1);
        assert_eq!(config.volatility_window_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        let config = AnalysisConfig::default().with_bucket_width(TimeDelta::zero());
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));

        let config = AnalysisConfig::default().with_rolling_window(5, 6);
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));

        let config = AnalysisConfig::default().with_anomaly_threshold(f64::NAN);
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn fingerprint_tracks_every_field() {
        let base = AnalysisConfig::default();
        assert_eq!(base.fingerprint(), AnalysisConfig::default().fingerprint());
        assert_ne!(base.fingerprint(), base.clone().with_leading_lag(3).fingerprint());
        assert_ne!(
            base.fingerprint(),
            base.clone().with_anomaly_threshold(2.5).fingerprint()
        );
    }
}
