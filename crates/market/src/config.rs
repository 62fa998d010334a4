//! 数据采集参数

use std::time::Duration;

use sentiment_quant_core::config::{env_i64, env_usize};

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    /// 主数据源最多尝试次数（含首次）
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    /// 单次请求超时
    pub attempt_timeout_secs: u64,
    pub history_days: i64,
    /// 模拟情绪数据每天的帖子数
    pub posts_per_day: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 2_000,
            attempt_timeout_secs: 10,
            history_days: 7,
            posts_per_day: 50,
        }
    }
}

impl CollectorConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_retries: env_usize("COLLECTOR_MAX_RETRIES", default.max_retries).max(1),
            retry_delay_ms: env_i64("COLLECTOR_RETRY_DELAY_MS", default.retry_delay_ms as i64).max(0) as u64,
            attempt_timeout_secs: env_i64(
                "COLLECTOR_ATTEMPT_TIMEOUT_SECS",
                default.attempt_timeout_secs as i64,
            )
            .max(1) as u64,
            history_days: env_i64("COLLECTOR_HISTORY_DAYS", default.history_days).max(1),
            posts_per_day: env_usize("COLLECTOR_POSTS_PER_DAY", default.posts_per_day),
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}
