//! 主数据源重试 + 模拟数据兜底

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::TimeDelta;
use sentiment_quant_common::{PriceBar, TimeRange};
use tokio::time::timeout;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{info, warn};

use super::traits::PriceSource;
use crate::config::CollectorConfig;

/// 先以有限次重试（固定间隔、单次超时）请求主数据源，失败或无数据时改用兜底数据源
pub struct FallbackPriceSource {
    primary: Arc<dyn PriceSource>,
    fallback: Arc<dyn PriceSource>,
    config: CollectorConfig,
}

impl FallbackPriceSource {
    pub fn new(primary: Arc<dyn PriceSource>, fallback: Arc<dyn PriceSource>, config: CollectorConfig) -> Self {
        Self {
            primary,
            fallback,
            config,
        }
    }

    async fn fetch_primary(
        &self,
        instrument_id: &str,
        range: TimeRange,
        interval: TimeDelta,
    ) -> Result<Vec<PriceBar>> {
        let strategy = FixedInterval::from_millis(self.config.retry_delay_ms)
            .take(self.config.max_retries.saturating_sub(1));
        let per_attempt = self.config.attempt_timeout();

        Retry::spawn(strategy, move || async move {
            match timeout(per_attempt, self.primary.fetch_prices(instrument_id, range, interval)).await {
                Ok(Ok(bars)) => Ok(bars),
                Ok(Err(e)) => {
                    warn!("{} 获取 {} 失败: {}", self.primary.name(), instrument_id, e);
                    Err(e)
                }
                Err(_) => {
                    warn!("{} 获取 {} 超时 ({:?})", self.primary.name(), instrument_id, per_attempt);
                    Err(anyhow!("请求超时: {}", instrument_id))
                }
            }
        })
        .await
    }
}

#[async_trait]
impl PriceSource for FallbackPriceSource {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch_prices(
        &self,
        instrument_id: &str,
        range: TimeRange,
        interval: TimeDelta,
    ) -> Result<Vec<PriceBar>> {
        match self.fetch_primary(instrument_id, range, interval).await {
            Ok(bars) if !bars.is_empty() => return Ok(bars),
            Ok(_) => warn!("{} 无 {} 数据, 使用 {}", self.primary.name(), instrument_id, self.fallback.name()),
            Err(e) => warn!(
                "{} 重试 {} 次后仍失败({}), 使用 {}",
                self.primary.name(),
                self.config.max_retries,
                e,
                self.fallback.name()
            ),
        }
        let bars = self.fallback.fetch_prices(instrument_id, range, interval).await?;
        info!("{} 兜底数据 {} 根 K 线", instrument_id, bars.len());
        Ok(bars)
    }
}
