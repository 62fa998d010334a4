use anyhow::Result;
use async_trait::async_trait;
use chrono::TimeDelta;
use sentiment_quant_common::{PriceBar, SentimentEvent, TimeRange};

use crate::models::RawPost;

/// 价格数据源
///
/// 返回的 K 线按时间升序、无重复；没有数据时返回空序列而不是错误。
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_prices(
        &self,
        instrument_id: &str,
        range: TimeRange,
        interval: TimeDelta,
    ) -> Result<Vec<PriceBar>>;
}

/// 已打分的情绪事件数据源，顺序不保证
#[async_trait]
pub trait SentimentSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_events(&self, instrument_id: &str, range: TimeRange) -> Result<Vec<SentimentEvent>>;
}

/// 未打分的原始帖子数据源
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self, instrument_id: &str, range: TimeRange) -> Result<Vec<RawPost>>;
}
