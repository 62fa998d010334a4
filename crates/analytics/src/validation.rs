//! 输入校验与分桶对齐检查

use chrono::TimeDelta;
use sentiment_quant_common::utils::is_bucket_aligned;
use sentiment_quant_common::{AppError, PriceBar, Result, SentimentEvent};
use tracing::warn;

/// K 线逐条校验，且同一标的时间戳严格递增
pub fn validate_prices(prices: &[PriceBar]) -> Result<()> {
    for bar in prices {
        bar.validate()?;
    }
    for pair in prices.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.instrument_id() == next.instrument_id() && next.timestamp() <= prev.timestamp() {
            return Err(AppError::validation(format!(
                "{} 价格时间戳非严格递增: {} -> {}",
                next.instrument_id(),
                prev.timestamp(),
                next.timestamp()
            )));
        }
    }
    Ok(())
}

pub fn validate_events(events: &[SentimentEvent]) -> Result<()> {
    events.iter().try_for_each(|e| e.validate())
}

/// 桶宽必须整除价格序列的采样间隔（相邻 K 线的最小正间隔），否则左连接会全部落空
///
/// K 线不在桶网格上只告警，不拒绝。
pub fn check_bucket_alignment(prices: &[PriceBar], bucket_width: TimeDelta) -> Result<()> {
    let width_ms = bucket_width.num_milliseconds();
    if width_ms <= 0 {
        return Err(AppError::configuration(format!("bucket_width 必须为正: {}", bucket_width)));
    }

    let interval_ms = prices
        .windows(2)
        .map(|pair| (pair[1].timestamp() - pair[0].timestamp()).num_milliseconds())
        .filter(|gap| *gap > 0)
        .min();

    if let Some(interval_ms) = interval_ms {
        if interval_ms % width_ms != 0 {
            return Err(AppError::configuration(format!(
                "bucket_width {}ms 不能整除价格采样间隔 {}ms",
                width_ms, interval_ms
            )));
        }
    }

    let misaligned = prices
        .iter()
        .filter(|bar| !is_bucket_aligned(bar.timestamp(), bucket_width))
        .count();
    if misaligned > 0 {
        warn!(
            "{} 根 K 线不在 {} 的桶网格上，对应情绪将被中性填充",
            misaligned, bucket_width
        );
    }
    Ok(())
}
