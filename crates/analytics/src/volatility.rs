//! 情绪波动率

use chrono::TimeDelta;
use sentiment_quant_common::SentimentEvent;
use tracing::debug;

use crate::aggregator::{accumulate, bucket_grid};
use crate::stats::{mean, sample_std};

/// 情绪波动率：按桶重采样的平均情绪，在最近 `window` 个桶上的滚动样本标准差的均值
///
/// 汇总时固定传入 1 小时桶宽，`window` 即小时数。
///
/// 没有事件的桶视为缺失（不做中性填充），窗口内至少 2 个有效值才有标准差；
/// 全部无定义时返回 0。
pub fn sentiment_volatility(
    events: &[SentimentEvent],
    instrument_id: &str,
    bucket_width: TimeDelta,
    window: usize,
) -> f64 {
    if bucket_width <= TimeDelta::zero() || window == 0 {
        return 0.0;
    }
    let accs = accumulate(events, instrument_id, bucket_width);
    let series: Vec<Option<f64>> = bucket_grid(&accs, bucket_width)
        .iter()
        .map(|start| accs.get(start).map(|acc| acc.mean_score()))
        .collect();

    let stds: Vec<f64> = (0..series.len())
        .filter_map(|i| {
            let start = (i + 1).saturating_sub(window);
            let present: Vec<f64> = series[start..=i].iter().flatten().copied().collect();
            sample_std(&present)
        })
        .collect();

    let volatility = mean(&stds).filter(|v| v.is_finite()).unwrap_or(0.0);
    debug!(
        "sentiment_volatility {}: {} 个桶, {} 个有效窗口, {:.4}",
        instrument_id,
        series.len(),
        stds.len(),
        volatility
    );
    volatility
}
