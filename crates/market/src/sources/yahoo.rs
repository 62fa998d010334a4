//! Yahoo Finance chart 接口

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta};
use reqwest::Client;
use serde::Deserialize;
use sentiment_quant_common::utils::truncate_to_bucket;
use sentiment_quant_common::{PriceBar, TimeRange};
use tracing::{debug, warn};

use super::traits::PriceSource;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// 基于 Yahoo chart JSON 接口的价格数据源
pub struct YahooChartSource {
    client: Client,
    base_url: String,
}

impl YahooChartSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().user_agent("Mozilla/5.0").build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

/// Yahoo 支持的 K 线周期
pub(crate) fn yahoo_interval(interval: TimeDelta) -> Result<&'static str> {
    match interval.num_minutes() {
        1 => Ok("1m"),
        5 => Ok("5m"),
        15 => Ok("15m"),
        30 => Ok("30m"),
        60 => Ok("1h"),
        1440 => Ok("1d"),
        _ => Err(anyhow!("Yahoo 不支持的 K 线周期: {}", interval)),
    }
}

/// 把列式的 chart 响应转换为 K 线
///
/// 任一字段为 null 或校验失败的行被跳过，结果按时间排序并去重。
pub(crate) fn parse_chart(instrument_id: &str, response: ChartResponse) -> Result<Vec<PriceBar>> {
    if let Some(error) = response.chart.error {
        return Err(anyhow!("Yahoo chart 错误: {} - {}", error.code, error.description));
    }
    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(vec![]);
    };
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let column = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();
    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let row = (
            DateTime::from_timestamp(*ts, 0),
            column(&quote.open, i),
            column(&quote.high, i),
            column(&quote.low, i),
            column(&quote.close, i),
            column(&quote.volume, i),
        );
        let (Some(timestamp), Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            continue;
        };
        let bar = PriceBar::builder()
            .instrument_id(instrument_id)
            .timestamp(timestamp)
            .open(open)
            .high(high)
            .low(low)
            .close(close)
            .volume(volume)
            .build();
        match bar {
            Ok(bar) => bars.push(bar),
            Err(e) => warn!("跳过非法 K 线 {} @ {}: {}", instrument_id, timestamp, e),
        }
    }

    bars.sort_by_key(|b| b.timestamp());
    bars.dedup_by_key(|b| b.timestamp());
    Ok(bars)
}

/// 把 K 线时间戳向下对齐到周期网格
///
/// Yahoo 的小时线从 :30 开盘起算，不对齐会与情绪桶全部错开。
/// 对齐后时间戳重复的 K 线只保留第一根（输入需已排序）。
pub(crate) fn snap_to_interval(bars: Vec<PriceBar>, interval: TimeDelta) -> Result<Vec<PriceBar>> {
    let mut snapped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        let timestamp = truncate_to_bucket(bar.timestamp(), interval)?;
        if snapped.last().map(|b| b.timestamp()) == Some(timestamp) {
            warn!("对齐后时间戳重复, 丢弃 {} @ {}", bar.instrument_id(), bar.timestamp());
            continue;
        }
        snapped.push(PriceBar::new(
            bar.instrument_id(),
            timestamp,
            bar.open(),
            bar.high(),
            bar.low(),
            bar.close(),
            bar.volume(),
        ));
    }
    Ok(snapped)
}

#[async_trait]
impl PriceSource for YahooChartSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_prices(
        &self,
        instrument_id: &str,
        range: TimeRange,
        interval: TimeDelta,
    ) -> Result<Vec<PriceBar>> {
        let url = format!(
            "{}/{}?period1={}&period2={}&interval={}",
            self.base_url,
            instrument_id,
            range.start().timestamp(),
            range.end().timestamp(),
            yahoo_interval(interval)?
        );
        debug!("请求 Yahoo chart: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("Yahoo chart HTTP {}: {}", response.status(), instrument_id));
        }
        let body: ChartResponse = response.json().await?;
        let bars: Vec<PriceBar> = snap_to_interval(parse_chart(instrument_id, body)?, interval)?
            .into_iter()
            .filter(|b| range.contains(b.timestamp()))
            .collect();
        debug!("Yahoo {} 返回 {} 根 K 线", instrument_id, bars.len());
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn parse(json: &str) -> Result<Vec<PriceBar>> {
        let response: ChartResponse = serde_json::from_str(json)?;
        parse_chart("AAPL", response)
    }

    #[test]
    fn null_rows_are_skipped_and_output_sorted() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1717425000, 1717414200, 1717417800, 1717414200],
            "indicators":{"quote":[{
                "open":[191.0, 190.0, null, 190.0],
                "high":[192.0, 191.0, 191.5, 191.0],
                "low":[190.5, 189.5, 190.1, 189.5],
                "close":[191.5, 190.5, 191.0, 190.5],
                "volume":[1200, 1000, 1100, 1000]
            }]}
        }],"error":null}}"#;
        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].timestamp() < bars[1].timestamp());
        assert_eq!(bars[0].close(), 190.5);
        assert_eq!(bars[1].volume(), 1200.0);
    }

    #[test]
    fn chart_error_is_reported() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(parse(json).is_err());
    }

    #[test]
    fn empty_result_is_no_data() {
        let json = r#"{"chart":{"result":[],"error":null}}"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn half_hour_bars_snap_to_hourly_grid() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1717414200, 1717417800],
            "indicators":{"quote":[{
                "open":[190.0, 191.0],
                "high":[191.0, 192.0],
                "low":[189.5, 190.5],
                "close":[190.5, 191.5],
                "volume":[1000, 1100]
            }]}
        }],"error":null}}"#;
        let bars = snap_to_interval(parse(json).unwrap(), TimeDelta::hours(1)).unwrap();
        let hour = |h| Utc.with_ymd_and_hms(2024, 6, 3, h, 0, 0).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp(), hour(11));
        assert_eq!(bars[1].timestamp(), hour(12));
        assert_eq!(bars[1].close(), 191.5);
        assert_eq!(bars[0].instrument_id(), "AAPL");
    }

    #[test]
    fn bars_sharing_a_slot_keep_the_first() {
        let at = |h, m| Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap();
        let bars = vec![
            PriceBar::new("AAPL", at(11, 30), 1.0, 1.0, 1.0, 1.0, 1.0),
            PriceBar::new("AAPL", at(11, 45), 2.0, 2.0, 2.0, 2.0, 2.0),
            PriceBar::new("AAPL", at(12, 30), 3.0, 3.0, 3.0, 3.0, 3.0),
        ];
        let snapped = snap_to_interval(bars, TimeDelta::hours(1)).unwrap();
        assert_eq!(snapped.len(), 2);
        assert_eq!(snapped[0].close(), 1.0);
        assert_eq!(snapped[1].timestamp(), at(12, 0));
    }

    #[test]
    fn intervals_map_to_yahoo_codes() {
        assert_eq!(yahoo_interval(TimeDelta::hours(1)).unwrap(), "1h");
        assert_eq!(yahoo_interval(TimeDelta::minutes(15)).unwrap(), "15m");
        assert!(yahoo_interval(TimeDelta::hours(4)).is_err());
    }
}
