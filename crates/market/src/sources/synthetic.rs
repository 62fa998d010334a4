//! 确定性模拟数据：价格随机游走 + 社交帖子
//!
//! 真实数据源不可用时作为兜底；同一标的、同一时间区间、同一种子总是生成相同数据。

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};
use rand::distributions::WeightedIndex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use sentiment_quant_ai_analysis::SentimentLabel;
use sentiment_quant_common::utils::truncate_to_bucket;
use sentiment_quant_common::{PriceBar, SentimentEvent, TimeRange};
use tracing::debug;

use super::traits::{PostSource, PriceSource, SentimentSource};
use crate::models::RawPost;

const MARKET_OPEN_HOUR: u32 = 9;
const MARKET_CLOSE_HOUR: u32 = 16;
const SOURCES: [&str; 3] = ["Twitter", "Reddit", "News"];

const PRICE_STREAM: u64 = 0x5052_4943;
const POST_STREAM: u64 = 0x504f_5354;

fn base_price(instrument_id: &str) -> f64 {
    match instrument_id {
        "AAPL" => 180.0,
        "TSLA" => 250.0,
        "MSFT" => 380.0,
        "GOOGL" => 140.0,
        "AMZN" => 150.0,
        _ => 100.0,
    }
}

/// (情绪偏置, 情绪噪声标准差)
fn sentiment_bias(instrument_id: &str) -> (f64, f64) {
    let trend = if matches!(instrument_id, "AAPL" | "MSFT" | "GOOGL") { 0.1 } else { 0.05 };
    let volatility = if instrument_id == "TSLA" { 0.5 } else { 0.3 };
    (trend, volatility)
}

fn post_text(instrument_id: &str, label: SentimentLabel, rng: &mut StdRng) -> String {
    let templates: [&str; 5] = match label {
        SentimentLabel::Positive => [
            "${} looking strong! 🚀",
            "Bullish on ${}",
            "${} to the moon!",
            "Great earnings from ${}",
            "${} is my top pick",
        ],
        SentimentLabel::Negative => [
            "${} overvalued",
            "Bearish on ${}",
            "${} might drop",
            "Selling my ${} position",
            "${} concerns me",
        ],
        SentimentLabel::Neutral => [
            "Watching ${}",
            "${} holding steady",
            "Thoughts on ${}?",
            "${} analysis needed",
            "${} sideways movement",
        ],
    };
    let template = templates.choose(rng).copied().unwrap_or("Watching ${}");
    template.replace("{}", instrument_id)
}

fn is_market_hour(ts: DateTime<Utc>) -> bool {
    ts.weekday().num_days_from_monday() < 5
        && (MARKET_OPEN_HOUR..=MARKET_CLOSE_HOUR).contains(&ts.hour())
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| anyhow!("正态分布参数非法 ({}, {}): {:?}", mean, std_dev, e))
}

#[derive(Debug, Clone)]
pub struct SyntheticMarketData {
    seed: u64,
    posts_per_day: usize,
}

impl Default for SyntheticMarketData {
    fn default() -> Self {
        Self::new(42)
    }
}

impl SyntheticMarketData {
    pub fn new(seed: u64) -> Self {
        Self { seed, posts_per_day: 50 }
    }

    pub fn with_posts_per_day(mut self, posts_per_day: usize) -> Self {
        self.posts_per_day = posts_per_day;
        self
    }

    fn rng_for(&self, instrument_id: &str, range: TimeRange, stream: u64) -> StdRng {
        // FNV-1a
        let hash = instrument_id
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3));
        let seed = hash ^ self.seed ^ stream ^ range.start().timestamp() as u64;
        StdRng::seed_from_u64(seed)
    }

    /// 工作日 09:00–16:00 (UTC) 的 K 线，收盘价按 N(0.1%, 1%) 随机游走
    pub fn generate_prices(
        &self,
        instrument_id: &str,
        range: TimeRange,
        interval: TimeDelta,
    ) -> Result<Vec<PriceBar>> {
        let mut rng = self.rng_for(instrument_id, range, PRICE_STREAM);
        let step = normal(0.001, 0.01)?;

        let mut ts = truncate_to_bucket(range.start(), interval)?;
        if ts < range.start() {
            ts += interval;
        }

        let mut price = base_price(instrument_id);
        let mut bars = Vec::new();
        while ts < range.end() {
            if is_market_hour(ts) {
                price *= 1.0 + step.sample(&mut rng);
                let intraday = normal(0.0, price * 0.005)?;
                let open = price + intraday.sample(&mut rng);
                let high = price.max(open) + intraday.sample(&mut rng).abs();
                let low = price.min(open) - intraday.sample(&mut rng).abs();
                let volume = rng.gen_range(1_000_000..10_000_000) as f64;

                bars.push(
                    PriceBar::builder()
                        .instrument_id(instrument_id)
                        .timestamp(ts)
                        .open(open)
                        .high(high)
                        .low(low)
                        .close(price)
                        .volume(volume)
                        .build()?,
                );
            }
            ts += interval;
        }
        debug!("模拟 {} K 线 {} 根", instrument_id, bars.len());
        Ok(bars)
    }

    /// 模拟帖子及其原始情绪分数，发帖时间偏向交易时段
    fn generate_scored_posts(&self, instrument_id: &str, range: TimeRange) -> Result<Vec<(RawPost, f64)>> {
        let mut rng = self.rng_for(instrument_id, range, POST_STREAM);
        let weights: Vec<f64> = (0..24u32)
            .map(|h| if (MARKET_OPEN_HOUR..=MARKET_CLOSE_HOUR).contains(&h) { 1.0 } else { 0.3 })
            .collect();
        let hour_dist = WeightedIndex::new(&weights)?;
        let (trend, volatility) = sentiment_bias(instrument_id);
        let base = normal(0.0, 0.3)?;
        let noise = normal(0.0, volatility)?;

        let days = (range.duration().num_seconds() + 86_399) / 86_400;
        let mut posts = Vec::new();
        for day in 0..days {
            let date = (range.start() + TimeDelta::days(day)).date_naive();
            for _ in 0..self.posts_per_day {
                let hour = hour_dist.sample(&mut rng) as u32;
                let minute = rng.gen_range(0..60u32);
                let score = (base.sample(&mut rng) + trend + noise.sample(&mut rng)).clamp(-1.0, 1.0);
                let text = post_text(instrument_id, SentimentLabel::from_score(score), &mut rng);
                let source = SOURCES.choose(&mut rng).copied().unwrap_or("Twitter");

                let Some(naive) = date.and_hms_opt(hour, minute, 0) else {
                    continue;
                };
                let timestamp = naive.and_utc();
                if !range.contains(timestamp) {
                    continue;
                }
                posts.push((
                    RawPost {
                        instrument_id: instrument_id.to_string(),
                        timestamp,
                        text,
                        source_label: source.to_string(),
                    },
                    score,
                ));
            }
        }
        posts.sort_by_key(|(post, _)| post.timestamp);
        Ok(posts)
    }

    /// 模拟情绪事件，置信度取 |score|
    pub fn generate_events(&self, instrument_id: &str, range: TimeRange) -> Result<Vec<SentimentEvent>> {
        let events = self
            .generate_scored_posts(instrument_id, range)?
            .into_iter()
            .map(|(post, score)| {
                SentimentEvent::builder()
                    .instrument_id(post.instrument_id)
                    .timestamp(post.timestamp)
                    .score(score)
                    .confidence(score.abs())
                    .source_label(post.source_label)
                    .text(post.text)
                    .build()
            })
            .collect::<sentiment_quant_common::Result<Vec<_>>>()?;
        debug!("模拟 {} 情绪事件 {} 条", instrument_id, events.len());
        Ok(events)
    }
}

#[async_trait]
impl PriceSource for SyntheticMarketData {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn fetch_prices(
        &self,
        instrument_id: &str,
        range: TimeRange,
        interval: TimeDelta,
    ) -> Result<Vec<PriceBar>> {
        self.generate_prices(instrument_id, range, interval)
    }
}

#[async_trait]
impl SentimentSource for SyntheticMarketData {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn fetch_events(&self, instrument_id: &str, range: TimeRange) -> Result<Vec<SentimentEvent>> {
        self.generate_events(instrument_id, range)
    }
}

#[async_trait]
impl PostSource for SyntheticMarketData {
    async fn fetch_posts(&self, instrument_id: &str, range: TimeRange) -> Result<Vec<RawPost>> {
        Ok(self
            .generate_scored_posts(instrument_id, range)?
            .into_iter()
            .map(|(post, _)| post)
            .collect())
    }
}
