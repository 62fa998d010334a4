//! 情绪-价格分析服务
//!
//! I/O 在数据源里异步完成，CPU 密集的分析放到阻塞线程池执行；
//! 多个标的并发处理，单个标的失败不影响其他标的。

use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use sentiment_quant_analytics::{InstrumentSummary, SummaryBuilder};
use sentiment_quant_common::TimeRange;
use sentiment_quant_market::{PriceSource, SentimentSource};
use tracing::{debug, error, info};

use crate::cache::{AnalysisKey, SummaryCache};

const DEFAULT_CONCURRENCY: usize = 4;

/// 单个标的的分析结果
#[derive(Debug)]
pub struct InstrumentOutcome {
    pub instrument_id: String,
    pub result: Result<Arc<InstrumentSummary>>,
}

pub struct SentimentAnalysisService {
    prices: Arc<dyn PriceSource>,
    sentiment: Arc<dyn SentimentSource>,
    builder: Arc<SummaryBuilder>,
    cache: SummaryCache,
    concurrency: usize,
}

impl SentimentAnalysisService {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        sentiment: Arc<dyn SentimentSource>,
        builder: SummaryBuilder,
    ) -> Self {
        Self {
            prices,
            sentiment,
            builder: Arc::new(builder),
            cache: SummaryCache::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_cache(mut self, cache: SummaryCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn builder(&self) -> &SummaryBuilder {
        &self.builder
    }

    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    /// 分析单个标的：先查缓存，未命中则拉取数据并计算
    pub async fn analyze(&self, instrument_id: &str, range: TimeRange) -> Result<Arc<InstrumentSummary>> {
        let key = AnalysisKey::new(instrument_id, range, self.builder.config());
        if let Some(hit) = self.cache.get(&key) {
            debug!("缓存命中: {}", instrument_id);
            return Ok(hit);
        }

        let interval = self.builder.config().bucket_width;
        let (prices, events) = tokio::try_join!(
            self.prices.fetch_prices(instrument_id, range, interval),
            self.sentiment.fetch_events(instrument_id, range),
        )?;
        debug!(
            "{} 数据就绪: {} 根 K 线 ({}), {} 条情绪 ({})",
            instrument_id,
            prices.len(),
            self.prices.name(),
            events.len(),
            self.sentiment.name()
        );

        let builder = Arc::clone(&self.builder);
        let instrument = instrument_id.to_string();
        let summary =
            tokio::task::spawn_blocking(move || builder.summarize(&instrument, &prices, &events)).await??;

        let summary = Arc::new(summary);
        self.cache.insert(key, Arc::clone(&summary));
        Ok(summary)
    }

    /// 并发分析多个标的，结果顺序与请求顺序一致
    pub async fn analyze_many(&self, instrument_ids: &[String], range: TimeRange) -> Vec<InstrumentOutcome> {
        info!(
            "开始分析 {} 个标的, 并发数: {}",
            instrument_ids.len(),
            self.concurrency
        );
        let outcomes: Vec<InstrumentOutcome> = stream::iter(instrument_ids)
            .map(|instrument_id| async move {
                let result = self.analyze(instrument_id, range).await;
                if let Err(e) = &result {
                    error!("{} 分析失败: {:#}", instrument_id, e);
                }
                InstrumentOutcome {
                    instrument_id: instrument_id.clone(),
                    result,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let ok = outcomes.iter().filter(|o| o.result.is_ok()).count();
        info!("分析完成: 成功 {}/{}", ok, outcomes.len());
        outcomes
    }
}
