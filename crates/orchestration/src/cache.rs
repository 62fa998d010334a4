//! 分析结果记忆化
//!
//! 分析核心无状态；同一标的、同一时间区间、同一参数的结果在这里复用。

use std::sync::Arc;
use std::time::Duration;

use sentiment_quant_analytics::InstrumentSummary;
use sentiment_quant_common::TimeRange;
use sentiment_quant_core::cache::MemoCache;
use sentiment_quant_core::config::{AnalysisConfig, ConfigFingerprint};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    pub instrument_id: String,
    pub range: TimeRange,
    pub config: ConfigFingerprint,
}

impl AnalysisKey {
    pub fn new(instrument_id: &str, range: TimeRange, config: &AnalysisConfig) -> Self {
        Self {
            instrument_id: instrument_id.to_string(),
            range,
            config: config.fingerprint(),
        }
    }
}

#[derive(Clone)]
pub struct SummaryCache {
    inner: MemoCache<AnalysisKey, Arc<InstrumentSummary>>,
}

impl SummaryCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            inner: MemoCache::new(ttl),
        }
    }

    pub fn get(&self, key: &AnalysisKey) -> Option<Arc<InstrumentSummary>> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: AnalysisKey, summary: Arc<InstrumentSummary>) {
        self.inner.insert(key, summary);
    }

    /// 删除某个标的的全部缓存
    pub fn invalidate(&self, instrument_id: &str) -> usize {
        self.inner.invalidate_where(|key| key.instrument_id == instrument_id)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for SummaryCache {
    /// 默认 5 分钟过期
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(300)))
    }
}
