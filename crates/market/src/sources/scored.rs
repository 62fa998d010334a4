use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sentiment_quant_ai_analysis::SentimentAnalyzer;
use sentiment_quant_common::{SentimentEvent, TimeRange};
use tracing::{debug, warn};

use super::traits::{PostSource, SentimentSource};

/// 用打分器给原始帖子打分，产出情绪事件
pub struct ScoredSentimentSource {
    posts: Arc<dyn PostSource>,
    analyzer: Arc<dyn SentimentAnalyzer>,
}

impl ScoredSentimentSource {
    pub fn new(posts: Arc<dyn PostSource>, analyzer: Arc<dyn SentimentAnalyzer>) -> Self {
        Self { posts, analyzer }
    }
}

#[async_trait]
impl SentimentSource for ScoredSentimentSource {
    fn name(&self) -> &str {
        "scored"
    }

    async fn fetch_events(&self, instrument_id: &str, range: TimeRange) -> Result<Vec<SentimentEvent>> {
        let posts = self.posts.fetch_posts(instrument_id, range).await?;
        let mut events = Vec::with_capacity(posts.len());
        for post in posts {
            let result = match self.analyzer.analyze(&post.text) {
                Ok(result) => result,
                Err(e) => {
                    warn!("帖子打分失败 {} @ {}: {}", instrument_id, post.timestamp, e);
                    continue;
                }
            };
            events.push(
                SentimentEvent::builder()
                    .instrument_id(post.instrument_id)
                    .timestamp(post.timestamp)
                    .score(result.score.clamp(-1.0, 1.0))
                    .confidence(result.confidence.clamp(0.0, 1.0))
                    .source_label(post.source_label)
                    .text(post.text)
                    .build()?,
            );
        }
        debug!("{} 打分完成: {} 条事件", instrument_id, events.len());
        Ok(events)
    }
}
