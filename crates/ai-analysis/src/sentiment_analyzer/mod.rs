//! 情绪分析器
//!
//! 打分器被视为纯函数黑盒：输入文本，输出 [-1, 1] 的分数和 [0, 1] 的置信度。
//! 默认实现为金融词典打分，也可以替换为任意模型。

mod lexicon;
mod preprocess;

use serde::{Deserialize, Serialize};

pub use lexicon::LexiconSentimentAnalyzer;
pub use preprocess::{extract_cashtags, preprocess_text};

/// 正/负面情绪的分界阈值
pub const LABEL_THRESHOLD: f64 = 0.2;

/// 情绪分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// 情绪分数（-1.0 到 1.0）
    /// -1.0: 极度悲观
    ///  0.0: 中性
    ///  1.0: 极度乐观
    pub score: f64,

    /// 置信度（0.0 到 1.0）
    pub confidence: f64,

    /// 关键实体（文本中出现的 $TICKER）
    pub entities: Vec<String>,

    /// 情绪标签（如 "bullish", "bearish", "neutral"）
    pub labels: Vec<String>,
}

impl SentimentResult {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            confidence: 0.0,
            entities: vec![],
            labels: vec![SentimentLabel::Neutral.market_tag().to_string()],
        }
    }

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_score(self.score)
    }
}

/// 情绪分析器接口
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> anyhow::Result<SentimentResult>;

    fn batch_analyze(&self, texts: &[String]) -> anyhow::Result<Vec<SentimentResult>> {
        texts.iter().map(|t| self.analyze(t)).collect()
    }
}

/// 情绪类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// `> 0.2` 为正面，`< -0.2` 为负面，其余中性
    pub fn from_score(score: f64) -> Self {
        if score > LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else if score < -LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }

    pub fn market_tag(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "bullish",
            SentimentLabel::Negative => "bearish",
            SentimentLabel::Neutral => "neutral",
        }
    }
}
