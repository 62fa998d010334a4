//! # Sentiment Quant AI Analysis
//!
//! 情绪打分器：文本 → [-1, 1] 情绪分数 + 置信度，可插拔

pub mod sentiment_analyzer;

// 重新导出核心 Trait
pub use sentiment_analyzer::{
    LexiconSentimentAnalyzer, SentimentAnalyzer, SentimentLabel, SentimentResult,
};
