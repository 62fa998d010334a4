//! 金融词典打分器
//!
//! 规则：
//! 1. 查词典得到单词分值（复数形式回退到单数）
//! 2. 否定词翻转下一个情绪词的符号
//! 3. 强化词按倍数缩放下一个情绪词
//! 4. 感叹号沿总体方向加强
//! 5. 总分经 `x / sqrt(x² + α)` 归一化到 [-1, 1]

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::trace;

use super::preprocess::{extract_cashtags, preprocess_text};
use super::{SentimentAnalyzer, SentimentLabel, SentimentResult};

/// 归一化常数
const NORMALIZATION_ALPHA: f64 = 15.0;
/// 每个感叹号的加成（最多计 4 个）
const EXCLAMATION_BOOST: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

static DEFAULT_WORDS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        // 正面
        ("bullish", 2.5),
        ("moon", 2.0),
        ("🚀", 2.0),
        ("strong", 1.6),
        ("great", 1.9),
        ("buy", 1.2),
        ("long", 0.8),
        ("rally", 2.0),
        ("surge", 2.0),
        ("soar", 2.2),
        ("gain", 1.4),
        ("profit", 1.6),
        ("growth", 1.5),
        ("beat", 1.5),
        ("upgrade", 1.7),
        ("breakout", 1.6),
        ("record", 1.2),
        ("outperform", 1.8),
        ("top", 1.0),
        ("pick", 0.6),
        ("good", 1.9),
        ("love", 2.5),
        ("win", 2.0),
        ("rebound", 1.4),
        ("recovery", 1.4),
        ("optimistic", 1.8),
        // 负面
        ("bearish", -2.5),
        ("crash", -2.8),
        ("dump", -2.0),
        ("plunge", -2.4),
        ("drop", -1.4),
        ("fall", -1.3),
        ("decline", -1.5),
        ("loss", -1.7),
        ("weak", -1.6),
        ("sell", -1.2),
        ("selling", -1.2),
        ("short", -0.8),
        ("overvalued", -1.6),
        ("concern", -1.4),
        ("worry", -1.7),
        ("fear", -2.0),
        ("risk", -0.9),
        ("miss", -1.5),
        ("downgrade", -1.7),
        ("bad", -2.5),
        ("fraud", -3.0),
        ("scam", -3.0),
        ("bubble", -1.3),
        ("lawsuit", -1.8),
        ("pessimistic", -1.8),
    ]
    .into_iter()
    .collect()
});

static NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "cannot", "cant", "can't", "don't", "dont",
    "doesn't", "doesnt", "didn't", "didnt", "won't", "wont", "isn't", "isnt", "aren't",
    "arent", "wasn't", "wasnt", "hardly", "barely",
];

static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("very", 1.5),
        ("extremely", 2.0),
        ("super", 1.5),
        ("really", 1.3),
        ("highly", 1.5),
        ("hugely", 1.7),
        ("slightly", 0.5),
        ("somewhat", 0.7),
        ("kinda", 0.7),
    ]
    .into_iter()
    .collect()
});

/// 词典打分器
#[derive(Debug, Clone)]
pub struct LexiconSentimentAnalyzer {
    words: HashMap<String, f64>,
}

impl Default for LexiconSentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconSentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            words: DEFAULT_WORDS
                .iter()
                .map(|(w, s)| (w.to_string(), *s))
                .collect(),
        }
    }

    /// 追加或覆盖词典项
    pub fn with_word(mut self, word: &str, valence: f64) -> Self {
        self.words.insert(word.to_lowercase(), valence);
        self
    }

    fn valence(&self, token: &str) -> Option<f64> {
        if let Some(v) = self.words.get(token) {
            return Some(*v);
        }
        token
            .strip_suffix('s')
            .and_then(|singular| self.words.get(singular))
            .copied()
    }

    fn score_tokens(&self, cleaned: &str) -> (f64, usize, usize) {
        let mut total = 0.0;
        let mut matched = 0;
        let mut token_count = 0;
        let mut negate_next = false;
        let mut intensifier = 1.0;

        for raw in cleaned.split_whitespace() {
            let token = raw.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\'');
            if token.is_empty() {
                continue;
            }
            token_count += 1;

            if NEGATIONS.contains(&token) {
                negate_next = true;
                continue;
            }
            if let Some(mult) = INTENSIFIERS.get(token) {
                intensifier = *mult;
                continue;
            }
            if let Some(mut v) = self.valence(token) {
                if negate_next {
                    v = -v;
                    negate_next = false;
                }
                total += v * intensifier;
                intensifier = 1.0;
                matched += 1;
            }
        }
        (total, matched, token_count)
    }
}

impl SentimentAnalyzer for LexiconSentimentAnalyzer {
    fn analyze(&self, text: &str) -> anyhow::Result<SentimentResult> {
        let cleaned = preprocess_text(text);
        let (mut total, matched, token_count) = self.score_tokens(&cleaned);
        if token_count == 0 {
            return Ok(SentimentResult::neutral());
        }

        let exclamations = cleaned.matches('!').count().min(MAX_EXCLAMATIONS) as f64;
        if total > 0.0 {
            total += exclamations * EXCLAMATION_BOOST;
        } else if total < 0.0 {
            total -= exclamations * EXCLAMATION_BOOST;
        }

        let score = (total / (total * total + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0);
        let confidence = (matched as f64 / token_count as f64).clamp(0.0, 1.0);
        let label = SentimentLabel::from_score(score);
        trace!("lexicon score={:.4} matched={}/{} text={}", score, matched, token_count, text);

        Ok(SentimentResult {
            score,
            confidence,
            entities: extract_cashtags(text),
            labels: vec![label.market_tag().to_string()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> f64 {
        LexiconSentimentAnalyzer::new().analyze(text).unwrap().score
    }

    #[test]
    fn bullish_post_is_positive_with_entity() {
        let result = LexiconSentimentAnalyzer::new()
            .analyze("Bullish on $AAPL, looking strong!")
            .unwrap();
        assert!(result.score > 0.2);
        assert_eq!(result.entities, vec!["AAPL".to_string()]);
        assert_eq!(result.labels, vec!["bullish".to_string()]);
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn negation_flips_sign() {
        assert!(score("not bullish at all") < 0.0);
        assert!(score("bullish") > 0.0);
    }

    #[test]
    fn intensifier_strengthens() {
        assert!(score("very strong") > score("strong"));
        assert!(score("slightly weak") > score("weak"));
    }

    #[test]
    fn plural_falls_back_to_singular() {
        assert!(score("$TSLA concerns me") < 0.0);
    }

    #[test]
    fn scores_stay_in_range() {
        let s = score("bullish bullish bullish moon moon 🚀 🚀 great great!!!!!!");
        assert!(s <= 1.0 && s > 0.9);
        let s = score("crash crash fraud scam dump bearish");
        assert!(s >= -1.0 && s < -0.9);
    }

    #[test]
    fn empty_and_unknown_text_is_neutral() {
        let empty = LexiconSentimentAnalyzer::new().analyze("   ").unwrap();
        assert_eq!(empty, SentimentResult::neutral());

        let unknown = LexiconSentimentAnalyzer::new().analyze("watching the tape").unwrap();
        assert_eq!(unknown.score, 0.0);
        assert_eq!(unknown.confidence, 0.0);
        assert_eq!(unknown.label(), SentimentLabel::Neutral);
    }

    #[test]
    fn custom_words_extend_lexicon() {
        let analyzer = LexiconSentimentAnalyzer::new().with_word("Tendies", 2.0);
        assert!(analyzer.analyze("tendies incoming").unwrap().score > 0.2);
    }
}
