//! 结果输出：终端表格 / JSON

use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;
use sentiment_quant_ai_analysis::SentimentLabel;
use sentiment_quant_analytics::InstrumentSummary;
use sentiment_quant_common::utils::format_ts;
use sentiment_quant_orchestration::InstrumentOutcome;

const MAX_LISTED_ANOMALIES: usize = 3;
const MAX_LISTED_MENTIONS: usize = 2;

#[derive(Serialize)]
struct JsonOutcome<'a> {
    instrument_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dominant_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a InstrumentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn render_json(outcomes: &[InstrumentOutcome]) -> Result<String> {
    let rows: Vec<JsonOutcome> = outcomes
        .iter()
        .map(|o| JsonOutcome {
            instrument_id: &o.instrument_id,
            dominant_label: o.result.as_ref().ok().map(|s| dominant_label(s)),
            summary: o.result.as_ref().ok().map(|s| s.as_ref()),
            error: o.result.as_ref().err().map(|e| format!("{:#}", e)),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

// 没有事件时视为中性
fn dominant_label(summary: &InstrumentSummary) -> &'static str {
    summary
        .profile
        .as_ref()
        .map(|p| p.dominant_label())
        .unwrap_or(SentimentLabel::Neutral)
        .as_str()
}

pub fn render_table(outcomes: &[InstrumentOutcome]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>8} {:>8} {:>8} {:>9} {:>8} {:>8} {:>8} {:>10} {:>8} {:>6}",
        "Ticker", "Mood", "Latest", "Avg", "Mom%", "Vol", "Corr", "P", "Lead", "VolCorr", "Spikes"
    );
    let _ = writeln!(out, "{}", "-".repeat(103));

    for outcome in outcomes {
        match &outcome.result {
            Ok(s) => {
                let c = &s.correlation;
                let _ = writeln!(
                    out,
                    "{:<8} {:>8} {:>8.3} {:>8.3} {:>9.1} {:>8.3} {:>8.3} {:>8.3} {:>10} {:>8.3} {:>6}{}",
                    s.instrument_id,
                    dominant_label(s),
                    s.latest_sentiment,
                    s.avg_sentiment,
                    s.momentum,
                    s.sentiment_volatility,
                    c.contemporaneous_corr,
                    c.contemporaneous_pvalue,
                    format!("{:.3}@{}", c.leading_corr, c.leading_lag),
                    c.volume_corr,
                    s.spike_count,
                    if c.is_significant() { " *" } else { "" }
                );
            }
            Err(e) => {
                let _ = writeln!(out, "{:<8} ERROR: {:#}", outcome.instrument_id, e);
            }
        }
    }

    for summary in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        if summary.anomalies.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{} 情绪异常 (前 {} 条):", summary.instrument_id, MAX_LISTED_ANOMALIES);
        for a in summary.anomalies.iter().take(MAX_LISTED_ANOMALIES) {
            let _ = writeln!(
                out,
                "  {}  score={:+.3}  z={:+.2}  {}",
                format_ts(a.timestamp, "%Y-%m-%d %H:%M"),
                a.sentiment_score,
                a.z_score,
                a.source_text
            );
        }
    }

    for summary in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        let positive = summary.top_positive.iter().filter(|m| m.score > 0.0);
        let negative = summary.top_negative.iter().filter(|m| m.score < 0.0);
        let listed: Vec<_> = positive
            .take(MAX_LISTED_MENTIONS)
            .chain(negative.take(MAX_LISTED_MENTIONS))
            .collect();
        if listed.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{} 代表性帖子:", summary.instrument_id);
        for m in listed {
            let _ = writeln!(
                out,
                "  {}  {:+.3}  [{}] {}",
                format_ts(m.timestamp, "%Y-%m-%d %H:%M"),
                m.score,
                m.source_label,
                m.text
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use anyhow::anyhow;
    use chrono::{TimeDelta, TimeZone, Utc};
    use sentiment_quant_analytics::summarize;
    use sentiment_quant_common::SentimentEvent;

    fn outcomes() -> Vec<InstrumentOutcome> {
        let base = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        let mut events: Vec<_> = (0..11)
            .map(|h| SentimentEvent::new("AAPL", base + TimeDelta::hours(h), 0.0, 0.1, "News", "flat"))
            .collect();
        events.push(SentimentEvent::new("AAPL", base + TimeDelta::hours(11), 0.9, 0.9, "News", "$AAPL to the moon!"));
        let summary = summarize("AAPL", &[], &events).unwrap();
        vec![
            InstrumentOutcome {
                instrument_id: "AAPL".to_string(),
                result: Ok(Arc::new(summary)),
            },
            InstrumentOutcome {
                instrument_id: "BAD".to_string(),
                result: Err(anyhow!("upstream unavailable")),
            },
        ]
    }

    #[test]
    fn table_lists_every_instrument_and_anomaly() {
        let table = render_table(&outcomes());
        assert!(table.contains("AAPL"));
        assert!(table.contains("BAD      ERROR: upstream unavailable"));
        assert!(table.contains("2024-06-03 11:00"));
        assert!(table.contains("$AAPL to the moon!"));
    }

    #[test]
    fn table_shows_mood_momentum_and_mentions() {
        let table = render_table(&outcomes());
        let row = table.lines().find(|l| l.starts_with("AAPL")).unwrap();
        assert!(row.contains("Neutral"));
        assert!(row.contains("0.0"));
        assert!(table.contains("AAPL 代表性帖子:"));
        assert!(table.contains("+0.900  [News] $AAPL to the moon!"));
        // 中性帖子不会被列为负面
        assert!(!table.contains("[News] flat"));
    }

    #[test]
    fn json_carries_summary_or_error() {
        let json = render_json(&outcomes()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["instrument_id"], "AAPL");
        assert_eq!(value[0]["summary"]["spike_count"], 1);
        assert_eq!(value[0]["dominant_label"], "Neutral");
        assert_eq!(value[0]["summary"]["momentum"], 0.0);
        assert_eq!(value[0]["summary"]["top_positive"][0]["text"], "$AAPL to the moon!");
        assert!(value[1].get("dominant_label").is_none());
        assert!(value[0].get("error").is_none());
        assert_eq!(value[1]["error"], "upstream unavailable");
    }
}
