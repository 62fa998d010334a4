use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 未打分的社交帖子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub instrument_id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    /// Twitter / Reddit / News
    pub source_label: String,
}
