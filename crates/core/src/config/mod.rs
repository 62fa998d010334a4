//! 配置管理模块

pub mod analysis;
pub mod environment;

// 重新导出
pub use analysis::{AnalysisConfig, ConfigFingerprint};
pub use environment::*;
