//! # Sentiment Quant Common
//!
//! 公共类型、错误定义和时间工具

pub mod errors;
pub mod types;
pub mod utils;

// 重新导出常用类型
pub use errors::{AppError, Result};
pub use types::*;
