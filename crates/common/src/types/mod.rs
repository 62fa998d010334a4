//! 公共类型定义

pub mod enums;
pub mod price_bar;
pub mod sentiment_event;
pub mod time_range;

// 重新导出
pub use enums::*;
pub use price_bar::*;
pub use sentiment_event::*;
pub use time_range::*;
