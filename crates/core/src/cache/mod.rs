//! 缓存管理

pub mod memo_cache;

// 重新导出
pub use memo_cache::MemoCache;
