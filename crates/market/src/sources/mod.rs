//! 数据源

pub mod fallback;
pub mod scored;
pub mod synthetic;
pub mod traits;
pub mod yahoo;

pub use fallback::FallbackPriceSource;
pub use scored::ScoredSentimentSource;
pub use synthetic::SyntheticMarketData;
pub use traits::{PostSource, PriceSource, SentimentSource};
pub use yahoo::YahooChartSource;
