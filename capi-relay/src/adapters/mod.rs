//! One adapter per destination. The set is closed: exactly these five.

mod facebook;
mod kwai;
mod pinterest;
mod reddit;
mod tiktok;

pub use facebook::FacebookAdapter;
pub use kwai::KwaiAdapter;
pub use pinterest::PinterestAdapter;
pub use reddit::RedditAdapter;
pub use tiktok::TikTokAdapter;
