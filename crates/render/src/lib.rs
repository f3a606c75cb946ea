//! Bitmap rendering for company decks: line charts and padded logos, written
//! to temporary PNG files that are deleted when dropped.

pub mod asset;
pub mod chart;
pub mod font;
pub mod logo;

pub use asset::RenderedAsset;
pub use chart::{compact_number, ChartRenderer};
pub use font::{load_chart_font, FONT_FAMILY};
pub use logo::LogoNormalizer;
