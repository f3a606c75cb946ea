//! Core domain types, placeholder maps, slide planning and configuration
//! for generating company presentation decks.

pub mod config;
pub mod error;
pub mod naming;
pub mod placeholders;
pub mod plan;
pub mod provider;
pub mod types;

pub use config::{inches, GeneratorConfig, Placement, TemplateSource, EMU_PER_INCH};
pub use error::{Error, Result};
pub use naming::{ascii_filename, deck_filename, PPTX_CONTENT_TYPE};
pub use placeholders::PlaceholderMap;
pub use plan::{SlidePlan, OVERVIEW_SLIDE, TEMPLATE_SLIDE_COUNT, TITLE_SLIDE};
pub use provider::MarketData;
pub use types::{
    CompanyProfile, DataPoint, FinancialStatement, HistoryRange, Metric, MetricSeries,
    MetricSource, Selection, StatementKind, Ticker,
};
