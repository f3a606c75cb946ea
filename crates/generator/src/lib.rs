//! Generates a company deck from market data and a slide template.
//!
//! The pipeline fetches the profile, fills the title and overview slides,
//! places the logo, charts every selected metric on its slide, removes the
//! chart slides that were not selected and serializes the result. Any failure
//! aborts the run; temporary images are removed either way.

pub mod pipeline;
pub mod request;

pub use pipeline::{GeneratedDeck, Generator};
pub use request::GenerationRequest;
