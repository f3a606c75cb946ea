//! PPTX (Office Open XML) editing backend for company decks.
//!
//! A `.pptx` file is a ZIP archive of XML parts tied together by
//! relationship files. [`Deck`] loads one into memory, substitutes
//! placeholder text, embeds pictures, removes slides and writes it back.

pub mod content_types;
pub mod deck;
pub mod package;
pub mod picture;
pub mod reader;
pub mod rels;
pub mod template;
pub mod text;
mod xml;

pub use deck::Deck;
pub use package::Package;
pub use picture::Frame;
pub use template::builtin_template;
