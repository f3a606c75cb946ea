//! Market data from Yahoo Finance: company profile, monthly prices, annual
//! statements and the company logo.
//!
//! Responses are decoded by pure functions in [`models`] so they can be
//! tested without the network; [`YahooClient`] only moves bytes.

pub mod client;
pub mod logo;
pub mod models;

pub use client::{YahooClient, YahooConfig};
pub use logo::{logo_url_for, DEFAULT_LOGO_URL_TEMPLATE};
