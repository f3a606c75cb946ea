//! Validated input for one generation run.

use chrono::NaiveDate;
use deckgen_core::{Metric, Result, Selection, Ticker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub ticker: Ticker,
    pub selection: Selection,
    /// Date shown on the title slide and in the file name.
    pub today: NaiveDate,
}

impl GenerationRequest {
    pub fn new(ticker: Ticker, selection: Selection, today: NaiveDate) -> Self {
        Self {
            ticker,
            selection,
            today,
        }
    }

    /// Build a request from raw form values. Fails on an empty ticker or an
    /// unknown metric name; repeated metrics are merged.
    pub fn from_form<I, S>(ticker: &str, metrics: I, today: NaiveDate) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ticker = Ticker::parse(ticker)?;
        let selection = metrics
            .into_iter()
            .map(|m| m.as_ref().parse::<Metric>())
            .collect::<Result<Selection>>()?;
        Ok(Self::new(ticker, selection, today))
    }
}
