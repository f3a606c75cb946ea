//! The market-data provider seam.

use crate::{CompanyProfile, FinancialStatement, HistoryRange, MetricSeries, Result, Ticker};

/// Source of company data for one generation run.
///
/// Implementations block the calling thread; errors abort the run.
pub trait MarketData {
    /// Company metadata including the logo URL.
    fn profile(&self, ticker: &Ticker) -> Result<CompanyProfile>;

    /// Opening prices over `range`.
    fn price_history(&self, ticker: &Ticker, range: &HistoryRange) -> Result<MetricSeries>;

    /// Annual income statement, indexed by line item.
    fn income_statement(&self, ticker: &Ticker) -> Result<FinancialStatement>;

    /// Annual cash-flow statement, indexed by line item.
    fn cash_flow(&self, ticker: &Ticker) -> Result<FinancialStatement>;

    /// Raw bytes of an image (the company logo).
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}

impl<T: MarketData + ?Sized> MarketData for &T {
    fn profile(&self, ticker: &Ticker) -> Result<CompanyProfile> {
        (**self).profile(ticker)
    }

    fn price_history(&self, ticker: &Ticker, range: &HistoryRange) -> Result<MetricSeries> {
        (**self).price_history(ticker, range)
    }

    fn income_statement(&self, ticker: &Ticker) -> Result<FinancialStatement> {
        (**self).income_statement(ticker)
    }

    fn cash_flow(&self, ticker: &Ticker) -> Result<FinancialStatement> {
        (**self).cash_flow(ticker)
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch_image(url)
    }
}
