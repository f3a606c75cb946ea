//! Domain types for company data and metric selection.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A trimmed, non-empty ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Validate user input. Surrounding whitespace is removed; an empty result is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyTicker);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The ticker as entered, without surrounding whitespace.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chartable metric. Declaration order is the fixed template order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "Stock Price")]
    StockPrice,
    #[serde(rename = "Revenue")]
    Revenue,
    #[serde(rename = "Cashflow")]
    Cashflow,
    #[serde(rename = "EBITDA")]
    Ebitda,
}

impl Metric {
    /// All metrics in template order.
    pub const ALL: [Metric; 4] = [
        Metric::StockPrice,
        Metric::Revenue,
        Metric::Cashflow,
        Metric::Ebitda,
    ];

    /// Name shown in the form.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::StockPrice => "Stock Price",
            Metric::Revenue => "Revenue",
            Metric::Cashflow => "Cashflow",
            Metric::Ebitda => "EBITDA",
        }
    }

    /// Zero-based index of this metric's chart slide in the template.
    pub fn slide_index(&self) -> usize {
        match self {
            Metric::StockPrice => 2,
            Metric::Revenue => 3,
            Metric::Cashflow => 4,
            Metric::Ebitda => 5,
        }
    }

    /// Title fragment used on the rendered chart.
    pub fn chart_title(&self) -> &'static str {
        match self {
            Metric::StockPrice => "Stock Price",
            Metric::Revenue => "Total Revenue",
            Metric::Cashflow => "Operating Cash Flow",
            Metric::Ebitda => "EBITDA",
        }
    }

    /// Where the data for this metric comes from.
    pub fn source(&self) -> MetricSource {
        match self {
            Metric::StockPrice => MetricSource::PriceHistory,
            Metric::Revenue => MetricSource::Statement(StatementKind::Income, "Total Revenue"),
            Metric::Cashflow => {
                MetricSource::Statement(StatementKind::CashFlow, "Operating Cash Flow")
            }
            Metric::Ebitda => MetricSource::Statement(StatementKind::Income, "Normalized EBITDA"),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownMetric(s.to_string()))
    }
}

/// Data source of a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    /// Opening prices from the historical price series.
    PriceHistory,
    /// A named line item of a financial statement.
    Statement(StatementKind, &'static str),
}

/// The metrics chosen by the user. Iteration is always in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<Metric>);

impl Selection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `metric` was selected.
    pub fn contains(&self, metric: Metric) -> bool {
        self.0.contains(&metric)
    }

    /// Number of distinct selected metrics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selected metrics in template order.
    pub fn iter(&self) -> impl Iterator<Item = Metric> + '_ {
        self.0.iter().copied()
    }

    /// Whether any selected metric is read from a financial statement.
    pub fn needs_statements(&self) -> bool {
        self.iter()
            .any(|m| matches!(m.source(), MetricSource::Statement(..)))
    }
}

impl FromIterator<Metric> for Selection {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Company metadata shown on the title and overview slides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Display name of the company
    pub name: String,

    /// Sector (e.g., "Technology")
    pub sector: Option<String>,

    /// Industry within the sector
    pub industry: Option<String>,

    /// Country of the headquarters
    pub country: Option<String>,

    /// City of the headquarters
    pub city: Option<String>,

    /// Full-time employee count
    pub employees: Option<u64>,

    /// Company website as reported by the provider
    pub website: Option<String>,

    /// Long business summary
    pub summary: Option<String>,

    /// Where the company logo is fetched from
    pub logo_url: String,


    /// Trading currency, used in chart titles
    pub currency: Option<String>,
}

/// One observation of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// End of the reporting period (or the sample date for prices)
    pub period: NaiveDate,

    /// Observed value in the series currency
    pub value: f64,
}

impl DataPoint {
    pub fn new(period: NaiveDate, value: f64) -> Self {
        Self { period, value }
    }
}

/// A named time series, sorted by period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    /// Line-item or series name (e.g., "Total Revenue")
    pub name: String,

    /// Currency the values are reported in, when known
    pub currency: Option<String>,

    /// Observations, oldest first
    pub points: Vec<DataPoint>,
}

impl MetricSeries {
    /// Build a series, dropping non-finite values and sorting by period.
    pub fn new(name: impl Into<String>, points: impl IntoIterator<Item = DataPoint>) -> Self {
        let mut points: Vec<DataPoint> = points.into_iter().filter(|p| p.value.is_finite()).collect();
        points.sort_by_key(|p| p.period);
        Self {
            name: name.into(),
            currency: None,
            points,
        }
    }

    pub fn with_currency(mut self, currency: Option<String>) -> Self {
        self.currency = currency;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Which financial statement to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    Income,
    CashFlow,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Income => f.write_str("income statement"),
            StatementKind::CashFlow => f.write_str("cash-flow statement"),
        }
    }
}

/// A financial statement indexed by line-item name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub kind: StatementKind,
    pub items: BTreeMap<String, MetricSeries>,
}

impl FinancialStatement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            items: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, series: MetricSeries) {
        self.items.insert(series.name.clone(), series);
    }

    /// Look up a line item, failing if the provider did not report it.
    pub fn line_item(&self, name: &str) -> Result<&MetricSeries> {
        self.items
            .get(name)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::MissingField(format!("{} in {}", name, self.kind)))
    }
}

/// Period and sampling interval for price history, in provider notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRange {
    pub period: String,
    pub interval: String,
}

impl Default for HistoryRange {
    fn default() -> Self {
        Self {
            period: "5y".to_string(),
            interval: "1mo".to_string(),
        }
    }
}
