//! Yahoo Finance response shapes and their conversion into domain types.

use crate::logo::logo_url_for;
use chrono::{DateTime, NaiveDate};
use deckgen_core::{
    CompanyProfile, DataPoint, Error, FinancialStatement, MetricSeries, Result, StatementKind,
    Ticker,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

/// Name of the price series.
pub const PRICE_SERIES: &str = "Stock Price";

/// Income-statement line items requested from the time-series endpoint:
/// (Yahoo key, line-item name).
pub const INCOME_ITEMS: &[(&str, &str)] = &[
    ("TotalRevenue", "Total Revenue"),
    ("GrossProfit", "Gross Profit"),
    ("OperatingIncome", "Operating Income"),
    ("NetIncome", "Net Income"),
    ("EBITDA", "EBITDA"),
    ("NormalizedEBITDA", "Normalized EBITDA"),
];

/// Cash-flow line items requested from the time-series endpoint.
pub const CASH_FLOW_ITEMS: &[(&str, &str)] = &[
    ("OperatingCashFlow", "Operating Cash Flow"),
    ("CapitalExpenditure", "Capital Expenditure"),
    ("FreeCashFlow", "Free Cash Flow"),
];

pub fn statement_items(kind: StatementKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        StatementKind::Income => INCOME_ITEMS,
        StatementKind::CashFlow => CASH_FLOW_ITEMS,
    }
}

/// Value of the `type` query parameter for a statement request.
pub fn statement_types(kind: StatementKind) -> String {
    statement_items(kind)
        .iter()
        .map(|(key, _)| format!("annual{}", key))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    description: Option<String>,
}

impl ApiError {
    fn into_error(self, ticker: &Ticker) -> Error {
        if self.code.as_deref() == Some("Not Found") {
            return Error::InvalidTicker(ticker.to_string());
        }
        Error::Provider(format!(
            "{}: {}",
            self.code.unwrap_or_else(|| "error".to_string()),
            self.description.unwrap_or_default()
        ))
    }
}

/// Every Yahoo endpoint wraps its payload as `{ "<name>": { result, error } }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<Vec<T>>,
    error: Option<ApiError>,
}

impl<T> Envelope<T> {
    fn first(self, ticker: &Ticker) -> Result<T> {
        if let Some(error) = self.error {
            return Err(error.into_error(ticker));
        }
        self.result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| Error::InvalidTicker(ticker.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: Envelope<QuoteSummaryResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    asset_profile: Option<AssetProfile>,
    price: Option<PriceModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
    country: Option<String>,
    city: Option<String>,
    full_time_employees: Option<u64>,
    website: Option<String>,
    long_business_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Envelope<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    open: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: Envelope<TimeseriesResult>,
}

/// One requested type. Values sit under a key named after the type
/// (`annualTotalRevenue`), next to `meta` and `timestamp`.
#[derive(Debug, Deserialize)]
struct TimeseriesResult {
    meta: TimeseriesMeta,
    #[serde(flatten)]
    values: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesMeta {
    #[serde(rename = "type", default)]
    kind: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportedPoint {
    as_of_date: NaiveDate,
    currency_code: Option<String>,
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: Option<f64>,
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| Error::Provider(format!("Unexpected {} response: {}", what, e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Build the company profile from a `quoteSummary` response with the
/// `assetProfile` and `price` modules.
pub fn parse_profile(ticker: &Ticker, body: &str, logo_url_template: &str) -> Result<CompanyProfile> {
    let response: QuoteSummaryResponse = decode(body, "profile")?;
    let result = response.quote_summary.first(ticker)?;
    let profile = result.asset_profile.unwrap_or_default();
    let price = result.price.unwrap_or_default();

    let name = non_empty(price.short_name)
        .or_else(|| non_empty(price.long_name))
        .ok_or_else(|| Error::MissingField("shortName".to_string()))?;
    let website = non_empty(profile.website);
    let logo_url = match website.as_deref() {
        Some(site) => logo_url_for(logo_url_template, site)?,
        None => return Err(Error::MissingField("website".to_string())),
    };

    Ok(CompanyProfile {
        name,
        sector: non_empty(profile.sector),
        industry: non_empty(profile.industry),
        country: non_empty(profile.country),
        city: non_empty(profile.city),
        employees: profile.full_time_employees,
        website,
        summary: non_empty(profile.long_business_summary),
        logo_url,
        currency: non_empty(price.currency),
    })
}

/// Opening prices from a `v8/finance/chart` response. Periods without a
/// price are skipped.
pub fn parse_price_history(ticker: &Ticker, body: &str) -> Result<MetricSeries> {
    let response: ChartResponse = decode(body, "price history")?;
    let result = response.chart.first(ticker)?;
    let opens = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.open)
        .unwrap_or_default();

    let mut skipped = 0usize;
    let mut points = Vec::with_capacity(result.timestamp.len());
    for (ts, open) in result.timestamp.iter().zip(opens.iter()) {
        match (DateTime::from_timestamp(*ts, 0), open) {
            (Some(time), Some(value)) => points.push(DataPoint::new(time.date_naive(), *value)),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::warn!("Skipped {} price points without a value for {}", skipped, ticker);
    }

    let series = MetricSeries::new(PRICE_SERIES, points)
        .with_currency(result.meta.and_then(|m| non_empty(m.currency)));
    if series.is_empty() {
        return Err(Error::MissingField(format!("price history for {}", ticker)));
    }
    Ok(series)
}

/// Annual statement from a fundamentals time-series response. Line items
/// Yahoo did not report are left out; the caller decides whether that is fatal.
pub fn parse_statement(ticker: &Ticker, kind: StatementKind, body: &str) -> Result<FinancialStatement> {
    let response: TimeseriesResponse = decode(body, "statement")?;
    if let Some(error) = response.timeseries.error {
        return Err(error.into_error(ticker));
    }

    let mut statement = FinancialStatement::new(kind);
    for mut result in response.timeseries.result.unwrap_or_default() {
        let Some(type_key) = result.meta.kind.first().cloned() else {
            continue;
        };
        let Some(name) = statement_items(kind)
            .iter()
            .find(|(key, _)| type_key.strip_prefix("annual") == Some(*key))
            .map(|(_, name)| *name)
        else {
            continue;
        };
        let Some(raw) = result.values.remove(&type_key) else {
            continue;
        };

        let reported: Vec<Option<ReportedPoint>> = serde_json::from_value(raw)
            .map_err(|e| Error::Provider(format!("Unexpected {} values: {}", type_key, e)))?;
        let currency = reported
            .iter()
            .flatten()
            .find_map(|p| p.currency_code.clone());
        let points = reported.into_iter().flatten().filter_map(|p| {
            p.reported_value
                .and_then(|v| v.raw)
                .map(|value| DataPoint::new(p.as_of_date, value))
        });
        statement.insert(MetricSeries::new(name, points).with_currency(currency));
    }

    log::debug!(
        "Parsed {} with {} line items for {}",
        kind,
        statement.items.len(),
        ticker
    );
    Ok(statement)
}
