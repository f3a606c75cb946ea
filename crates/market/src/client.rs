//! Blocking Yahoo Finance client.

use crate::logo::DEFAULT_LOGO_URL_TEMPLATE;
use crate::models::{parse_price_history, parse_profile, parse_statement, statement_types};
use deckgen_core::{
    CompanyProfile, Error, FinancialStatement, HistoryRange, MarketData, MetricSeries, Result,
    StatementKind, Ticker,
};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// Earliest period requested from the fundamentals time series (1985-08-22).
const STATEMENT_PERIOD_START: i64 = 493_590_046;

/// Endpoints and request settings.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// API host, e.g. `https://query1.finance.yahoo.com`.
    pub api_base: String,
    /// Page visited first to obtain the session cookie.
    pub session_url: String,
    /// Logo service URL with a `{domain}` placeholder.
    pub logo_url_template: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            api_base: "https://query1.finance.yahoo.com".to_string(),
            session_url: "https://fc.yahoo.com".to_string(),
            logo_url_template: DEFAULT_LOGO_URL_TEMPLATE.to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl YahooConfig {
    pub fn with_logo_url_template(mut self, template: impl Into<String>) -> Self {
        self.logo_url_template = template.into();
        self
    }
}

/// A Yahoo Finance session: cookie jar plus crumb.
pub struct YahooClient {
    http: Client,
    config: YahooConfig,
    crumb: String,
}

fn provider_error(context: &str, e: reqwest::Error) -> Error {
    Error::Provider(format!("{}: {}", context, e))
}

impl YahooClient {
    /// Open a session. Yahoo rejects API calls without the cookie set by
    /// the session page and the crumb bound to it.
    pub fn connect(config: YahooConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| provider_error("Failed to build HTTP client", e))?;

        // The session page answers 404 but still sets the cookie.
        http.get(&config.session_url)
            .send()
            .map_err(|e| provider_error("Failed to open Yahoo session", e))?;

        let crumb = http
            .get(format!("{}/v1/test/getcrumb", config.api_base))
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| provider_error("Failed to obtain Yahoo crumb", e))?;
        let crumb = crumb.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(Error::Provider("Yahoo returned an invalid crumb".to_string()));
        }

        log::debug!("Opened Yahoo Finance session");
        Ok(Self {
            http,
            config,
            crumb,
        })
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    fn get_text(&self, ticker: &Ticker, url: &str, query: &[(&str, String)]) -> Result<String> {
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("crumb", self.crumb.as_str())])
            .send()
            .map_err(|e| provider_error("Request failed", e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| provider_error("Failed to read response", e))?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::InvalidTicker(ticker.to_string()));
        }
        if !status.is_success() {
            return Err(Error::Provider(format!("{} returned HTTP {}", url, status)));
        }
        Ok(body)
    }

    fn statement(&self, ticker: &Ticker, kind: StatementKind) -> Result<FinancialStatement> {
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            self.config.api_base, ticker
        );
        let query = [
            ("symbol", ticker.to_string()),
            ("type", statement_types(kind)),
            ("period1", STATEMENT_PERIOD_START.to_string()),
            ("period2", chrono::Utc::now().timestamp().to_string()),
        ];
        let body = self.get_text(ticker, &url, &query)?;
        parse_statement(ticker, kind, &body)
    }
}

impl MarketData for YahooClient {
    fn profile(&self, ticker: &Ticker) -> Result<CompanyProfile> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.config.api_base, ticker
        );
        let body = self.get_text(ticker, &url, &[("modules", "assetProfile,price".to_string())])?;
        parse_profile(ticker, &body, &self.config.logo_url_template)
    }

    fn price_history(&self, ticker: &Ticker, range: &HistoryRange) -> Result<MetricSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.config.api_base, ticker);
        let query = [
            ("range", range.period.clone()),
            ("interval", range.interval.clone()),
        ];
        let body = self.get_text(ticker, &url, &query)?;
        parse_price_history(ticker, &body)
    }

    fn income_statement(&self, ticker: &Ticker) -> Result<FinancialStatement> {
        self.statement(ticker, StatementKind::Income)
    }

    fn cash_flow(&self, ticker: &Ticker) -> Result<FinancialStatement> {
        self.statement(ticker, StatementKind::CashFlow)
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {}", url);
        let bytes = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map_err(|e| Error::LogoFetch(format!("{}: {}", url, e)))?;
        if bytes.is_empty() {
            return Err(Error::LogoFetch(format!("{} returned no data", url)));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = YahooConfig::default().with_logo_url_template("https://logo.example/{domain}");
        assert_eq!(config.api_base, "https://query1.finance.yahoo.com");
        assert_eq!(config.logo_url_template, "https://logo.example/{domain}");
    }

    #[test]
    #[ignore = "requires network access to Yahoo Finance"]
    fn test_live_profile_and_history() {
        let client = YahooClient::connect(YahooConfig::default()).unwrap();
        let ticker = Ticker::parse("AAPL").unwrap();

        let profile = client.profile(&ticker).unwrap();
        assert_eq!(profile.name, "Apple Inc.");
        assert!(!client.fetch_image(&profile.logo_url).unwrap().is_empty());

        let prices = client.price_history(&ticker, &HistoryRange::default()).unwrap();
        assert!(prices.points.len() > 12);

        let income = client.income_statement(&ticker).unwrap();
        assert!(income.line_item("Total Revenue").is_ok());
    }

    #[test]
    #[ignore = "requires network access to Yahoo Finance"]
    fn test_live_unknown_ticker() {
        let client = YahooClient::connect(YahooConfig::default()).unwrap();
        let ticker = Ticker::parse("NOSUCHTICKERZZ").unwrap();
        assert!(matches!(
            client.profile(&ticker),
            Err(Error::InvalidTicker(_))
        ));
    }
}
