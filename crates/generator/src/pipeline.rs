//! The generation pipeline.

use crate::request::GenerationRequest;
use deckgen_core::{
    deck_filename, CompanyProfile, Error, FinancialStatement, GeneratorConfig, MarketData, Metric,
    MetricSeries, MetricSource, PlaceholderMap, Result, SlidePlan, StatementKind, TemplateSource,
    Ticker, OVERVIEW_SLIDE, TEMPLATE_SLIDE_COUNT, TITLE_SLIDE,
};
use deckgen_pptx::Deck;
use deckgen_render::{ChartRenderer, LogoNormalizer};

const DEFAULT_CURRENCY: &str = "USD";

/// A finished presentation ready for download.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub slide_count: usize,
}

/// Runs the pipeline against a market-data source.
pub struct Generator<M> {
    market: M,
    config: GeneratorConfig,
    charts: ChartRenderer,
    logos: LogoNormalizer,
}

impl<M: MarketData> Generator<M> {
    pub fn new(market: M, config: GeneratorConfig) -> Self {
        let charts = ChartRenderer::new(config.chart_size, config.font_path.as_deref());
        Self::with_renderer(market, config, charts)
    }

    /// Use a specific chart renderer instead of the one built from the config.
    pub fn with_renderer(market: M, config: GeneratorConfig, charts: ChartRenderer) -> Self {
        let logos = LogoNormalizer::new(config.logo_box);
        Self {
            market,
            config,
            charts,
            logos,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the deck for `request`.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GeneratedDeck> {
        let ticker = &request.ticker;
        log::info!(
            "Generating deck for {} with {} metric(s)",
            ticker,
            request.selection.len()
        );

        let profile = self.market.profile(ticker)?;
        let mut data = MetricData::new(&self.market, ticker);
        let mut deck = self.load_template()?;

        deck.replace_text(
            TITLE_SLIDE,
            &PlaceholderMap::title_slide(&profile, request.today),
        )?;
        deck.replace_text(OVERVIEW_SLIDE, &PlaceholderMap::overview_slide(&profile))?;

        {
            let logo = self.market.fetch_image(&profile.logo_url)?;
            let logo = self.logos.render(&logo, &self.config.work_dir)?;
            deck.add_picture_file(OVERVIEW_SLIDE, logo.path(), self.config.logo_placement)?;
        }

        for metric in request.selection.iter() {
            let series = data.series(metric, &self.config)?;
            let title = chart_title(&profile, metric, &series);
            let chart = self.charts.render(&title, &series, &self.config.work_dir)?;
            deck.add_picture_file(metric.slide_index(), chart.path(), self.config.chart_placement)?;
            log::debug!("Charted {} on slide {}", metric, metric.slide_index() + 1);
        }

        let plan = SlidePlan::for_selection(&request.selection);
        deck.remove_slides(plan.removed())?;

        let bytes = deck.to_bytes()?;
        let generated = GeneratedDeck {
            filename: deck_filename(&profile.name, request.today),
            bytes,
            slide_count: deck.slide_count(),
        };
        log::info!(
            "Generated '{}' ({} slides, {} bytes)",
            generated.filename,
            generated.slide_count,
            generated.bytes.len()
        );
        Ok(generated)
    }

    fn load_template(&self) -> Result<Deck> {
        let deck = match &self.config.template {
            TemplateSource::Builtin => Deck::builtin()?,
            TemplateSource::File(path) => Deck::open(path)?,
        };
        if deck.slide_count() != TEMPLATE_SLIDE_COUNT {
            return Err(Error::Template(format!(
                "Template must have {} slides, found {}",
                TEMPLATE_SLIDE_COUNT,
                deck.slide_count()
            )));
        }
        Ok(deck)
    }
}

/// `"{company} {metric title} {currency}"`.
fn chart_title(profile: &CompanyProfile, metric: Metric, series: &MetricSeries) -> String {
    let currency = series
        .currency
        .as_deref()
        .or(profile.currency.as_deref())
        .unwrap_or(DEFAULT_CURRENCY);
    format!("{} {} {}", profile.name, metric.chart_title(), currency)
}

/// Fetches statements and prices at most once per run, and only when a
/// selected metric needs them.
struct MetricData<'a, M> {
    market: &'a M,
    ticker: &'a Ticker,
    income: Option<FinancialStatement>,
    cash_flow: Option<FinancialStatement>,
}

impl<'a, M: MarketData> MetricData<'a, M> {
    fn new(market: &'a M, ticker: &'a Ticker) -> Self {
        Self {
            market,
            ticker,
            income: None,
            cash_flow: None,
        }
    }

    fn series(&mut self, metric: Metric, config: &GeneratorConfig) -> Result<MetricSeries> {
        match metric.source() {
            MetricSource::PriceHistory => self.market.price_history(self.ticker, &config.history),
            MetricSource::Statement(kind, item) => {
                let statement = self.statement(kind)?;
                Ok(statement.line_item(item)?.clone())
            }
        }
    }

    fn statement(&mut self, kind: StatementKind) -> Result<&FinancialStatement> {
        let slot = match kind {
            StatementKind::Income => &mut self.income,
            StatementKind::CashFlow => &mut self.cash_flow,
        };
        if slot.is_none() {
            *slot = Some(match kind {
                StatementKind::Income => self.market.income_statement(self.ticker)?,
                StatementKind::CashFlow => self.market.cash_flow(self.ticker)?,
            });
        }
        slot.as_ref()
            .ok_or_else(|| Error::MissingField(format!("{} for {}", kind, self.ticker)))
    }
}
