//! Routes and handlers.

use crate::page::{self, Notice};
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::Form;
use deckgen_core::{ascii_filename, GeneratorConfig, Result, PPTX_CONTENT_TYPE};
use deckgen_generator::{GeneratedDeck, GenerationRequest, Generator};
use deckgen_market::{YahooClient, YahooConfig};
use serde::Deserialize;
use std::sync::Arc;

const FAILURE_MESSAGE: &str = "Oops, something went wrong! Try again or use a different ticker";

type Runner = dyn Fn(GenerationRequest) -> Result<GeneratedDeck> + Send + Sync;

/// Shared handler state: how to turn a request into a deck.
#[derive(Clone)]
pub struct AppState {
    runner: Arc<Runner>,
}

impl AppState {
    pub fn new<F>(runner: F) -> Self
    where
        F: Fn(GenerationRequest) -> Result<GeneratedDeck> + Send + Sync + 'static,
    {
        Self {
            runner: Arc::new(runner),
        }
    }

    /// Generate decks from live Yahoo Finance data. Each run opens its own
    /// session.
    pub fn yahoo(config: GeneratorConfig, yahoo: YahooConfig) -> Self {
        Self::new(move |request| {
            let client = YahooClient::connect(yahoo.clone())?;
            Generator::new(client, config.clone()).generate(&request)
        })
    }
}

/// Submitted form. `metric` repeats once per checked box.
#[derive(Debug, Default, Deserialize)]
struct GenerateForm {
    #[serde(default)]
    ticker: String,
    #[serde(default)]
    metric: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .with_state(state)
}

async fn index() -> Response {
    html_page(StatusCode::OK, page::render("", &[], None))
}

async fn generate(State(state): State<AppState>, Form(form): Form<GenerateForm>) -> Response {
    let today = chrono::Local::now().date_naive();
    let request = match GenerationRequest::from_form(&form.ticker, &form.metric, today) {
        Ok(request) => request,
        Err(e) => {
            log::info!("Rejected form submission: {}", e);
            return form_page(StatusCode::BAD_REQUEST, &form, Notice::Warning(e.to_string()));
        }
    };

    let ticker = request.ticker.clone();
    let runner = Arc::clone(&state.runner);
    let outcome = tokio::task::spawn_blocking(move || runner(request)).await;

    match outcome {
        Ok(Ok(deck)) => {
            log::info!("Serving '{}' for {}", deck.filename, ticker);
            download(deck)
        }
        Ok(Err(e)) => {
            log::error!("Deck generation for {} failed: {}", ticker, e);
            let message = format!("{} ({})", FAILURE_MESSAGE, e);
            form_page(StatusCode::INTERNAL_SERVER_ERROR, &form, Notice::Error(message))
        }
        Err(e) => {
            log::error!("Deck generation for {} panicked: {}", ticker, e);
            form_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                &form,
                Notice::Error(FAILURE_MESSAGE.to_string()),
            )
        }
    }
}

fn form_page(status: StatusCode, form: &GenerateForm, notice: Notice) -> Response {
    html_page(status, page::render(&form.ticker, &form.metric, Some(&notice)))
}

fn html_page(status: StatusCode, html: askama::Result<String>) -> Response {
    match html {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            log::error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, FAILURE_MESSAGE).into_response()
        }
    }
}

fn download(deck: GeneratedDeck) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_filename(&deck.filename),
        encode_rfc5987(&deck.filename)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PPTX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        deck.bytes,
    )
        .into_response()
}

/// Percent-encode a header parameter value (RFC 5987 `attr-char` set).
fn encode_rfc5987(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => encoded.push(byte as char),
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}
