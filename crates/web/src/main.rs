//! Web server for generating company PowerPoint decks from a ticker.

mod app;
mod page;

use anyhow::{Context, Result};
use clap::Parser;
use deckgen_core::{GeneratorConfig, TemplateSource};
use deckgen_market::{YahooConfig, DEFAULT_LOGO_URL_TEMPLATE};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Serve a form that turns a company ticker into a PowerPoint deck.
#[derive(Parser, Debug)]
#[command(name = "deckgen-web")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8501")]
    bind: SocketAddr,

    /// Six-slide .pptx template (default: built-in template)
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Directory for temporary images (default: system temp dir)
    #[arg(short, long)]
    work_dir: Option<PathBuf>,

    /// TrueType font for chart text (default: search common system fonts)
    #[arg(short, long)]
    font: Option<PathBuf>,

    /// Logo URL template; `{domain}` is replaced by the company's domain
    #[arg(long, default_value = DEFAULT_LOGO_URL_TEMPLATE)]
    logo_url_template: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = build_config(&args)?;
    let yahoo = YahooConfig::default().with_logo_url_template(args.logo_url_template.clone());
    let app = app::router(app::AppState::yahoo(config, yahoo));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    log::info!("Listening on http://{}", args.bind);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn build_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = GeneratorConfig::new().with_font_path(args.font.clone());

    if let Some(template) = &args.template {
        if !template.is_file() {
            anyhow::bail!("Template not found: {}", template.display());
        }
        config = config.with_template(TemplateSource::File(template.clone()));
    }

    if let Some(dir) = &args.work_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create work directory: {}", dir.display()))?;
        config = config.with_work_dir(dir.clone());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["deckgen-web"]);
        assert_eq!(args.bind, "127.0.0.1:8501".parse::<SocketAddr>().unwrap());
        assert_eq!(args.logo_url_template, DEFAULT_LOGO_URL_TEMPLATE);

        let config = build_config(&args).unwrap();
        assert_eq!(config.template, TemplateSource::Builtin);
        assert_eq!(config.font_path, None);
    }

    #[test]
    fn test_missing_template_is_rejected() {
        let args = Args::parse_from(["deckgen-web", "--template", "/no/such/template.pptx"]);
        assert!(build_config(&args).is_err());
    }
}
