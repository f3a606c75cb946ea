//! The HTML form page.

use askama::Template;
use deckgen_core::Metric;

/// Message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Bad input; nothing was generated.
    Warning(String),
    /// The pipeline failed.
    Error(String),
}

/// One metric checkbox.
struct MetricOption {
    label: &'static str,
    checked: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    ticker: &'a str,
    metrics: Vec<MetricOption>,
    warning: Option<&'a str>,
    error: Option<&'a str>,
}

/// Render the form, keeping the submitted ticker and metrics.
pub fn render(ticker: &str, selected: &[String], notice: Option<&Notice>) -> askama::Result<String> {
    let metrics = Metric::ALL
        .into_iter()
        .map(|metric| {
            let label = metric.label();
            MetricOption {
                label,
                checked: selected.iter().any(|s| s.trim().eq_ignore_ascii_case(label)),
            }
        })
        .collect();

    let (warning, error) = match notice {
        Some(Notice::Warning(message)) => (Some(message.as_str()), None),
        Some(Notice::Error(message)) => (None, Some(message.as_str())),
        None => (None, None),
    };

    IndexTemplate {
        ticker,
        metrics,
        warning,
        error,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_metric() {
        let html = render("", &[], None).unwrap();
        for metric in Metric::ALL {
            assert!(html.contains(&format!("value=\"{}\"", metric.label())));
        }
        assert!(!html.contains("checked"));
        assert!(!html.contains("role=\"alert\""));
    }

    #[test]
    fn test_keeps_submitted_values_escaped() {
        let html = render(
            "\"><script>",
            &["ebitda".to_string()],
            Some(&Notice::Warning("Please enter company ticker!".to_string())),
        )
        .unwrap();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("value=\"\">"));
        assert!(html.contains("value=\"EBITDA\" checked"));
        assert!(html.contains("<p class=\"warning\" role=\"alert\">Please enter company ticker!</p>"));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_error_notice() {
        let html = render("ZZZZ", &[], Some(&Notice::Error("Oops & more".to_string()))).unwrap();
        assert!(html.contains("class=\"error\""));
        assert!(!html.contains("Oops & more"));
        assert!(html.contains("value=\"ZZZZ\""));
    }
}
