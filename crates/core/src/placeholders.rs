//! Placeholder tokens and their replacement values.
//!
//! Template text carries literal tokens such as `{company}` or `{summary}`.
//! A [`PlaceholderMap`] pairs each token with the value it stands for and
//! performs the textual replacement for one paragraph at a time.

use crate::CompanyProfile;
use chrono::NaiveDate;

/// Shown for optional profile fields the provider did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Mapping of literal tokens to replacement values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a token.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        if token.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(token, value);
        self
    }

    /// Tokens for the title slide.
    pub fn title_slide(profile: &CompanyProfile, today: NaiveDate) -> Self {
        Self::new()
            .with("{company}", profile.name.as_str())
            .with("{date}", today.format("%Y-%m-%d").to_string())
    }

    /// Tokens for the company overview slide.
    pub fn overview_slide(profile: &CompanyProfile) -> Self {
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self::new()
            .with("{c}", profile.name.as_str())
            .with("{s}", or_na(&profile.sector))
            .with("{i}", or_na(&profile.industry))
            .with("{co}", or_na(&profile.country))
            .with("{ci}", or_na(&profile.city))
            .with(
                "{ee}",
                profile
                    .employees
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            )
            .with("{w}", or_na(&profile.website))
            .with("{summary}", or_na(&profile.summary))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    /// Whether any token occurs in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.entries.iter().any(|(t, _)| text.contains(t.as_str()))
    }

    /// Replace every token occurrence in `text`.
    ///
    /// Returns `None` when no token occurs, so callers can leave the source untouched.
    /// Scanning is a single left-to-right pass preferring the longest token at each
    /// position; inserted values are never rescanned.
    pub fn substitute(&self, text: &str) -> Option<String> {
        if !self.matches(text) {
            return None;
        }

        let mut by_length: Vec<&(String, String)> = self.entries.iter().collect();
        by_length.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut output = String::with_capacity(text.len());
        let mut rest = text;
        while !rest.is_empty() {
            match by_length.iter().find(|(t, _)| rest.starts_with(t.as_str())) {
                Some((token, value)) => {
                    output.push_str(value);
                    rest = &rest[token.len()..];
                }
                None => {
                    let ch = rest.chars().next().unwrap_or_default();
                    output.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }

        Some(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CompanyProfile {
        CompanyProfile {
            name: "Apple Inc.".to_string(),
            sector: Some("Technology".to_string()),
            industry: Some("Consumer Electronics".to_string()),
            country: Some("United States".to_string()),
            city: Some("Cupertino".to_string()),
            employees: Some(164000),
            website: Some("https://www.apple.com".to_string()),
            summary: None,
            logo_url: "https://example.com/logo.png".to_string(),
            currency: Some("USD".to_string()),
        }
    }

    #[test]
    fn test_title_slide_tokens() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let map = PlaceholderMap::title_slide(&profile(), today);
        assert_eq!(map.get("{company}"), Some("Apple Inc."));
        assert_eq!(map.get("{date}"), Some("2024-03-05"));
    }

    #[test]
    fn test_overview_slide_fallbacks() {
        let map = PlaceholderMap::overview_slide(&profile());
        assert_eq!(map.len(), 8);
        assert_eq!(map.get("{ee}"), Some("164000"));
        assert_eq!(map.get("{summary}"), Some(NOT_AVAILABLE));
    }

    #[test]
    fn test_substitute_no_token_is_none() {
        let map = PlaceholderMap::new().with("{c}", "Apple");
        assert_eq!(map.substitute("Company overview"), None);
    }

    #[test]
    fn test_substitute_similar_tokens() {
        let map = PlaceholderMap::overview_slide(&profile());
        let text = map.substitute("{ci}, {co} ({c})").unwrap();
        assert_eq!(text, "Cupertino, United States (Apple Inc.)");
    }

    #[test]
    fn test_substitute_does_not_rescan_values() {
        let map = PlaceholderMap::new()
            .with("{summary}", "Uses {w} literally")
            .with("{w}", "example.com");
        assert_eq!(
            map.substitute("{summary}").unwrap(),
            "Uses {w} literally"
        );
    }

    #[test]
    fn test_substitute_repeated_and_unicode() {
        let map = PlaceholderMap::new().with("{company}", "Nestlé");
        assert_eq!(
            map.substitute("« {company} » / {company}").unwrap(),
            "« Nestlé » / Nestlé"
        );
    }

    #[test]
    fn test_insert_overwrites() {
        let map = PlaceholderMap::new().with("{c}", "a").with("{c}", "b");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("{c}"), Some("b"));
    }
}
