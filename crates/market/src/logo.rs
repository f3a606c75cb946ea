//! Logo URLs derived from a company website.

use deckgen_core::{Error, Result};
use url::Url;

/// Favicon service; `{domain}` is replaced by the website's host name.
pub const DEFAULT_LOGO_URL_TEMPLATE: &str = "https://www.google.com/s2/favicons?domain={domain}&sz=128";

/// Host name of a website URL without a leading `www.`. A website without
/// a scheme is read as `https://`.
fn domain_of(website: &str) -> Option<String> {
    let website = website.trim();
    if website.is_empty() {
        return None;
    }
    let url = if website.contains("://") {
        Url::parse(website)
    } else {
        Url::parse(&format!("https://{}", website))
    }
    .ok()?;

    let host = url.host_str()?.trim_start_matches('[').trim_end_matches(']');
    let host = host.strip_prefix("www.").unwrap_or(host);
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}

/// Logo URL for `website` using `template`.
pub fn logo_url_for(template: &str, website: &str) -> Result<String> {
    let domain = domain_of(website)
        .ok_or_else(|| Error::MissingField(format!("website domain in '{}'", website)))?;
    Ok(template.replace("{domain}", &domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://www.apple.com").as_deref(), Some("apple.com"));
        assert_eq!(domain_of("http://abc.xyz/investor/").as_deref(), Some("abc.xyz"));
        assert_eq!(
            domain_of("www.microsoft.com:443?x=1").as_deref(),
            Some("microsoft.com")
        );
        assert_eq!(
            domain_of("https://user@investor.example.com:8443/ir#top").as_deref(),
            Some("investor.example.com")
        );
        assert_eq!(domain_of("http://[::1]:8080/").as_deref(), Some("::1"));
        assert_eq!(domain_of("https://"), None);
        assert_eq!(domain_of("  "), None);
    }

    #[test]
    fn test_logo_url_for() {
        assert_eq!(
            logo_url_for(DEFAULT_LOGO_URL_TEMPLATE, "https://www.Apple.com").unwrap(),
            "https://www.google.com/s2/favicons?domain=apple.com&sz=128"
        );
        assert_eq!(
            logo_url_for("https://logo.example/{domain}.png", "nvidia.com").unwrap(),
            "https://logo.example/nvidia.com.png"
        );
        assert!(matches!(
            logo_url_for(DEFAULT_LOGO_URL_TEMPLATE, ""),
            Err(Error::MissingField(_))
        ));
    }
}
