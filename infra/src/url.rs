//! Absolute site URLs for links in account emails

use ::url::Url;
use cms_core::services::account::UrlBuilder;

use crate::InfrastructureError;

/// Builds URLs relative to the configured site root
#[derive(Debug, Clone)]
pub struct SiteUrlBuilder {
    base: Url,
}

impl SiteUrlBuilder {
    /// Create a builder for `site_url`, e.g. `https://example.org/cms/`
    ///
    /// The root is treated as a directory whether or not it ends in `/`.
    pub fn new(site_url: &str) -> Result<Self, InfrastructureError> {
        let mut base = Url::parse(site_url).map_err(|e| {
            InfrastructureError::Config(format!("Invalid site URL '{}': {}", site_url, e))
        })?;

        if base.cannot_be_a_base() {
            return Err(InfrastructureError::Config(format!(
                "Site URL '{}' cannot be used as a base",
                site_url
            )));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base })
    }

    /// Site root, always ending in `/`
    pub fn base(&self) -> &str {
        self.base.as_str()
    }
}

impl UrlBuilder for SiteUrlBuilder {
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = match self.base.join(path.trim_start_matches('/')) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(event = "url_join_failed", path, error = %e, "Falling back to site root");
                self.base.clone()
            }
        };

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        url.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_base_and_path_with_single_slash() {
        let builder = SiteUrlBuilder::new("https://example.org/cms/").unwrap();

        assert_eq!(builder.base(), "https://example.org/cms/");
        assert_eq!(builder.build_url("/verify", &[]), "https://example.org/cms/verify");
        assert_eq!(builder.build_url("verify", &[]), "https://example.org/cms/verify");
    }

    #[test]
    fn test_base_without_trailing_slash_keeps_its_path() {
        let builder = SiteUrlBuilder::new("https://example.org/cms").unwrap();

        assert_eq!(builder.build_url("verify", &[]), "https://example.org/cms/verify");
    }

    #[test]
    fn test_appends_query_parameters_in_order() {
        let builder = SiteUrlBuilder::new("https://example.org").unwrap();

        let url = builder.build_url("verify", &[("code", "abc-123"), ("lang", "nl")]);

        assert_eq!(url, "https://example.org/verify?code=abc-123&lang=nl");
    }

    #[test]
    fn test_encodes_reserved_characters() {
        let builder = SiteUrlBuilder::new("https://example.org").unwrap();

        let url = builder.build_url("reset", &[("next", "/a b&c=ü")]);

        assert_eq!(url, "https://example.org/reset?next=%2Fa+b%26c%3D%C3%BC");
    }

    #[test]
    fn test_rejects_unparseable_site_url() {
        let result = SiteUrlBuilder::new("not a url");

        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }

    #[test]
    fn test_rejects_site_url_that_cannot_be_a_base() {
        let result = SiteUrlBuilder::new("mailto:admin@example.org");

        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }
}
