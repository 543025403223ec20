//! Application origin: URL resolution and same-origin checks.

use url::Url;

use super::errors::ApiError;

/// Origin the client acts on behalf of
///
/// Relative request targets are resolved against the configured base URL the
/// way a browser resolves them against the page URL. Only URLs whose scheme,
/// host and port match the base receive the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppOrigin {
    base: Url,
}

impl AppOrigin {
    /// Parse the base URL
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] unless `base_url` is an absolute http(s)
    /// URL with a host.
    pub fn parse(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL {base_url:?}: {e}")))?;

        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(ApiError::Config(format!("base URL must be http(s) with a host: {base_url}")));
        }

        Ok(Self { base })
    }

    /// Base URL as configured
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve an absolute or relative target
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] if the target cannot be parsed.
    pub fn resolve(&self, target: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(target)?)
    }

    /// `true` when `url` shares scheme, host and port with the base URL
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base.origin()
    }
}
