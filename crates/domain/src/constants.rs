//! Domain constants
//!
//! Storage keys and endpoint paths shared by every client instance.

/// Storage key holding the short-lived bearer token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key holding the long-lived refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Path of the token refresh endpoint, relative to the API base URL.
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Keychain service name used when none is configured.
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "TradePort";
