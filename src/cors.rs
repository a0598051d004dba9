//! CORS allow-list selection and the middleware built from it.

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::Settings;

/// Origins allowed when no frontend origin is configured.
pub const DEV_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

/// Compute the CORS allow-list for the given settings.
///
/// A configured frontend origin is the only allowed origin; otherwise the
/// local development servers are allowed.
pub fn allowed_origins(settings: &Settings) -> Vec<String> {
    match &settings.frontend_origin {
        Some(url) => vec![url.origin().ascii_serialization()],
        None => DEV_ORIGINS.iter().map(|o| o.to_string()).collect(),
    }
}

/// CORS policy attached to an assembled application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    /// Origins permitted to make cross-origin requests, in order.
    pub allowed_origins: Vec<String>,
    /// Whether credentials (cookies, auth headers) are allowed.
    pub allow_credentials: bool,
    /// Whether every request method is allowed.
    pub allow_all_methods: bool,
    /// Whether every request header is allowed.
    pub allow_all_headers: bool,
}

impl CorsPolicy {
    /// Policy for the given settings: computed origins, credentials, any
    /// method and any header.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            allowed_origins: allowed_origins(settings),
            allow_credentials: true,
            allow_all_methods: true,
            allow_all_headers: true,
        }
    }

    /// Build the tower-http layer enforcing this policy.
    ///
    /// With credentials enabled the wildcard `*` is not allowed, so "all
    /// methods" and "all headers" echo whatever the preflight asks for.
    pub fn layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Skipping unusable CORS origin {:?}: {}", origin, e);
                    None
                }
            })
            .collect();

        let methods = match (self.allow_all_methods, self.allow_credentials) {
            (true, true) => AllowMethods::mirror_request(),
            (true, false) => Any.into(),
            (false, _) => AllowMethods::list([]),
        };

        let headers = match (self.allow_all_headers, self.allow_credentials) {
            (true, true) => AllowHeaders::mirror_request(),
            (true, false) => Any.into(),
            (false, _) => AllowHeaders::list([]),
        };

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(self.allow_credentials)
            .allow_methods(methods)
            .allow_headers(headers)
    }
}
