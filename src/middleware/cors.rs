//! CORS layer

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::config::environment::EnvironmentConfig;

/// Permissive CORS when no origins are configured, otherwise the listed ones
pub fn cors_layer(config: &EnvironmentConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        if config.is_production() {
            tracing::warn!("⚠️ CORS_ORIGINS is empty, allowing any origin");
        }
        return CorsLayer::very_permissive();
    }

    cors_middleware_with_origins(&config.cors_origins)
}

/// CORS restricted to specific origins
pub fn cors_middleware_with_origins(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
