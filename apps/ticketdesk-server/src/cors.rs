use std::time::Duration;

use anyhow::{Result, bail};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::CorsConfig;

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

/// Build a CORS layer from config.
///
/// Entries that do not parse as origins, methods or header names are skipped.
/// Any wildcard combined with credentials is rejected since browsers refuse
/// such responses.
pub fn build_cors_layer(cfg: &CorsConfig) -> Result<CorsLayer> {
    let wildcard_origin = is_wildcard(&cfg.allowed_origins);
    if wildcard_origin && cfg.allow_credentials {
        bail!(
            "cors.allowed_origins=['*'] cannot be combined with cors.allow_credentials=true; \
             list explicit origins instead"
        );
    }
    if cfg.allow_credentials
        && (is_wildcard(&cfg.allowed_methods) || is_wildcard(&cfg.allowed_headers))
    {
        bail!("cors.allow_credentials=true requires explicit allowed_methods and allowed_headers");
    }

    let mut layer = CorsLayer::new();

    if wildcard_origin {
        warn!("CORS allows any origin; list explicit origins for production deployments");
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();
        if !origins.is_empty() {
            layer = layer.allow_origin(origins);
        }
    }

    if is_wildcard(&cfg.allowed_methods) {
        layer = layer.allow_methods(Any);
    } else {
        let methods: Vec<Method> = cfg
            .allowed_methods
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        if !methods.is_empty() {
            layer = layer.allow_methods(methods);
        }
    }

    if is_wildcard(&cfg.allowed_headers) {
        layer = layer.allow_headers(Any);
    } else {
        let headers: Vec<HeaderName> = cfg
            .allowed_headers
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        if !headers.is_empty() {
            layer = layer.allow_headers(headers);
        }
    }

    if cfg.allow_credentials {
        layer = layer.allow_credentials(true);
    }
    if cfg.max_age_seconds > 0 {
        layer = layer.max_age(Duration::from_secs(cfg.max_age_seconds));
    }

    Ok(layer)
}
