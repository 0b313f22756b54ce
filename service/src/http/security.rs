//! Response security headers.
//!
//! The header set is assembled once from configuration at startup and
//! attached to every response by [`security_headers_middleware`].

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{
        header::{
            HeaderName, CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
        },
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
    Extension,
};

use crate::config::SecurityHeadersConfig;

/// Insert a configured value, skipping it when it cannot encode as a
/// header. Config validation already rejects the values that matter.
fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

/// Assemble the security header set from configuration.
///
/// Shared across requests as an `Arc` behind an `Extension` layer.
#[must_use]
pub fn build_security_headers(config: &SecurityHeadersConfig) -> Arc<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    insert(&mut headers, X_FRAME_OPTIONS, &config.frame_options);
    insert(
        &mut headers,
        CONTENT_SECURITY_POLICY,
        &config.content_security_policy,
    );
    insert(&mut headers, REFERRER_POLICY, &config.referrer_policy);

    // HSTS pins browsers to HTTPS; only set it on deployments serving TLS.
    if config.hsts_enabled {
        let value = if config.hsts_include_subdomains {
            format!("max-age={}; includeSubDomains", config.hsts_max_age)
        } else {
            format!("max-age={}", config.hsts_max_age)
        };
        insert(&mut headers, STRICT_TRANSPORT_SECURITY, &value);
    }

    Arc::new(headers)
}

/// Extend every response with the pre-built header set.
///
/// Reads the map from an `Extension`; applied as the outermost layer so
/// error responses carry the headers too.
pub async fn security_headers_middleware(
    Extension(headers): Extension<Arc<HeaderMap>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    for (name, value) in headers.iter() {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_present() {
        let headers = build_security_headers(&SecurityHeadersConfig::default());

        for name in [
            X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
            X_XSS_PROTECTION,
            CONTENT_SECURITY_POLICY,
            REFERRER_POLICY,
        ] {
            assert!(headers.contains_key(&name), "missing {name}");
        }
        // HSTS is opt-in and stays out of the defaults.
        assert!(!headers.contains_key(STRICT_TRANSPORT_SECURITY));
    }

    #[test]
    fn hsts_header_when_enabled() {
        let config = SecurityHeadersConfig {
            hsts_enabled: true,
            hsts_max_age: 31_536_000,
            hsts_include_subdomains: true,
            ..SecurityHeadersConfig::default()
        };

        let headers = build_security_headers(&config);
        let hsts = headers
            .get(STRICT_TRANSPORT_SECURITY)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        assert!(hsts.contains("max-age=31536000"));
        assert!(hsts.contains("includeSubDomains"));
    }

    #[test]
    fn custom_frame_options() {
        let config = SecurityHeadersConfig {
            frame_options: "SAMEORIGIN".to_string(),
            ..SecurityHeadersConfig::default()
        };

        let headers = build_security_headers(&config);
        let frame_options = headers
            .get(X_FRAME_OPTIONS)
            .map(|v| v.to_str().unwrap_or_default());

        assert_eq!(frame_options, Some("SAMEORIGIN"));
    }
}
