//! Scheme and authority public URLs are built from.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// `scheme://host[:port]` of the server as the client reached it.
///
/// A configured `server.public_base_url` wins; otherwise the origin is
/// derived from `X-Forwarded-Proto` (default `http`) and `Host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(pub String);

impl RequestOrigin {
    /// The origin string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(base) = &state.config.server.public_base_url {
            return Ok(Self(base.trim_end_matches('/').to_string()));
        }

        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("http");

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| {
                format!("{}:{}", state.config.server.host, state.config.server.port)
            });

        Ok(Self(format!("{scheme}://{host}")))
    }
}
