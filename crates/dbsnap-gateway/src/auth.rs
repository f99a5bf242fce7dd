// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token middleware for the trigger routes.
//!
//! With no token configured every request is rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects everything.
    pub bearer_token: Option<String>,
}

impl AuthConfig {
    /// An empty configured token counts as no token.
    pub fn from_token(token: &str) -> Self {
        Self {
            bearer_token: (!token.is_empty()).then(|| token.to_string()),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = auth.bearer_token.as_deref() else {
        tracing::error!("gateway has no bearer token configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let presented = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_disables_auth_entirely() {
        assert!(AuthConfig::from_token("").bearer_token.is_none());
        assert_eq!(
            AuthConfig::from_token("t0k3n").bearer_token.as_deref(),
            Some("t0k3n")
        );
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", AuthConfig::from_token("secret-token"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[redacted]"));
    }
}
