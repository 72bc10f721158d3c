//! Optional API-key middleware.
//!
//! Enabled when the config carries a non-empty `[auth.keys]` table. Keys
//! arrive via `X-API-Key` or `Authorization: Bearer`; a request whose
//! `Referer` starts with the configured internal prefix bypasses the
//! check. Key metadata (holder name, tier, rate-limit figure) is attached
//! to the request as an extension; rate limits are carried, not enforced.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::server::{AppError, AppState};

/// Identity resolved from an API key, available to handlers as a request
/// extension.
#[derive(Debug, Clone)]
pub struct ApiKeyIdentity {
    pub name: String,
    pub tier: String,
}

pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = &state.config.auth;

    if let Some(prefix) = &auth.internal_referer {
        let internal = request
            .headers()
            .get("referer")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |referer| referer.starts_with(prefix.as_str()));
        if internal {
            return Ok(next.run(request).await);
        }
    }

    let api_key = extract_api_key(&request)
        .ok_or_else(|| AppError::unauthorized("missing API key (X-API-Key or Bearer token)"))?;

    let info = auth
        .keys
        .get(&api_key)
        .ok_or_else(|| AppError::unauthorized("unknown API key"))?;

    request.extensions_mut().insert(ApiKeyIdentity {
        name: info.name.clone(),
        tier: info.tier.clone(),
    });

    Ok(next.run(request).await)
}

fn extract_api_key(request: &Request) -> Option<String> {
    request
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            request
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|auth| auth.strip_prefix("Bearer ").map(str::trim))
        })
        .map(String::from)
}
