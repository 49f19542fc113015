use super::error::ApiError;
use super::state::ServerState;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// The identity behind a verified bearer token.
#[derive(Debug)]
pub struct Session {
    pub subject: String,
}

fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    // The scheme is case-insensitive.
    if value.len() < BEARER_PREFIX.len()
        || !value[..BEARER_PREFIX.len()].eq_ignore_ascii_case(BEARER_PREFIX)
    {
        return None;
    }
    let token = value[BEARER_PREFIX.len()..].trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = match extract_bearer_token(parts) {
            Some(token) => token,
            None => {
                debug!("No bearer token in Authorization header.");
                return Err(ApiError::unauthorized());
            }
        };

        let claims = ctx.token_issuer.verify(token)?;
        Ok(Session {
            subject: claims.sub,
        })
    }
}
