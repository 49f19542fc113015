use axum::extract::FromRef;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenIssuer;
use crate::show_store::ShowStore;

use super::ServerConfig;

pub type GuardedShowStore = Arc<dyn ShowStore>;
pub type GuardedTokenIssuer = Arc<TokenIssuer>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
    pub show_store: GuardedShowStore,
    pub token_issuer: GuardedTokenIssuer,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        show_store: GuardedShowStore,
        token_issuer: GuardedTokenIssuer,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            started_at: Utc::now(),
            show_store,
            token_issuer,
            hash: env!("GIT_HASH").to_string(),
        }
    }
}

impl FromRef<ServerState> for GuardedShowStore {
    fn from_ref(input: &ServerState) -> Self {
        input.show_store.clone()
    }
}

impl FromRef<ServerState> for GuardedTokenIssuer {
    fn from_ref(input: &ServerState) -> Self {
        input.token_issuer.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
