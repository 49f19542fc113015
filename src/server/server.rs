use anyhow::{Context, Result};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    routing::post,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::metrics::{metrics_handler, record_db_query, record_token_request, set_shows_total};
use super::session::Session;
use super::{log_requests, state::*, ServerConfig};
use crate::auth::{IssuedToken, TokenIssuer};
use crate::show_store::{
    NewShow, SearchQuery, Show, ShowField, ShowFilter, ShowStore, ShowStoreError, ShowUpdate,
    SortDirection,
};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Query string of `GET /shows`. Numbers arrive as strings because
/// flattened urlencoded structs cannot deserialize them directly.
#[derive(Deserialize, Debug, Default)]
struct SearchParams {
    #[serde(flatten)]
    filter: ShowFilter,
    skip: Option<String>,
    limit: Option<String>,
    #[serde(rename = "orderBy")]
    order_by: Option<String>,
    sort: Option<String>,
}

fn parse_int_param(name: &str, value: Option<&str>) -> Result<Option<i64>, ShowStoreError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse::<i64>().map(Some).map_err(|_| {
            ShowStoreError::invalid_parameter(format!("{} must be an integer, got '{}'", name, v))
        }),
    }
}

fn to_search_query(params: SearchParams) -> Result<SearchQuery, ShowStoreError> {
    let order_by = params
        .order_by
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::parse::<ShowField>)
        .transpose()?;
    let sort = params
        .sort
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::parse::<SortDirection>)
        .transpose()?;

    let query = SearchQuery {
        skip: parse_int_param("skip", params.skip.as_deref())?,
        limit: parse_int_param("limit", params.limit.as_deref())?,
        filter: params.filter,
        order_by,
        sort,
    };
    query.validate()?;
    Ok(query)
}

#[derive(Deserialize, Debug)]
struct TokenForm {
    #[serde(default)]
    username: String,
    #[allow(dead_code)] // Accepted for OAuth2 password-flow clients, never checked.
    #[serde(default)]
    password: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Summary {
    pub number_of_shows: usize,
    pub number_of_unique_shows: usize,
    pub number_of_unique_titles: usize,
    pub number_of_unique_directors: usize,
    pub number_of_unique_countries: usize,
    pub api_version: String,
    pub time_current_api_node_started: String,
}

/// Runs a store call and records how long it took.
fn timed<T>(operation: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    record_db_query(operation, start.elapsed());
    result
}

fn refresh_shows_total(store: &dyn ShowStore) {
    match store.count_shows() {
        Ok(count) => set_shows_total(count),
        Err(e) => debug!("Could not refresh shows gauge: {}", e),
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn post_token(
    State(token_issuer): State<GuardedTokenIssuer>,
    form: Result<Form<TokenForm>, FormRejection>,
) -> Result<Json<IssuedToken>, ApiError> {
    let Form(form) = form?;
    match token_issuer.issue(&form.username) {
        Ok(token) => {
            info!("Issued token for {}", form.username);
            record_token_request("success");
            Ok(Json(token))
        }
        Err(err) => {
            record_token_request("unauthorized");
            Err(err.into())
        }
    }
}

async fn create_show(
    session: Session,
    State(store): State<GuardedShowStore>,
    body: Result<Json<NewShow>, JsonRejection>,
) -> Result<(StatusCode, Json<Show>), ApiError> {
    let Json(body) = body?;
    let show = timed("create", || store.create_show(body))?;
    debug!("{} created show {}", session.subject, show.show_id);
    refresh_shows_total(store.as_ref());
    Ok((StatusCode::CREATED, Json(show)))
}

async fn get_show(
    _session: Session,
    State(store): State<GuardedShowStore>,
    show_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Show>, ApiError> {
    let Path(show_id) = show_id?;
    match timed("get", || store.get_show(show_id))? {
        Some(show) => Ok(Json(show)),
        None => Err(ApiError::NotFound),
    }
}

async fn search_shows(
    _session: Session,
    State(store): State<GuardedShowStore>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Show>>, ApiError> {
    let Query(params) = params?;
    let query = to_search_query(params)?;
    let shows = timed("search", || store.search_shows(&query))?;
    Ok(Json(shows))
}

async fn put_show(
    session: Session,
    State(store): State<GuardedShowStore>,
    show_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ShowUpdate>, JsonRejection>,
) -> Result<Json<Show>, ApiError> {
    let Path(show_id) = show_id?;
    let Json(body) = body?;
    let show = timed("update", || store.update_show(show_id, body))?;
    debug!("{} updated show {}", session.subject, show_id);
    Ok(Json(show))
}

async fn delete_show(
    session: Session,
    State(store): State<GuardedShowStore>,
    show_id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(show_id) = show_id?;
    timed("delete", || store.delete_show(show_id))?;
    debug!("{} deleted show {}", session.subject, show_id);
    refresh_shows_total(store.as_ref());
    Ok(StatusCode::NO_CONTENT)
}

async fn get_summary(
    _session: Session,
    State(state): State<ServerState>,
) -> Result<Json<Summary>, ApiError> {
    let store = state.show_store.as_ref();
    let summary = timed("summary", || -> Result<Summary, ShowStoreError> {
        Ok(Summary {
            number_of_shows: store.count_shows()?,
            number_of_unique_shows: store.count_distinct(None)?,
            number_of_unique_titles: store.count_distinct(Some(ShowField::Title))?,
            number_of_unique_directors: store.count_distinct(Some(ShowField::Director))?,
            number_of_unique_countries: store.count_distinct(Some(ShowField::Country))?,
            api_version: API_VERSION.to_string(),
            time_current_api_node_started: format!(
                "{} (UTC)",
                state.started_at.format("%a %b %e %H:%M:%S %Y")
            ),
        })
    })?;
    Ok(Json(summary))
}

pub fn make_app(
    config: ServerConfig,
    show_store: GuardedShowStore,
    token_issuer: GuardedTokenIssuer,
) -> Router {
    let state = ServerState::new(config, show_store, token_issuer);

    let show_routes: Router = Router::new()
        .route("/show/", post(create_show))
        .route("/show/{show_id}", get(get_show).put(put_show).delete(delete_show))
        .route("/shows", get(search_shows))
        .route("/summary", get(get_summary))
        .with_state(state.clone());

    let auth_routes: Router = Router::new()
        .route("/token", post(post_token))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .merge(auth_routes)
        .merge(show_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    show_store: GuardedShowStore,
    token_issuer: Arc<TokenIssuer>,
    config: ServerConfig,
) -> Result<()> {
    refresh_shows_total(show_store.as_ref());

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", config.metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            tracing::error!("Metrics server stopped: {}", e);
        }
    });

    let port = config.port;
    let app = make_app(config, show_store, token_issuer);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    Ok(axum::serve(listener, app).await?)
}
