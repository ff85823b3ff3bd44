//! Web server module for DevLog.
//!
//! Provides the JSON REST API over the entry store, plus optional hosting of
//! a built single-page UI.

mod error;
mod middleware;
mod rate_limit;

pub use error::{ApiError, GENERIC_VALIDATION_MESSAGE, RATE_LIMIT_MESSAGE};
pub use middleware::{CONTENT_SECURITY_POLICY, client_key};
pub use rate_limit::{RateLimiter, RateLimits};

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path as UrlPath, Query, Request, State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::from_fn,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::config::{Environment, RateLimitConfig, ServerConfig};
use crate::storage::{Entry, EntryQuery, EntryStore, SortOrder, Statistics, StorageError};
use crate::validation::{ValidationError, parse_datetime};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: EntryStore,
    pub environment: Environment,
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppState {
    /// State with default server and rate-limit settings.
    pub fn new(store: EntryStore, environment: Environment) -> Self {
        Self {
            store,
            environment,
            server: ServerConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }

    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    fn reject(&self, err: impl Into<StorageError>) -> ApiError {
        ApiError::storage(err, self.environment)
    }
}

/// Query parameters for the entries list.
///
/// Any filter switches the listing to a search, newest first by default.
#[derive(Debug, Default, Deserialize)]
pub struct EntriesQueryParams {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub order: Option<String>,
}

impl EntriesQueryParams {
    /// Convert into a store query. Blank parameters are ignored.
    pub fn into_query(self) -> Result<EntryQuery, ValidationError> {
        let order = non_blank(self.order)
            .map(|order| {
                order.parse::<SortOrder>().map_err(|_| ValidationError::InvalidFormat {
                    field: "order",
                    reason: "must be asc or desc",
                })
            })
            .transpose()?;

        Ok(EntryQuery {
            text: non_blank(self.q),
            tag: non_blank(self.tag),
            category: non_blank(self.category),
            start: non_blank(self.from)
                .map(|from| parse_bound("from", &from, false))
                .transpose()?,
            end: non_blank(self.to)
                .map(|to| parse_bound("to", &to, true))
                .transpose()?,
            order,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a time bound. A bare date as an upper bound covers the whole day.
fn parse_bound(
    field: &'static str,
    value: &str,
    upper: bool,
) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = ValidationError::InvalidFormat {
        field,
        reason: "must be an RFC 3339 timestamp or a YYYY-MM-DD date",
    };
    let ts = parse_datetime(value).ok_or(invalid.clone())?;

    if upper && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return ts
            .checked_add_signed(TimeDelta::days(1))
            .and_then(|next_day| next_day.checked_sub_signed(TimeDelta::nanoseconds(1)))
            .ok_or(invalid);
    }
    Ok(ts)
}

/// Create the Axum router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let rate_limits = Arc::new(RateLimits::new(
        &state.rate_limit,
        state.environment,
        state.server.trust_proxy,
    ));
    let body_limit = state.server.body_limit;
    let trust_proxy = state.server.trust_proxy;
    let cors = cors_layer(&state.server);
    let app_state = Arc::new(state);

    let api = Router::new()
        .route("/entries", get(list_entries_handler).post(create_entry_handler))
        .route("/entries/stats", get(stats_handler))
        .route("/entries/tags", get(tags_handler))
        .route("/entries/categories", get(categories_handler))
        .route(
            "/entries/{id}",
            get(get_entry_handler)
                .put(update_entry_handler)
                .delete(delete_entry_handler),
        )
        .fallback(not_found_handler)
        .layer(from_fn_with_state(rate_limits, rate_limit::rate_limit));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .fallback(fallback_handler)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn_with_state(body_limit, middleware::enforce_body_limit))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(middleware::security_headers))
        .layer(from_fn_with_state(trust_proxy, middleware::log_requests))
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .with_state(app_state)
}

/// CORS restricted to the configured origins; `*` allows any origin
/// without credentials.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins = server.cors_origins();
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ]);

    if origins.contains(&"*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

/// Liveness probe.
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// List entries, or search them when any filter is given.
async fn list_entries_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EntriesQueryParams>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let query = params.into_query().map_err(|e| state.reject(e))?;

    if query.is_unfiltered() && query.order.is_none() {
        return Ok(Json(state.store.list().await));
    }

    let entries = state.store.search(&query).await.map_err(|e| state.reject(e))?;
    Ok(Json(entries))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<Statistics> {
    Json(state.store.statistics().await)
}

async fn tags_handler(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.store.tags().await)
}

async fn categories_handler(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.store.categories().await)
}

async fn get_entry_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Entry>, ApiError> {
    let entry = state.store.get_by_id(&id).await.map_err(|e| state.reject(e))?;
    Ok(Json(entry))
}

async fn create_entry_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let Json(payload) = read_json(&state, payload)?;
    let entry = state.store.add(&payload).await.map_err(|e| state.reject(e))?;

    tracing::debug!(id = %entry.id, tags = entry.tags.len(), "Entry created");
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_entry_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Entry>, ApiError> {
    let Json(payload) = read_json(&state, payload)?;
    let entry = state
        .store
        .update(&id, &payload)
        .await
        .map_err(|e| state.reject(e))?;

    tracing::debug!(id = %entry.id, "Entry updated");
    Ok(Json(entry))
}

async fn delete_entry_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id).await.map_err(|e| state.reject(e))?;

    tracing::debug!(%id, "Entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Map body extraction failures: oversize bodies to 413, anything else
/// (malformed JSON, wrong content type) to a validation error.
fn read_json(
    state: &AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge;
        }
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        state.reject(ValidationError::InvalidInput {
            field: "request body",
            expected: "a valid JSON object",
        })
    })
}

async fn not_found_handler() -> ApiError {
    ApiError::RouteNotFound
}

/// Serve the UI for non-API paths when a static directory is configured.
async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let path = request.uri().path();
    let reserved = path.starts_with("/api") || path.starts_with("/health");

    match &state.server.static_dir {
        Some(dir) if !reserved => {
            let index = Path::new(dir).join("index.html");
            match ServeDir::new(dir)
                .fallback(ServeFile::new(index))
                .oneshot(request)
                .await
            {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            }
        }
        _ => ApiError::RouteNotFound.into_response(),
    }
}
