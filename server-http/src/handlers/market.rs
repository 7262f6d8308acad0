use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::info;

use application::usecases::Resolution;

use crate::models::MarketQuery;
use crate::state::AppState;

/// Body of the 500 sent when upstream fails and the cache holds nothing.
pub const UNAVAILABLE_BODY: &str = "Issue with upstream provider, and data not in cache.";

/// GET /markets?page=N
///
/// Pages are positive integers, defaulting to 1. The cache key is the full
/// upstream URL for the page, so each page is cached independently. Stale
/// fallbacks return 200 like any other hit; the caller is not told the data
/// may be old.
pub async fn market_summary(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Response {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return (StatusCode::BAD_REQUEST, "page must be a positive integer").into_response();
    }

    let key = upstream::page_url(&state.markets_url, page);
    info!(page, "handling market summary request");

    match state.app.fetch_page.exec(&key).await {
        Resolution::FreshCache(payload)
        | Resolution::Refreshed(payload)
        | Resolution::StaleFallback(payload) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            payload,
        )
            .into_response(),
        Resolution::Unavailable => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            UNAVAILABLE_BODY,
        )
            .into_response(),
    }
}
