use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;
use pricewatch_core::records::ResolvedPrice;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LowestPriceQuery {
    /// Reference date for the lookback window; defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ListLowestPricesQuery {
    pub date: Option<NaiveDate>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_size")]
    pub size: usize,
}

fn default_page() -> usize {
    1
}

fn default_size() -> usize {
    50
}

const MAX_PAGE_SIZE: usize = 100;

/// Pagination envelope for list responses
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total_count: usize,
    pub page_number: usize,
    pub page_size: usize,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/lowest-price/{article_number}",
            get(lowest_price_for_article),
        )
        .route("/v1/lowest-prices", get(all_lowest_prices))
}

/// GET /v1/lowest-price/{article_number}
/// Lowest price for one article over the trailing window
pub async fn lowest_price_for_article(
    State(state): State<AppState>,
    Path(article_number): Path<String>,
    Query(query): Query<LowestPriceQuery>,
) -> Result<Json<ResolvedPrice>, AppError> {
    let today = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let result = state.resolver.resolve(&article_number, today);

    // A zero-price result for an article the catalog has never seen is
    // a 404; the same result for a known article is a valid answer.
    if result.is_fallback() && !state.resolver.knows_article(&article_number) {
        return Err(AppError::NotFoundError(format!(
            "article '{}' not found in price history",
            article_number
        )));
    }

    Ok(Json(result))
}

/// GET /v1/lowest-prices
/// Lowest price for every known article, paginated
pub async fn all_lowest_prices(
    State(state): State<AppState>,
    Query(query): Query<ListLowestPricesQuery>,
) -> Result<Json<Paginated<ResolvedPrice>>, AppError> {
    if query.page < 1 {
        return Err(AppError::ValidationError(
            "page must be at least 1".to_string(),
        ));
    }
    if query.size < 1 || query.size > MAX_PAGE_SIZE {
        return Err(AppError::ValidationError(format!(
            "size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let today = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let mut results = state.resolver.resolve_all(today);
    results.sort_by(|a, b| a.article_number.cmp(&b.article_number));

    let total_count = results.len();
    // An offset past usize::MAX cannot address any data; serve an
    // empty page rather than overflowing.
    let data: Vec<ResolvedPrice> = match (query.page - 1).checked_mul(query.size) {
        Some(offset) => results
            .into_iter()
            .skip(offset)
            .take(query.size)
            .collect(),
        None => Vec::new(),
    };

    Ok(Json(Paginated {
        data,
        total_count,
        page_number: query.page,
        page_size: query.size,
    }))
}
