//! Shopify webhook endpoint that invalidates cached catalog data.
//!
//! Configure Shopify webhooks for `collections/*` and `products/*` topics to
//! POST to `/api/revalidate?secret=<SHOPIFY_REVALIDATION_SECRET>`.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::shopify::CacheTag;
use crate::state::AppState;

/// Header carrying the webhook topic.
pub const TOPIC_HEADER: &str = "x-shopify-topic";

/// Revalidation query parameters.
#[derive(Deserialize)]
pub struct RevalidateQuery {
    pub secret: Option<String>,
}

/// Invalidate cached entries for the webhook's topic.
///
/// Responds with `{ status, revalidated, now }`; `now` is in milliseconds
/// since the Unix epoch.
#[instrument(skip_all, fields(topic))]
pub async fn revalidate(
    State(state): State<AppState>,
    Query(query): Query<RevalidateQuery>,
    headers: HeaderMap,
) -> Response {
    let secret_ok = query
        .secret
        .as_deref()
        .is_some_and(|secret| state.config().shopify.revalidation_secret_matches(secret));
    if !secret_ok {
        tracing::warn!("Invalid revalidation secret");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": StatusCode::UNAUTHORIZED.as_u16() })),
        )
            .into_response();
    }

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    tracing::Span::current().record("topic", topic);

    let revalidated = match CacheTag::from_topic(topic) {
        Some(tag) => {
            state.storefront().revalidate(tag);
            tracing::info!(?tag, "Revalidated cached Shopify data");
            true
        }
        None => false,
    };

    Json(json!({
        "status": StatusCode::OK.as_u16(),
        "revalidated": revalidated,
        "now": chrono::Utc::now().timestamp_millis(),
    }))
    .into_response()
}
