use crate::api::middleware::RequireToken;
use crate::api::AppState;
use crate::error::Result;
use crate::models::{RecentlyPlayed, TimeRangeQuery};
use crate::services::{export::EXPORT_LIMIT, relay, stats};
use crate::views;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use std::sync::Arc;

/// Number of plays fetched for the relay
const RECENT_LIMIT: u32 = 50;

pub fn stats_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(top_stats))
        .route("/recently_played", get(recently_played))
        .route("/export", get(export))
}

async fn top_stats(
    State(state): State<Arc<AppState>>,
    RequireToken(token): RequireToken,
    Query(query): Query<TimeRangeQuery>,
) -> Result<Html<String>> {
    let time_range = query.resolve();

    let tracks = state
        .spotify
        .top_tracks(&token, &time_range, stats::TOP_LIMIT)
        .await?;
    let artists = state
        .spotify
        .top_artists(&token, &time_range, stats::TOP_LIMIT)
        .await?;

    let view = stats::build_view(&tracks, &artists, time_range);
    Ok(Html(views::stats_page(&view)))
}

async fn recently_played(
    State(state): State<Arc<AppState>>,
    RequireToken(token): RequireToken,
) -> Result<Response> {
    let items = match state.spotify.recently_played(&token, RECENT_LIMIT).await? {
        RecentlyPlayed::Items(items) => items,
        // Status stays 200 here, unlike the other routes which surface 502
        RecentlyPlayed::UpstreamError(body) => {
            return Ok(format!("Error fetching Spotify data: {}", body).into_response());
        }
    };

    let payload = relay::build_payload(&items)?;
    let stats = state.relay.forward(&payload).await?;

    tracing::info!("Aggregation response: {}", stats);

    Ok(Html(views::recently_played_page(&stats)).into_response())
}

async fn export(
    State(state): State<Arc<AppState>>,
    RequireToken(token): RequireToken,
    Query(query): Query<TimeRangeQuery>,
) -> Result<Redirect> {
    let time_range = query.resolve();

    let tracks = state
        .spotify
        .top_tracks(&token, &time_range, EXPORT_LIMIT)
        .await?;
    let artists = state
        .spotify
        .top_artists(&token, &time_range, EXPORT_LIMIT)
        .await?;

    let url = state
        .exporter
        .export(&tracks, &artists, &time_range, Utc::now())
        .await?;

    Ok(Redirect::to(&url))
}
