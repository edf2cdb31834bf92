use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::SessionTokens;
use crate::services::TokenStore;
use crate::views;
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
}

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", get(logout))
}

async fn index() -> Html<String> {
    Html(views::login_page())
}

async fn login(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let url = state.spotify.authorize_url()?;
    Ok(Redirect::to(&url))
}

async fn callback(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect> {
    let code = query.code.ok_or(AppError::AuthorizationFailed)?;

    let tokens: SessionTokens = state.spotify.exchange_code(&code).await?.into();
    let store = TokenStore::new(session);

    // Nothing is kept for a failed exchange, so /stats falls back to /login
    if tokens.bearer().is_none() {
        tracing::warn!("Token exchange returned no access token");
        store.clear().await?;
    } else {
        store.save(tokens).await?;
        tracing::info!("Stored Spotify tokens for new session");
    }

    Ok(Redirect::to("/stats"))
}

async fn logout(session: Session) -> Result<Redirect> {
    TokenStore::new(session).clear().await?;
    Ok(Redirect::to("/"))
}
