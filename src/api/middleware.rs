use crate::api::AppState;
use crate::services::{AuthGuard, TokenStore};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

/// Access token of an authenticated session.
///
/// Anonymous requests are turned away with a redirect to `/login` before
/// the handler runs, so no Spotify call is made on their behalf.
pub struct RequireToken(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireToken {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match TokenStore::new(session).guard().await {
            Ok(AuthGuard::Authenticated(token)) => Ok(RequireToken(token)),
            Ok(AuthGuard::RedirectToLogin) => {
                tracing::debug!("No access token for {}, redirecting to login", parts.uri.path());
                Err(Redirect::to("/login").into_response())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}
