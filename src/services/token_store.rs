use crate::error::Result;
use crate::models::SessionTokens;
use tower_sessions::{cookie::SameSite, Expiry, Session, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

const TOKENS_KEY: &str = "spotify_tokens";

/// Cookie-backed sessions over a bounded in-memory store. Once `capacity`
/// sessions are live the least recently used ones are evicted, and records
/// also drop out when their expiry date passes.
pub fn session_layer(capacity: u64, secure: bool) -> (MokaStore, SessionManagerLayer<MokaStore>) {
    let store = MokaStore::new(Some(capacity));
    let layer = SessionManagerLayer::new(store.clone())
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnSessionEnd);
    (store, layer)
}

/// Result of checking a session before a protected route runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthGuard {
    Authenticated(String),
    RedirectToLogin,
}

/// Per-browser token storage on top of the session cookie.
#[derive(Clone)]
pub struct TokenStore {
    session: Session,
}

impl TokenStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn load(&self) -> Result<SessionTokens> {
        Ok(self
            .session
            .get::<SessionTokens>(TOKENS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn save(&self, tokens: SessionTokens) -> Result<()> {
        self.session.insert(TOKENS_KEY, tokens).await?;
        Ok(())
    }

    /// Drops every value in the session, not just the tokens
    pub async fn clear(&self) -> Result<()> {
        self.session.flush().await?;
        Ok(())
    }

    pub async fn guard(&self) -> Result<AuthGuard> {
        let tokens = self.load().await?;
        Ok(match tokens.bearer() {
            Some(token) => AuthGuard::Authenticated(token.to_string()),
            None => AuthGuard::RedirectToLogin,
        })
    }
}
