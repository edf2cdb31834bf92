use crate::models::TokenResponse;
use serde::{Deserialize, Serialize};

/// Credentials held in the browser session after the OAuth callback.
///
/// The refresh token is kept but never exchanged; once the access token
/// expires, Spotify calls fail until the user logs in again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    /// The access token, if one is present and non-empty
    pub fn bearer(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|token| !token.is_empty())
    }
}

impl From<TokenResponse> for SessionTokens {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        }
    }
}
