use std::time::{Duration, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::ClientSecrets;

/// Tokens are treated as expired this long before Google says they are, so
/// a request started just before the deadline does not fail midway.
const EXPIRY_LEEWAY: u64 = 60;

/// Tokens plus the OAuth client they were issued to, so a refresh needs
/// nothing beyond this value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: u64,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
}

impl Credential {
    pub fn is_valid(&self) -> Result<bool> {
        let now = UNIX_EPOCH
            .elapsed()
            .with_context(|| "Time went backwards!")?;

        let exp = Duration::from_secs(self.expires_at.saturating_sub(EXPIRY_LEEWAY));

        Ok(now < exp)
    }

    pub fn is_refreshable(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// True when every scope in `wanted` was granted to this credential.
    pub fn covers(&self, wanted: &[String]) -> bool {
        wanted.iter().all(|s| self.scopes.contains(s))
    }

    /// Builds a credential from the code exchange that ends authorization.
    pub fn issued(token: TokenResponse, secrets: &ClientSecrets, scopes: &[String]) -> Result<Self> {
        let scopes = match token.scope {
            Some(ref s) => s.split_whitespace().map(str::to_owned).collect(),
            None => scopes.to_vec(),
        };

        Ok(Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: expires_at(token.expires_in)?,
            scopes,
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            token_uri: secrets.token_uri.clone(),
        })
    }

    /// Applies a refresh response. Google usually omits the refresh token
    /// there, in which case the current one is kept.
    pub fn refreshed(&self, token: TokenResponse) -> Result<Self> {
        let scopes = match token.scope {
            Some(ref s) => s.split_whitespace().map(str::to_owned).collect(),
            None => self.scopes.clone(),
        };

        Ok(Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: expires_at(token.expires_in)?,
            scopes,
            ..self.clone()
        })
    }

    /// Form body for the `refresh_token` grant.
    pub fn refresh_form(&self) -> Result<[(&str, &str); 4]> {
        let refresh_token = self
            .refresh_token
            .as_deref()
            .ok_or_else(|| crate::Error::auth("credential has no refresh token"))?;

        Ok([
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
    }

    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

fn expires_at(expires_in: u64) -> Result<u64> {
    let at = UNIX_EPOCH
        .elapsed()
        .with_context(|| "Time went backwards!")?
        + Duration::from_secs(expires_in);

    Ok(at.as_secs())
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}
