use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use super::{flow, store::CredentialStore, types::*, Drive, HTTP};
use crate::Error;

/// Produces fresh credentials, either from a refresh token or by asking the user.
#[async_trait]
pub trait Authorizer {
    async fn refresh(&self, credential: &Credential) -> anyhow::Result<Credential>;

    async fn authorize(&self) -> anyhow::Result<Credential>;
}

/// Talks to Google's OAuth endpoints. The client secrets file is only read to
/// start a new authorization; refreshes use the client stored with the token.
#[derive(Debug, Clone)]
pub struct GoogleAuthorizer {
    secrets_path: PathBuf,
    scopes: Vec<String>,
}

impl GoogleAuthorizer {
    pub fn new(secrets_path: impl Into<PathBuf>, scopes: Vec<String>) -> Self {
        Self {
            secrets_path: secrets_path.into(),
            scopes,
        }
    }

    async fn token(&self, token_uri: &str, form: &[(&str, &str)]) -> anyhow::Result<TokenResponse> {
        let res = HTTP
            .post(token_uri)
            .form(form)
            .send()
            .await
            .with_context(|| format!("Could not send post request to '{}'", token_uri))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.with_context(|| "Could not get response")?;
            return Err(Error::auth(format!("token endpoint returned {status}: {body}")));
        }

        res.json::<TokenResponse>()
            .await
            .with_context(|| format!("Unexpected token response from '{}'", token_uri))
    }
}

#[async_trait]
impl Authorizer for GoogleAuthorizer {
    async fn refresh(&self, credential: &Credential) -> anyhow::Result<Credential> {
        log::info!("Refreshing access token");
        let token = self
            .token(&credential.token_uri, &credential.refresh_form()?)
            .await?;

        credential.refreshed(token)
    }

    async fn authorize(&self) -> anyhow::Result<Credential> {
        let secrets = ClientSecrets::load(&self.secrets_path).await?;
        let grant = flow::run(&secrets, &self.scopes).await?;

        log::info!("Exchanging authorization code");
        let token = self
            .token(
                &secrets.token_uri,
                &[
                    ("client_id", secrets.client_id.as_str()),
                    ("client_secret", secrets.client_secret.as_str()),
                    ("grant_type", "authorization_code"),
                    ("code", grant.code.as_str()),
                    ("redirect_uri", grant.redirect_uri.as_str()),
                ],
            )
            .await?;

        Credential::issued(token, &secrets, &self.scopes)
    }
}

/// Loads, refreshes or obtains the credential for one run.
pub struct CredentialManager<A> {
    store: CredentialStore,
    authorizer: A,
    scopes: Vec<String>,
}

impl<A: Authorizer> CredentialManager<A> {
    pub fn new(store: CredentialStore, authorizer: A, scopes: Vec<String>) -> Self {
        Self {
            store,
            authorizer,
            scopes,
        }
    }

    pub async fn acquire_session(&self) -> anyhow::Result<Drive> {
        let stored = self
            .store
            .load()
            .await?
            .filter(|c| {
                let covers = c.covers(&self.scopes);
                if !covers {
                    log::info!("Stored credential lacks a requested scope, re-authorizing");
                }
                covers
            });

        let credential = match stored {
            Some(c) if c.is_valid()? => {
                log::debug!("Reusing stored credential");
                return Ok(Drive::new(c));
            }
            Some(c) if c.is_refreshable() => self.authorizer.refresh(&c).await?,
            _ => self.authorizer.authorize().await?,
        };

        self.store.save(&credential).await?;
        Ok(Drive::new(credential))
    }
}
