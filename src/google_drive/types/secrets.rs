use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The OAuth client downloaded from the Google Cloud console.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum SecretsFile {
    Installed(ClientSecrets),
    Web(ClientSecrets),
}

fn default_auth_uri() -> String {
    AUTH_URI.into()
}

fn default_token_uri() -> String {
    TOKEN_URI.into()
}

impl ClientSecrets {
    pub fn parse(json: &str) -> Result<Self> {
        let file = serde_json::from_str::<SecretsFile>(json)
            .with_context(|| "expected an `installed` or `web` client secrets object")?;

        Ok(match file {
            SecretsFile::Installed(s) | SecretsFile::Web(s) => s,
        })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Could not read client secrets `{}`", path.display()))?;

        Self::parse(&json).with_context(|| format!("Invalid client secrets `{}`", path.display()))
    }
}
