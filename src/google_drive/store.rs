//! On-disk credential storage.
//!
//! The file is a single JSON object:
//!
//! ```json
//! {
//!   "version": 1,
//!   "access_token": "ya29...",
//!   "refresh_token": "1//0g...",
//!   "expires_at": 1700000000,
//!   "scopes": ["https://www.googleapis.com/auth/drive"],
//!   "client_id": "1234.apps.googleusercontent.com",
//!   "client_secret": "...",
//!   "token_uri": "https://oauth2.googleapis.com/token"
//! }
//! ```
//!
//! `refresh_token` may be absent and `expires_at` is in seconds since the
//! Unix epoch. The client fields let a refresh run without the client
//! secrets file. Tokens are stored in plain text; on unix the file is kept
//! readable by its owner only. Files that fail to parse or carry an unknown
//! `version` are ignored, which sends the user back through authorization.

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::types::Credential;

pub const VERSION: u32 = 1;

#[derive(Deserialize, Serialize)]
struct Stored {
    version: u32,
    #[serde(flatten)]
    credential: Credential,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> anyhow::Result<Option<Credential>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Could not read credentials `{}`", self.path.display())
                })
            }
        };

        match serde_json::from_slice::<Header>(&raw) {
            Ok(Header { version: VERSION }) => {}
            Ok(Header { version }) => {
                log::warn!(
                    "Ignoring `{}`: unsupported credential format version {}",
                    self.path.display(),
                    version
                );
                return Ok(None);
            }
            Err(e) => {
                log::warn!("Ignoring `{}`: {}", self.path.display(), e);
                return Ok(None);
            }
        }

        match serde_json::from_slice::<Stored>(&raw) {
            Ok(s) => Ok(Some(s.credential)),
            Err(e) => {
                log::warn!("Ignoring `{}`: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    pub async fn save(&self, credential: &Credential) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&Stored {
            version: VERSION,
            credential: credential.clone(),
        })?;

        write_private(&self.path, json.as_bytes())
            .await
            .with_context(|| format!("Could not write credentials `{}`", self.path.display()))?;

        log::debug!("Saved credentials to `{}`", self.path.display());
        Ok(())
    }
}

async fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut opts = tokio::fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    opts.mode(0o600);

    let mut f = opts.open(path).await?;
    // `mode` only applies to new files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        f.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }
    f.write_all(contents).await?;
    f.flush().await
}
