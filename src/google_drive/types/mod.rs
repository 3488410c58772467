mod credential;
mod drive_file;
mod secrets;

pub use credential::{Credential, TokenResponse};
pub use drive_file::{DriveFile, FOLDER};
pub use secrets::ClientSecrets;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub files: Vec<DriveFile>,
}
