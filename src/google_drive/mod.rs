mod api;
mod flow;
mod oauth;
mod store;
#[cfg(test)]
mod test_server;
mod types;
mod utils;

use async_trait::async_trait;
use reqwest::Client;

pub use api::*;
pub use oauth::*;
pub use store::CredentialStore;
pub use types::*;
pub use utils::join_ids;

lazy_static::lazy_static! {
    pub static ref HTTP: Client = Client::new();
}

/// The four remote operations the workflow needs from a file store.
#[async_trait]
pub trait DriveApi {
    /// Every file visible to the caller, in the order the API returns them.
    async fn list_files(&self) -> anyhow::Result<Vec<DriveFile>>;

    /// Copies `file_id`; the result carries `id`, `name`, `mimeType` and `parents`.
    async fn copy(&self, file_id: &str) -> anyhow::Result<DriveFile>;

    async fn create_folder(&self, name: &str) -> anyhow::Result<DriveFile>;

    /// Adds `add_parent` and removes the comma separated `remove_parents`.
    async fn update_parents(
        &self,
        file_id: &str,
        add_parent: &str,
        remove_parents: &str,
    ) -> anyhow::Result<DriveFile>;
}
