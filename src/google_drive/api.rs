use anyhow::Context;
use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use reqwest::header::*;

use super::{types::*, utils, DriveApi, HTTP};

pub const RES_URI: &str = "https://www.googleapis.com/drive/v3/files";

lazy_static::lazy_static! {
    static ref GET_FIELDS: String = DriveFile::fields().join(",");
    static ref LIST_FIELDS: String = format!("nextPageToken,files({})", GET_FIELDS.as_str());
}

/// A Drive v3 client bound to one credential.
#[derive(Debug, Clone)]
pub struct Drive {
    credential: Credential,
    res_uri: String,
}

impl Drive {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            res_uri: RES_URI.into(),
        }
    }

    #[cfg(test)]
    pub fn with_res_uri(credential: Credential, res_uri: impl Into<String>) -> Self {
        Self {
            credential,
            res_uri: res_uri.into(),
        }
    }

    #[cfg(test)]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn list_meta(&self) -> impl Stream<Item = anyhow::Result<DriveFile>> + '_ {
        let mut next_page_token: Option<String> = None;

        try_stream! {
            loop {
                let res = self.list(next_page_token.as_deref()).await?;

                for f in res.files.into_iter() {
                    yield f;
                }

                match res.next_page_token {
                    None => break,
                    Some(t) => next_page_token = Some(t),
                };
            }
        }
    }

    async fn list(&self, page_token: Option<&str>) -> anyhow::Result<ListResponse> {
        let url = self.res_uri.as_str();
        log::debug!("GET {url} page_token={page_token:?}");

        let res = HTTP
            .get(url)
            .query(&list_query(page_token))
            .header(AUTHORIZATION, self.credential.auth_header())
            .send()
            .await
            .with_context(|| format!("Could not send GET request to `{url}`"))?;

        utils::json(res).await
    }
}

fn list_query(page_token: Option<&str>) -> Vec<(&'static str, &str)> {
    let mut query = vec![
        ("fields", LIST_FIELDS.as_str()),
        ("pageSize", "1000"),
        ("supportsAllDrives", "true"),
        ("includeItemsFromAllDrives", "true"),
    ];
    if let Some(t) = page_token {
        query.push(("pageToken", t));
    }
    query
}

/// `removeParents` is left out entirely when there is nothing to remove.
fn update_query<'a>(add_parent: &'a str, remove_parents: &'a str) -> Vec<(&'static str, &'a str)> {
    let mut query = vec![
        ("fields", "id,parents"),
        ("addParents", add_parent),
        ("supportsAllDrives", "true"),
    ];
    if !remove_parents.is_empty() {
        query.push(("removeParents", remove_parents));
    }
    query
}

#[async_trait]
impl DriveApi for Drive {
    async fn list_files(&self) -> anyhow::Result<Vec<DriveFile>> {
        self.list_meta().try_collect().await
    }

    async fn copy(&self, file_id: &str) -> anyhow::Result<DriveFile> {
        let url = format!("{}/{file_id}/copy", self.res_uri);
        log::debug!("POST {url}");

        let res = HTTP
            .post(&url)
            .query(&[("fields", GET_FIELDS.as_str()), ("supportsAllDrives", "true")])
            .header(AUTHORIZATION, self.credential.auth_header())
            .json(&serde_json::json!({}))
            .send()
            .await
            .with_context(|| format!("Could not send POST request to `{url}`"))?;

        utils::json(res).await
    }

    async fn create_folder(&self, name: &str) -> anyhow::Result<DriveFile> {
        let url = self.res_uri.as_str();
        log::debug!("POST {url} folder={name:?}");

        let res = HTTP
            .post(url)
            .query(&[("fields", "id")])
            .header(AUTHORIZATION, self.credential.auth_header())
            .json(&serde_json::json!({
                "name": name,
                "mimeType": FOLDER,
            }))
            .send()
            .await
            .with_context(|| format!("Could not send POST request to `{url}`"))?;

        utils::json(res).await
    }

    async fn update_parents(
        &self,
        file_id: &str,
        add_parent: &str,
        remove_parents: &str,
    ) -> anyhow::Result<DriveFile> {
        let url = format!("{}/{file_id}", self.res_uri);
        log::debug!("PATCH {url} add={add_parent:?} remove={remove_parents:?}");

        let res = HTTP
            .patch(&url)
            .query(&update_query(add_parent, remove_parents))
            .header(AUTHORIZATION, self.credential.auth_header())
            .json(&serde_json::json!({}))
            .send()
            .await
            .with_context(|| format!("Could not send PATCH request to `{url}`"))?;

        utils::json(res).await
    }
}
