use anyhow::Context;
use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::Error;

/// Decodes a successful Drive response, or turns any other status into
/// [`Error::RemoteApi`] carrying the body untouched.
pub async fn json<T: DeserializeOwned>(res: Response) -> anyhow::Result<T> {
    let res = check(res).await?;
    let url = res.url().to_string();

    let bytes = res
        .bytes()
        .await
        .with_context(|| format!("Could not read response from `{url}`"))?;

    serde_json::from_slice::<T>(&bytes)
        .with_context(|| format!("Unexpected response body from `{url}`"))
}

pub async fn check(res: Response) -> anyhow::Result<Response> {
    let status = res.status();

    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.with_context(|| "Could not get response")?;
    Err(Error::RemoteApi { status, body }.into())
}

/// Joins parent ids the way the `removeParents` query parameter expects.
pub fn join_ids(ids: &[String]) -> String {
    ids.join(",")
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{
        google_drive::{test_server, DriveFile, HTTP},
        Error,
    };

    #[tokio::test]
    async fn test_non_success_is_remote_api() -> anyhow::Result<()> {
        let body = r#"{"error":{"code":403,"message":"The user does not have sufficient permissions for this file."}}"#;
        let (base, _server) = test_server::serve(vec![(403, body)]).await?;

        let res = HTTP.get(&base).send().await?;
        let err = super::json::<DriveFile>(res).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::RemoteApi { status, body: b }) if *status == StatusCode::FORBIDDEN && b == body
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_success_is_decoded() -> anyhow::Result<()> {
        let (base, _server) = test_server::serve(vec![
            (200, r#"{"id":"c1","name":"Copy of Template","mimeType":"text/plain"}"#),
            (200, "not json"),
        ])
        .await?;

        let f = super::json::<DriveFile>(HTTP.get(&base).send().await?).await?;
        assert_eq!(f.id, "c1");

        // a garbled success body is a parse failure, not a remote error
        let err = super::json::<DriveFile>(HTTP.get(&base).send().await?)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<Error>().is_none());
        Ok(())
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(super::join_ids(&["a".into(), "b".into()]), "a,b");
        assert_eq!(super::join_ids(&["a".into()]), "a");
        assert_eq!(super::join_ids(&[]), "");
    }
}
