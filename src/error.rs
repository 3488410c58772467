use reqwest::StatusCode;

/// Failures the workflow distinguishes. Everything else (transport, io,
/// parsing) travels as a plain `anyhow::Error` with context attached.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("no file named `{0}` is visible to this account")]
    NotFound(String),
    #[error("GoogleAPIError {status} {body}")]
    RemoteApi { status: StatusCode, body: String },
}

impl Error {
    pub fn auth(msg: impl Into<String>) -> anyhow::Error {
        Error::Authentication(msg.into()).into()
    }
}

/// Returns the taxonomy variant carried by `err`, if any.
#[cfg(test)]
pub fn kind(err: &anyhow::Error) -> Option<&Error> {
    err.downcast_ref::<Error>()
}
