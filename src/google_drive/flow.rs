//! Installed-app authorization: the user grants access in a browser and
//! Google redirects to a listener on the loopback interface with a one-time
//! code.

use std::time::Duration;

use anyhow::Context;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Url;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    time::timeout,
};
use unwrap_or::unwrap_ok_or;

use super::types::ClientSecrets;
use crate::Error;

const READ_TIMEOUT: Duration = Duration::from_secs(10);
const DONE_PAGE: &str = "The authentication flow has completed. You may close this window.";
const DENIED_PAGE: &str = "Authorization was not granted. You may close this window.";

/// What a single request to the redirect listener carried.
#[derive(Debug, PartialEq, Eq)]
pub enum Callback {
    Code { code: String, state: Option<String> },
    Denied(String),
    /// Anything else the browser asks for, e.g. `/favicon.ico`.
    Ignored,
}

/// Code returned by the consent screen, and the redirect uri it was issued
/// for. Both are needed to exchange the code.
#[derive(Debug)]
pub struct Grant {
    pub code: String,
    pub redirect_uri: String,
}

pub async fn run(secrets: &ClientSecrets, scopes: &[String]) -> anyhow::Result<Grant> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .with_context(|| "Could not start the local redirect listener")?;
    let port = listener.local_addr()?.port();
    let redirect_uri = format!("http://127.0.0.1:{port}/");
    let state = new_state();

    let url = consent_url(secrets, scopes, &redirect_uri, &state)?;
    eprintln!("Please visit this URL to authorize this application: {url}");
    log::info!("Waiting for authorization on {redirect_uri}");

    let code = wait_for_code(&listener, &state, READ_TIMEOUT).await?;
    Ok(Grant { code, redirect_uri })
}

/// Serves redirect requests one at a time until one carries a code or an
/// error. A connection that sends nothing within `read_timeout` is dropped so
/// it cannot hold up the real redirect.
async fn wait_for_code(
    listener: &TcpListener,
    state: &str,
    read_timeout: Duration,
) -> anyhow::Result<String> {
    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .with_context(|| "Could not accept a redirect connection")?;

        let res = timeout(read_timeout, respond(stream))
            .await
            .map_err(anyhow::Error::new)
            .and_then(|r| r);
        let callback = unwrap_ok_or!(res, e, {
            log::debug!("Ignoring request from {peer}: {e:#}");
            continue;
        });

        match callback {
            Callback::Ignored => continue,
            Callback::Denied(reason) => return Err(Error::auth(reason)),
            Callback::Code { state: s, .. } if s.as_deref() != Some(state) => {
                return Err(Error::auth("state mismatch in authorization response"));
            }
            Callback::Code { code, .. } => return Ok(code),
        }
    }
}

pub fn consent_url(
    secrets: &ClientSecrets,
    scopes: &[String],
    redirect_uri: &str,
    state: &str,
) -> anyhow::Result<Url> {
    let scope = scopes.join(" ");

    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .with_context(|| format!("invalid auth_uri `{}`", secrets.auth_uri))
}

/// Parses the request line of a redirect, e.g.
/// `GET /?state=x&code=4/0Ab... HTTP/1.1`.
pub fn parse_request_line(line: &str) -> anyhow::Result<Callback> {
    let mut parts = line.split_whitespace();

    let target = match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) => target,
        _ => anyhow::bail!("unexpected request line `{}`", line.trim_end()),
    };

    let url = Url::parse("http://127.0.0.1")?.join(target)?;
    if url.path() != "/" {
        return Ok(Callback::Ignored);
    }

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            "error" => error = Some(v.into_owned()),
            _ => {}
        }
    }

    Ok(match (error, code) {
        (Some(e), _) => Callback::Denied(e),
        (None, Some(code)) => Callback::Code { code, state },
        (None, None) => Callback::Ignored,
    })
}

async fn respond(stream: TcpStream) -> anyhow::Result<Callback> {
    let mut stream = BufReader::new(stream);

    let mut line = String::new();
    stream.read_line(&mut line).await?;
    let callback = parse_request_line(&line)?;

    // drain the headers so closing the socket does not reset the connection
    loop {
        let mut header = String::new();
        let n = stream.read_line(&mut header).await?;
        if n == 0 || header.trim_end().is_empty() {
            break;
        }
    }

    let (status, body) = match &callback {
        Callback::Code { .. } => ("200 OK", DONE_PAGE),
        Callback::Denied(_) => ("200 OK", DENIED_PAGE),
        Callback::Ignored => ("404 Not Found", ""),
    };
    let res = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let stream = stream.get_mut();
    stream.write_all(res.as_bytes()).await?;
    stream.shutdown().await?;

    Ok(callback)
}

fn new_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
