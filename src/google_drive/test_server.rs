//! A loopback HTTP server that answers each connection with the next canned
//! response and records what it was sent.

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::TcpListener,
    task::JoinHandle,
};

#[derive(Debug)]
pub struct Request {
    pub line: String,
    pub body: String,
}

pub async fn serve(
    responses: Vec<(u16, &'static str)>,
) -> anyhow::Result<(String, JoinHandle<anyhow::Result<Vec<Request>>>)> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let base = format!("http://{}", listener.local_addr()?);

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();

        for (status, body) in responses {
            let (stream, _) = listener.accept().await?;
            let mut stream = BufReader::new(stream);

            let mut line = String::new();
            stream.read_line(&mut line).await?;

            let mut len = 0;
            loop {
                let mut header = String::new();
                stream.read_line(&mut header).await?;
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((k, v)) = header.split_once(':') {
                    if k.eq_ignore_ascii_case("content-length") {
                        len = v.trim().parse::<usize>()?;
                    }
                }
            }

            let mut req_body = vec![0; len];
            stream.read_exact(&mut req_body).await?;

            let res = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let stream = stream.get_mut();
            stream.write_all(res.as_bytes()).await?;
            stream.shutdown().await?;

            seen.push(Request {
                line: line.trim_end().to_owned(),
                body: String::from_utf8(req_body)?,
            });
        }

        anyhow::Ok(seen)
    });

    Ok((base, handle))
}
