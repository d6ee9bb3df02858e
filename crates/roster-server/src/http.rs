use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest request body accepted before the connection is dropped.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug)]
pub enum WireError {
    Io(std::io::Error),
    Malformed(&'static str),
    BodyTooLarge(usize),
    ConnectionClosed,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Io(err) => write!(f, "io error: {err}"),
            WireError::Malformed(what) => write!(f, "malformed request: {what}"),
            WireError::BodyTooLarge(len) => write!(f, "body too large: {len} bytes"),
            WireError::ConnectionClosed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for WireError {}

impl From<std::io::Error> for WireError {
    fn from(err: std::io::Error) -> Self {
        WireError::Io(err)
    }
}

/// A parsed request: method, path (query string stripped), and raw body.
#[derive(Debug)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub keep_alive: bool,
    pub body: Vec<u8>,
}

/// Read one HTTP/1.1 request head and body from `reader`.
///
/// Returns `ConnectionClosed` on a clean EOF before the request line, so
/// the caller can tell a finished keep-alive connection from a bad one.
pub async fn read_request<R>(reader: &mut R) -> Result<Request, WireError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(WireError::ConnectionClosed);
    }

    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .ok_or(WireError::Malformed("missing method"))?
        .to_string();
    let target = parts
        .next()
        .ok_or(WireError::Malformed("missing request target"))?;
    let version = parts
        .next()
        .ok_or(WireError::Malformed("missing HTTP version"))?;
    if !version.starts_with("HTTP/1.") {
        return Err(WireError::Malformed("unsupported HTTP version"));
    }
    // No route takes a query string; drop it here.
    let path = target.split('?').next().unwrap_or(target).to_string();

    let mut content_length = 0usize;
    let mut keep_alive = true;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).await? == 0 {
            return Err(WireError::Malformed("truncated header block"));
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value
                    .parse()
                    .map_err(|_| WireError::Malformed("bad content-length"))?;
            } else if name.eq_ignore_ascii_case("connection") {
                keep_alive = !value.eq_ignore_ascii_case("close");
            }
        }
    }

    if content_length > MAX_BODY_BYTES {
        return Err(WireError::BodyTooLarge(content_length));
    }
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).await?;
    }

    Ok(Request {
        method,
        path,
        keep_alive,
        body,
    })
}

/// Write one JSON response.
pub async fn write_response<W>(
    writer: &mut W,
    status: u16,
    body: &str,
    keep_alive: bool,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: {}\r\n\r\n",
        status,
        reason_phrase(status),
        body.len(),
        if keep_alive { "keep-alive" } else { "close" },
    );
    writer.write_all(head.as_bytes()).await?;
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
