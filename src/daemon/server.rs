//! TCP Server for the compose-middleware daemon
//!
//! Speaks just enough HTTP/1.1 to serve one request per connection.

use super::api::{ApiHandler, ApiResponse};
use crate::error::{MiddlewareError, Result};
use std::future::Future;
use std::net::SocketAddr;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpListener;
use tracing::{debug, error, info, info_span, Instrument, Span};

/// Upper bound on header lines read per request
const MAX_HEADER_LINES: usize = 100;

/// Upper bound on the request line plus headers, in bytes
const MAX_HEAD_BYTES: u64 = 64 * 1024;

/// Upper bound on request bodies, which are read and discarded
const MAX_BODY_BYTES: usize = 64 * 1024;

/// compose-middleware daemon - HTTP server for compose commands
pub struct MiddlewareDaemon {
    listener: TcpListener,
    api_handler: ApiHandler,
}

impl MiddlewareDaemon {
    /// Bind the listening socket
    pub async fn bind(addr: SocketAddr, api_handler: ApiHandler) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            api_handler,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve connections until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("compose-middleware listening on {}", self.local_addr()?);

        tokio::select! {
            result = self.accept_connections() => result,
            _ = shutdown => {
                info!("compose-middleware stopped");
                Ok(())
            }
        }
    }

    /// Accept and handle incoming connections
    async fn accept_connections(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let api_handler = self.api_handler.clone();
                    let span = info_span!("request", id = %uuid::Uuid::new_v4(), %peer);

                    tokio::spawn(
                        async move {
                            if let Err(e) = handle_connection(stream, api_handler).await {
                                error!("Error handling connection: {}", e);
                            }
                        }
                        .instrument(span),
                    );
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Handle a single connection
pub(crate) async fn handle_connection<S>(mut stream: S, api_handler: ApiHandler) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let response = match read_request(&mut stream).await {
        Ok(Some((method, path))) => {
            let span = Span::current();
            let (logged_method, logged_path) = (method.clone(), path.clone());

            let response = tokio::task::spawn_blocking(move || {
                let _entered = span.enter();
                api_handler.handle_request(&method, &path)
            })
            .await
            .unwrap_or_else(|e| {
                ApiResponse::error(500, &MiddlewareError::Internal(e.to_string()).to_string())
            });

            info!(
                method = %logged_method,
                path = %logged_path,
                status = response.status,
                "Handled request"
            );
            response
        }
        // Peer closed before sending anything
        Ok(None) => return Ok(()),
        Err(MiddlewareError::BadRequest(message)) => {
            debug!("Rejecting request: {}", message);
            ApiResponse::error(400, &message)
        }
        Err(e) => return Err(e),
    };

    send_response(&mut stream, &response).await
}

/// Read the request line, headers and body; returns method and path
async fn read_request<S>(stream: &mut S) -> Result<Option<(String, String)>>
where
    S: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut head_budget = MAX_HEAD_BYTES;
    let mut request_line = String::new();
    if read_head_line(&mut reader, &mut head_budget, &mut request_line).await? == 0 {
        return Ok(None);
    }

    debug!("Received request: {}", request_line.trim());

    // Parse HTTP request line
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let (method, path) = match parts.as_slice() {
        [method, path, version] if version.starts_with("HTTP/") => (*method, *path),
        _ => {
            return Err(MiddlewareError::BadRequest(format!(
                "Malformed request line: {}",
                request_line.trim()
            )))
        }
    };

    // Read headers
    let mut content_length = 0;
    let mut header_lines = 0;
    loop {
        let mut header_line = String::new();
        let read = read_head_line(&mut reader, &mut head_budget, &mut header_line).await?;
        if read == 0 || header_line.trim().is_empty() {
            break;
        }
        header_lines += 1;
        if header_lines > MAX_HEADER_LINES {
            return Err(MiddlewareError::BadRequest("Too many headers".to_string()));
        }
        if let Some((name, value)) = header_line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().map_err(|_| {
                    MiddlewareError::BadRequest(format!("Invalid Content-Length: {}", value.trim()))
                })?;
            }
        }
    }

    // Request bodies carry nothing; drain them so the client sees a clean close
    if content_length > MAX_BODY_BYTES {
        return Err(MiddlewareError::BadRequest("Request body too large".to_string()));
    }
    if content_length > 0 {
        let mut buf = vec![0u8; content_length];
        reader.read_exact(&mut buf).await?;
    }

    Ok(Some((method.to_string(), path.to_string())))
}

/// Read one line of the request head, charging it against `budget`
async fn read_head_line<R>(reader: &mut R, budget: &mut u64, line: &mut String) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let too_large = || MiddlewareError::BadRequest("Request header too large".to_string());
    if *budget == 0 {
        return Err(too_large());
    }

    let read = (&mut *reader).take(*budget).read_line(line).await?;
    *budget -= read as u64;
    if *budget == 0 && !line.ends_with('\n') {
        return Err(too_large());
    }
    Ok(read)
}

/// Send HTTP response
async fn send_response<S>(stream: &mut S, response: &ApiResponse) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let head = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        response.status,
        reason_phrase(response.status),
        response.content_type,
        response.body.len(),
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(response.body.as_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await?;
    Ok(())
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "",
    }
}
