use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::files::FileSource;
use crate::http::parser::{
    HEADER_TERMINATOR, decode_form_body, extract_header_field, find_headers_end,
    parse_content_length, parse_request_line,
};
use crate::http::request::{Method, Request};
use crate::http::writer::ResponseWriter;
use crate::router::{RouteDecision, Router};

const READ_CHUNK: usize = 1024;
const MAX_BODY_RESERVE: usize = 64 * 1024;

/// Serves exactly one request on a stream, then closes it.
pub struct Connection<S, F> {
    stream: S,
    peer: SocketAddr,
    router: Arc<Router<F>>,
    buffer: BytesMut,
    read_timeout: Option<Duration>,
    state: ConnectionState,
}

#[derive(Debug)]
pub enum ConnectionState {
    AwaitingHeader,
    HeaderComplete(String),
    BodyPending(Request, usize),
    BodyComplete(Request),
    Routed(Request, RouteDecision),
    ResponseSent,
    Closed,
}

impl<S, F> Connection<S, F>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FileSource,
{
    pub fn new(stream: S, peer: SocketAddr, router: Arc<Router<F>>) -> Self {
        Self {
            stream,
            peer,
            router,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            read_timeout: None,
            state: ConnectionState::AwaitingHeader,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Drives the state machine to `Closed`.
    ///
    /// Read and write failures are logged and close the connection.
    pub async fn run(&mut self) {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);
            self.state = match state {
                ConnectionState::AwaitingHeader => match self.read_header().await {
                    Ok(text) => ConnectionState::HeaderComplete(text),
                    Err(e) => {
                        tracing::warn!(peer = %self.peer, error = %e, "Failed to read request header");
                        ConnectionState::Closed
                    }
                },

                ConnectionState::HeaderComplete(text) => self.parse_head(&text),

                ConnectionState::BodyPending(mut req, len) => match self.read_body(len).await {
                    Ok(body) => {
                        req.form = Some(decode_form_body(&body));
                        ConnectionState::BodyComplete(req)
                    }
                    Err(e) => {
                        tracing::warn!(peer = %self.peer, error = %e, "Failed to read request body");
                        ConnectionState::Closed
                    }
                },

                ConnectionState::BodyComplete(req) => match self.router.route(&req).await {
                    Some(decision) => ConnectionState::Routed(req, decision),
                    None => ConnectionState::Closed,
                },

                ConnectionState::Routed(req, decision) => {
                    let response = self.router.respond(decision).await;
                    let mut writer = ResponseWriter::new(&response);
                    match writer.write_to_stream(&mut self.stream).await {
                        Ok(()) => {
                            tracing::info!(
                                peer = %self.peer,
                                method = ?req.method,
                                path = %req.path,
                                status = response.status.as_u16(),
                                bytes = writer.len(),
                                "Response sent"
                            );
                            ConnectionState::ResponseSent
                        }
                        Err(e) => {
                            tracing::warn!(peer = %self.peer, error = %e, "Failed to write response");
                            ConnectionState::Closed
                        }
                    }
                }

                ConnectionState::ResponseSent => ConnectionState::Closed,

                ConnectionState::Closed => break,
            };
        }

        // Closed on every path, with or without a response.
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(peer = %self.peer, error = %e, "Shutdown failed");
        }
    }

    fn parse_head(&self, text: &str) -> ConnectionState {
        let line = match parse_request_line(text) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(peer = %self.peer, error = %e, "Dropping request");
                return ConnectionState::Closed;
            }
        };

        if line.method == Method::INVALID {
            tracing::warn!(peer = %self.peer, path = %line.target, "Unsupported method, closing");
            return ConnectionState::Closed;
        }

        let content_length = match extract_header_field(text, "Content-Length")
            .map(parse_content_length)
            .transpose()
        {
            Ok(len) => len.unwrap_or(0),
            Err(e) => {
                tracing::warn!(peer = %self.peer, error = %e, "Ignoring request body");
                0
            }
        };

        let req = Request {
            method: line.method,
            path: line.target,
            version: line.version,
            user_agent: extract_header_field(text, "User-Agent").map(str::to_string),
            form: None,
        };
        tracing::debug!(peer = %self.peer, method = ?req.method, path = %req.path, content_length, "Parsed request header");

        if content_length > 0 {
            ConnectionState::BodyPending(req, content_length)
        } else {
            ConnectionState::BodyComplete(req)
        }
    }

    /// Reads until the first header terminator and returns the header text,
    /// terminator included. Bytes after it stay buffered for the body.
    async fn read_header(&mut self) -> anyhow::Result<String> {
        let mut scanned: usize = 0;
        loop {
            let from = scanned.saturating_sub(HEADER_TERMINATOR.len() - 1);
            if let Some(end) = find_headers_end(&self.buffer, from) {
                let head = self.buffer.split_to(end);
                return Ok(String::from_utf8_lossy(&head).into_owned());
            }
            scanned = self.buffer.len();

            self.buffer.reserve(READ_CHUNK);
            if self.read_more().await? == 0 {
                anyhow::bail!(
                    "connection closed before end of header ({} bytes received)",
                    self.buffer.len()
                );
            }
        }
    }

    /// Returns exactly `len` body bytes.
    async fn read_body(&mut self, len: usize) -> anyhow::Result<Vec<u8>> {
        while self.buffer.len() < len {
            self.buffer
                .reserve((len - self.buffer.len()).min(MAX_BODY_RESERVE));
            if self.read_more().await? == 0 {
                anyhow::bail!(
                    "connection closed after {} of {} body bytes",
                    self.buffer.len(),
                    len
                );
            }
        }

        Ok(self.buffer.split_to(len).to_vec())
    }

    async fn read_more(&mut self) -> anyhow::Result<usize> {
        let read = self.stream.read_buf(&mut self.buffer);
        let n = match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .context("read timed out")??,
            None => read.await?,
        };
        Ok(n)
    }
}
