/// HTTP status codes the server can emit.
///
/// The set is closed: handlers only ever produce one of these, so the
/// reason-phrase lookup cannot miss at the point a response is written.
/// - `Ok` (200): page, file or echo served
/// - `NotFound` (404): no page, no file, or a malformed `/static` path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use pagehttpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
        }
    }

    /// Looks up a numeric code in the table. Codes this server never emits
    /// yield `None`.
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            404 => Some(StatusCode::NotFound),
            _ => None,
        }
    }
}

pub const TEXT_CONTENT_TYPE: &str = "text/html; charset=UTF-8";
pub const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Headers keep insertion order; that order is the order on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Header lines in emission order
    pub headers: Vec<(String, String)>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html; charset=UTF-8")
///     .header("Connection", "close")
///     .content_length()
///     .body(b"<h1>hi</h1>".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    length_at: Option<usize>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            length_at: None,
        }
    }

    /// Appends a header line.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Reserves the position of the `Content-Length` header; the value is
    /// filled in from the body in [`build`](Self::build).
    pub fn content_length(mut self) -> Self {
        self.length_at = Some(self.headers.len());
        self.headers.push(("Content-Length".to_string(), String::new()));
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    pub fn build(mut self) -> Response {
        if let Some(idx) = self.length_at {
            self.headers[idx].1 = self.body.len().to_string();
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// An HTML response: `Content-Type`, `Connection: close`, `Content-Length`.
    pub fn text(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", TEXT_CONTENT_TYPE)
            .header("Connection", "close")
            .content_length()
            .body(body.into())
            .build()
    }

    /// A download: `Content-Type`, `Content-Disposition`, `Content-Length`,
    /// `Connection: close`.
    pub fn file(status: StatusCode, contents: Vec<u8>, download_name: &str) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", FILE_CONTENT_TYPE)
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", download_name),
            )
            .content_length()
            .header("Connection", "close")
            .body(contents)
            .build()
    }

    /// Returns the first header with this name (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
