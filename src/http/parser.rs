use std::collections::HashMap;
use std::fmt;

use crate::http::request::Method;

/// Marks the end of the header block.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request line has fewer than three tokens
    InvalidRequestLine,
    /// Content-Length is not a plain decimal number
    InvalidContentLength(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidRequestLine => write!(f, "invalid request line"),
            ParseError::InvalidContentLength(v) => write!(f, "invalid Content-Length {:?}", v),
        }
    }
}

impl std::error::Error for ParseError {}

/// The three tokens of the first request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub target: String,
    pub version: String,
}

/// Finds the first header terminator in `buf`, scanning from `from`.
///
/// Returns the index just past the terminator. Callers that feed the buffer
/// incrementally pass the previous scan end minus three, so a terminator
/// split across reads is still found.
pub fn find_headers_end(buf: &[u8], from: usize) -> Option<usize> {
    let start = from.min(buf.len());
    buf[start..]
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .map(|pos| start + pos + HEADER_TERMINATOR.len())
}

pub fn parse_request_line(header_text: &str) -> Result<RequestLine, ParseError> {
    let line = header_text.lines().next().ok_or(ParseError::InvalidRequestLine)?;
    let mut parts = line.split_whitespace();

    let method = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let target = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let version = parts.next().ok_or(ParseError::InvalidRequestLine)?;

    Ok(RequestLine {
        method: Method::from_token(method),
        target: target.to_string(),
        version: version.to_string(),
    })
}

/// Returns the trimmed value of the first `name: value` header line.
///
/// The name is matched case-insensitively; the request line is skipped.
pub fn extract_header_field<'a>(header_text: &'a str, name: &str) -> Option<&'a str> {
    header_text.split("\r\n").skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

pub fn parse_content_length(value: &str) -> Result<usize, ParseError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidContentLength(value.to_string()));
    }
    value
        .parse()
        .map_err(|_| ParseError::InvalidContentLength(value.to_string()))
}

/// Decodes `a=1&b=2` into a map.
///
/// Pairs without `=` are dropped and a repeated key keeps its last value.
/// Keys and values are not percent-decoded.
pub fn decode_form_body(body: &[u8]) -> HashMap<String, String> {
    let text = String::from_utf8_lossy(body);
    text.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
