use std::collections::HashMap;

/// HTTP request methods.
///
/// Only GET and POST are served. Any other method token parses to
/// `INVALID`, which the router answers by closing the connection.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a page, file or the user-agent echo
    GET,
    /// POST - Submit a form body to be echoed back
    POST,
    /// Anything else
    INVALID,
}

impl Method {
    /// Parses an HTTP method token.
    ///
    /// Matching is case-sensitive; unknown tokens map to `INVALID`.
    ///
    /// # Example
    ///
    /// ```
    /// # use pagehttpd::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::INVALID);
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            _ => Method::INVALID,
        }
    }
}

/// Represents a parsed HTTP request from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// The request target (e.g., "/index")
    pub path: String,
    /// HTTP version (typically "HTTP/1.1")
    pub version: String,
    /// Value of the User-Agent header, if sent
    pub user_agent: Option<String>,
    /// Decoded form body; present only when a Content-Length body was read
    pub form: Option<HashMap<String, String>>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    user_agent: Option<String>,
    form: Option<HashMap<String, String>>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            user_agent: None,
            form: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn form(mut self, form: HashMap<String, String>) -> Self {
        self.form = Some(form);
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            user_agent: self.user_agent,
            form: self.form,
        })
    }
}

impl Request {
    /// Renders the decoded form as `key: value` lines joined by `<br>`.
    ///
    /// Line order follows map iteration and is unspecified.
    pub fn form_echo(&self) -> String {
        self.form
            .iter()
            .flatten()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(FORM_LINE_BREAK)
    }
}

/// Separator between echoed form lines.
pub const FORM_LINE_BREAK: &str = "<br>";
