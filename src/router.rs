//! Request routing
//!
//! Maps a parsed request to a [`RouteDecision`] and then renders that decision
//! into a [`Response`], reading pages and downloads through a [`FileSource`].

use std::path::{Path, PathBuf};

use crate::config::StaticFilesConfig;
use crate::files::{FileSource, concat_path};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};

const USER_AGENT_ROUTE: &str = "/user-agent";
const STATIC_PREFIX: &str = "/static";
const INDEX_PAGE: &str = "/index";
const NOT_FOUND_PAGE: &str = "404.html";

/// What to send back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    ServeText {
        status: StatusCode,
        body: Vec<u8>,
    },
    ServeFile {
        status: StatusCode,
        path: PathBuf,
        download_name: String,
    },
    NotFound,
}

pub struct Router<F> {
    files: F,
    html_root: PathBuf,
    static_root: PathBuf,
}

impl<F: FileSource> Router<F> {
    pub fn new(files: F, roots: &StaticFilesConfig) -> Self {
        Self {
            files,
            html_root: roots.html_root.clone(),
            static_root: roots.static_root.clone(),
        }
    }

    /// Picks a response strategy.
    ///
    /// Returns `None` for an `INVALID` method: the connection is closed
    /// without writing anything.
    pub async fn route(&self, request: &Request) -> Option<RouteDecision> {
        match request.method {
            Method::INVALID => None,
            Method::POST => Some(RouteDecision::ServeText {
                status: StatusCode::Ok,
                body: request.form_echo().into_bytes(),
            }),
            Method::GET => Some(self.route_get(&request.path, request.user_agent.as_deref()).await),
        }
    }

    async fn route_get(&self, target: &str, user_agent: Option<&str>) -> RouteDecision {
        if target == USER_AGENT_ROUTE {
            return RouteDecision::ServeText {
                status: StatusCode::Ok,
                body: user_agent.unwrap_or_default().as_bytes().to_vec(),
            };
        }

        if target.starts_with(STATIC_PREFIX) {
            return match static_file_name(target) {
                Some(file) => RouteDecision::ServeFile {
                    status: StatusCode::Ok,
                    path: concat_path(&self.static_root, file),
                    download_name: file.to_string(),
                },
                None => RouteDecision::NotFound,
            };
        }

        let page = if target == "/" { INDEX_PAGE } else { target };
        let path = concat_path(&self.html_root, &format!("{}.html", page));
        match self.files.read(&path).await {
            Some(body) => RouteDecision::ServeText {
                status: StatusCode::Ok,
                body,
            },
            None => RouteDecision::NotFound,
        }
    }

    /// Turns a decision into the response to write.
    pub async fn respond(&self, decision: RouteDecision) -> Response {
        match decision {
            RouteDecision::ServeText { status, body } => Response::text(status, body),
            RouteDecision::ServeFile {
                status,
                path,
                download_name,
            } => match self.files.read(&path).await {
                Some(contents) => Response::file(status, contents, &download_name),
                None => {
                    tracing::debug!(path = %path.display(), "Static file missing");
                    self.not_found().await
                }
            },
            RouteDecision::NotFound => self.not_found().await,
        }
    }

    /// 404 with the contents of `404.html`, or an empty body if that is missing too.
    pub async fn not_found(&self) -> Response {
        let page = self.files.read(&self.html_root.join(NOT_FOUND_PAGE)).await;
        Response::text(StatusCode::NotFound, page.unwrap_or_default())
    }

    pub fn html_root(&self) -> &Path {
        &self.html_root
    }

    pub fn static_root(&self) -> &Path {
        &self.static_root
    }
}

/// For `/static/<file>`, the part after the second `/`.
///
/// `None` when the target has no `/` past its first character.
fn static_file_name(target: &str) -> Option<&str> {
    let pos = target.get(1..)?.find('/')? + 1;
    Some(&target[pos + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_file_name_cases() {
        assert_eq!(static_file_name("/static/a.bin"), Some("a.bin"));
        assert_eq!(static_file_name("/static/dir/a.bin"), Some("dir/a.bin"));
        assert_eq!(static_file_name("/static/"), Some(""));
        assert_eq!(static_file_name("/staticfile"), None);
        assert_eq!(static_file_name("/static"), None);
    }
}
