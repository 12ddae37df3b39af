//! File lookup used by the router.
//!
//! The router never touches the file system directly; it asks a [`FileSource`]
//! for the bytes behind a path. Paths are taken as given: there is no
//! directory listing and no path-traversal check.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Resolves a path to file contents.
pub trait FileSource {
    /// Returns the file's bytes, or `None` if it cannot be read.
    fn read(&self, path: &Path) -> impl Future<Output = Option<Vec<u8>>> + Send;
}

/// Reads straight from disk on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFiles;

impl FileSource for DiskFiles {
    async fn read(&self, path: &Path) -> Option<Vec<u8>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), error = %e, "File read failed");
                }
                None
            }
        }
    }
}

/// Joins `root` and `rest` the way a string concatenation with `/` would.
///
/// Unlike [`Path::join`], an absolute `rest` does not replace the root.
pub fn concat_path(root: &Path, rest: &str) -> PathBuf {
    let mut joined = root.as_os_str().to_owned();
    joined.push("/");
    joined.push(rest.trim_start_matches('/'));
    PathBuf::from(joined)
}
