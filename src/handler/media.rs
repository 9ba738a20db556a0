//! Media content handler
//!
//! Maps a request path under the mount prefix onto a file beneath the media
//! root, opens it, picks its content type and hands it to content delivery.

use crate::config::MediaConfig;
use crate::error::ServeError;
use crate::handler::content::{self, Content};
use crate::handler::resolve;
use crate::http::{self, date, mime, ResponseBody};
use hyper::header::HeaderMap;
use hyper::{Response, StatusCode};
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Serves files beneath a fixed root for paths under a fixed prefix
///
/// Holds only immutable configuration, so one instance can be shared by every
/// concurrent request.
#[derive(Debug, Clone)]
pub struct MediaHandler {
    root: PathBuf,
    prefix: String,
}

impl MediaHandler {
    /// Create a handler from an already absolute root directory
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.dir.clone(),
            prefix: normalize_prefix(&config.prefix),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mount point, always beginning and ending with `/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Answer a GET or HEAD for `path`
    ///
    /// Every failure to produce the file becomes a status response here; the
    /// error never leaves the handler.
    pub async fn serve(&self, path: &str, headers: &HeaderMap, is_head: bool) -> Response<ResponseBody> {
        match self.try_serve(path, headers, is_head).await {
            Ok(response) => response,
            Err(e) => error_response(&e),
        }
    }

    async fn try_serve(
        &self,
        path: &str,
        headers: &HeaderMap,
        is_head: bool,
    ) -> Result<Response<ResponseBody>, ServeError> {
        let name = resolve::strip_prefix(path, &self.prefix)
            .ok_or_else(|| ServeError::InvalidPath(path.to_string()))?;
        let relative = resolve::decode_relative(name)?;

        tracing::info!("Request for file: {}", self.root.join(&relative).display());

        let content = self.open(name, &relative).await?;
        content::serve_content(headers, is_head, content).await
    }

    /// Open the file and collect what content delivery needs
    async fn open(&self, name: &str, relative: &Path) -> Result<Content, ServeError> {
        let target = resolve::resolve_within(&self.root, relative).await?;

        let file = File::open(&target)
            .await
            .map_err(|source| ServeError::NotFound {
                path: target.clone(),
                source,
            })?;
        let metadata = file.metadata().await?;
        if metadata.is_dir() {
            return Err(ServeError::IsDirectory(target));
        }

        Ok(Content {
            name: name.to_string(),
            file,
            size: metadata.len(),
            modified: metadata.modified().ok().and_then(date::unix_seconds),
            // Named by the request, not by where a symlink points
            content_type: mime::content_type_for(relative),
        })
    }
}

/// Ensure the prefix starts and ends with a slash
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Translate a request failure into its status response
pub fn error_response(error: &ServeError) -> Response<ResponseBody> {
    match error {
        ServeError::NotFound { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("{error}");
        }
        ServeError::IsDirectory(_) => tracing::debug!("{error}"),
        ServeError::Internal(_) => tracing::error!("{error}"),
        _ => tracing::warn!("{error}"),
    }

    let status = error.status();
    if status == StatusCode::SERVICE_UNAVAILABLE {
        http::build_503_response()
    } else if status == StatusCode::INTERNAL_SERVER_ERROR {
        http::build_500_response()
    } else {
        http::build_404_response()
    }
}
