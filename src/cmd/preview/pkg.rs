// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use axum::extract::Path as UrlPath;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;

use crate::cmd::preview::state::ServerState;

/// The module a `wasm-pack --target web` build of the widget crate emits.
pub const PKG_MODULE: &str = "/pkg/flipscore_wasm.js";

#[derive(Debug, PartialEq)]
pub enum PkgPathError {
    Empty,
    /// A component is `..`, `.`, or a root.
    InvalidPath,
    /// A component is a symbolic link.
    Symlink,
    NotFound,
}

/// Resolves a request under `/pkg/` to a regular file inside `pkg_dir`.
///
/// Only plain names are accepted as components, and none of them may be a
/// symbolic link, so the result can't leave `pkg_dir`.
pub fn resolve_pkg_file(pkg_dir: &Path, requested: &str) -> Result<PathBuf, PkgPathError> {
    if requested.trim().is_empty() {
        return Err(PkgPathError::Empty);
    }
    let mut path = pkg_dir.to_path_buf();
    for component in Path::new(requested).components() {
        let Component::Normal(name) = component else {
            return Err(PkgPathError::InvalidPath);
        };
        path.push(name);
        let metadata = path
            .symlink_metadata()
            .map_err(|_| PkgPathError::NotFound)?;
        if metadata.file_type().is_symlink() {
            return Err(PkgPathError::Symlink);
        }
    }
    if !path.is_file() {
        return Err(PkgPathError::NotFound);
    }
    Ok(path)
}

pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("js") => "text/javascript",
        Some("wasm") => "application/wasm",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

pub async fn pkg_handler(
    State(state): State<ServerState>,
    UrlPath(path): UrlPath<String>,
) -> (StatusCode, [(HeaderName, &'static str); 1], Vec<u8>) {
    let not_found = (
        StatusCode::NOT_FOUND,
        [(CONTENT_TYPE, "text/plain")],
        b"Not Found".to_vec(),
    );
    let Some(pkg_dir) = &state.pkg_dir else {
        return not_found;
    };
    let resolved = match resolve_pkg_file(pkg_dir, &path) {
        Ok(resolved) => resolved,
        Err(e) => {
            log::warn!("Rejected package path {path:?}: {e:?}");
            return not_found;
        }
    };
    match tokio::fs::read(&resolved).await {
        Ok(bytes) => (StatusCode::OK, [(CONTENT_TYPE, content_type(&resolved))], bytes),
        Err(e) => {
            log::error!("Failed to read {}: {e}", resolved.display());
            not_found
        }
    }
}
