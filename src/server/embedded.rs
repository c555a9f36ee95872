//! Front-end bundled into the binary
//!
//! Served for every non-API path when no document root is configured.

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

/// Bundled files as (path, content type, contents)
const EMBEDDED_FILES: &[(&str, &str, &str)] = &[
    (
        "index.html",
        "text/html; charset=utf-8",
        include_str!("../../docroot/index.html"),
    ),
    (
        "app.js",
        "text/javascript; charset=utf-8",
        include_str!("../../docroot/app.js"),
    ),
];

/// Content type and contents of a bundled file; `/` maps to `index.html`
pub fn get_embedded_file(path: &str) -> Option<(&'static str, &'static str)> {
    let path = match path.trim_start_matches('/') {
        "" => "index.html",
        path => path,
    };
    EMBEDDED_FILES
        .iter()
        .find(|(name, _, _)| *name == path)
        .map(|(_, content_type, contents)| (*content_type, *contents))
}

pub async fn serve_embedded(uri: Uri) -> Response {
    match get_embedded_file(uri.path()) {
        Some((content_type, contents)) => {
            ([(header::CONTENT_TYPE, content_type)], contents).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
