//! Static-asset fast path.
//!
//! Framework-internal paths and asset files never need sessions,
//! locales, or access checks, so they leave the pipeline at the first
//! stage and pass through byte-unchanged. Classification looks only at
//! the request path, never at the filesystem.

use crate::context::RequestContext;
use crate::stage::{BoxFuture, Stage, StageOutcome};
use crate::types::Request;

/// File extensions served as static assets.
const ASSET_EXTENSIONS: &[&str] = &[
    "ico", "png", "jpg", "jpeg", "gif", "webp", "svg", "css", "js", "woff", "woff2", "ttf", "otf",
];

/// Root-level files that are always static.
const WELL_KNOWN_FILES: &[&str] = &[
    "/favicon.ico",
    "/robots.txt",
    "/sitemap.xml",
    "/manifest.json",
];

/// Returns true if `path` addresses a static asset.
///
/// A path is static when it lives under the framework's internal
/// prefix, ends in a known asset extension, or names one of the
/// well-known root files. Query strings are not part of `path` and do
/// not affect classification.
#[must_use]
pub fn is_static_asset(path: &str) -> bool {
    if path.starts_with("/_next/") {
        return true;
    }
    if WELL_KNOWN_FILES.contains(&path) {
        return true;
    }
    // Extension check on the final path segment only, so a dotted
    // directory name like /v1.2/data is not misclassified.
    let last_segment = path.rsplit('/').next().unwrap_or("");
    match last_segment.rsplit_once('.') {
        Some((name, ext)) if !name.is_empty() => {
            ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}

/// Stage that allows static assets through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAssetStage;

impl StaticAssetStage {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Stage for StaticAssetStage {
    fn name(&self) -> &'static str {
        "static_assets"
    }

    fn apply<'a>(
        &'a self,
        _ctx: &'a mut RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, StageOutcome> {
        Box::pin(async move {
            if is_static_asset(request.uri().path()) {
                StageOutcome::Allow
            } else {
                StageOutcome::Continue
            }
        })
    }
}
