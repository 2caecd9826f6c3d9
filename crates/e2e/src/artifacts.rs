//! Debug artifacts captured when a scenario fails
//!
//! A full-page screenshot and the page HTML are written side by side under
//! the debug directory. Capture never fails the caller: each half is
//! best-effort and logged when it cannot be written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::pages::BasePage;

/// What was written for one capture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedArtifacts {
    pub screenshot: Option<PathBuf>,
    pub screenshot_sha256: Option<String>,
    pub html: Option<PathBuf>,
    pub url: Option<String>,
}

impl CapturedArtifacts {
    pub fn is_empty(&self) -> bool {
        self.screenshot.is_none() && self.html.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    dir: PathBuf,
}

impl DebugArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<name>-<timestamp>.png` and `.html`, stamped to the millisecond.
    pub fn paths_for(&self, name: &str) -> (PathBuf, PathBuf) {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f").to_string();
        self.paths_at(name, &stamp)
    }

    fn paths_at(&self, name: &str, stamp: &str) -> (PathBuf, PathBuf) {
        let stem = format!("{}-{}", sanitize(name), stamp);
        (
            self.dir.join(format!("{}.png", stem)),
            self.dir.join(format!("{}.html", stem)),
        )
    }

    pub async fn capture(&self, page: &BasePage, name: &str) -> CapturedArtifacts {
        let mut captured = CapturedArtifacts {
            url: Some(page.current_url()),
            ..Default::default()
        };

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!("cannot create debug dir {}: {}", self.dir.display(), e);
            return captured;
        }

        let (png, html) = self.paths_for(name);

        if let Some(bytes) = page.take_debug_screenshot(&png).await {
            captured.screenshot_sha256 = Some(hash_bytes(&bytes));
            captured.screenshot = Some(png);
        }

        match page.page().content().await {
            Ok(content) => match std::fs::write(&html, content) {
                Ok(()) => captured.html = Some(html),
                Err(e) => warn!("cannot write {}: {}", html.display(), e),
            },
            Err(e) => warn!("page content unavailable: {}", e),
        }

        if !captured.is_empty() {
            info!("Debug artifacts for '{}' in {}", name, self.dir.display());
        }
        captured
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Keep file names portable: anything but alphanumerics, `-` and `_`
/// becomes `_`.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
