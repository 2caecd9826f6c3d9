//! Upload fixtures
//!
//! Files are generated on first use and reused afterwards.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{E2eError, E2eResult};

/// Largest upload the app accepts.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const PDF_HEADER: &[u8] = b"%PDF-1.4\n";
const SAMPLE_PADDING: usize = 10_000;
const OVERSIZE_MARGIN: u64 = 1024;

#[derive(Debug, Clone)]
pub struct FixtureSet {
    dir: PathBuf,
}

impl FixtureSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Small valid-looking PDF under the size limit.
    pub fn sample_pdf(&self) -> PathBuf {
        self.dir.join("sample.pdf")
    }

    /// Plain text file the form must reject.
    pub fn bad_txt(&self) -> PathBuf {
        self.dir.join("bad.txt")
    }

    /// PDF just over [`MAX_UPLOAD_BYTES`].
    pub fn big_pdf(&self) -> PathBuf {
        self.dir.join("big.pdf")
    }

    /// Create whichever fixtures are missing.
    pub fn ensure(&self) -> E2eResult<()> {
        fs::create_dir_all(&self.dir)?;

        let sample = self.sample_pdf();
        if !sample.exists() {
            let mut bytes = PDF_HEADER.to_vec();
            bytes.resize(PDF_HEADER.len() + SAMPLE_PADDING, b'0');
            fs::write(&sample, bytes)?;
            info!("Created fixture {}", sample.display());
        }

        let bad = self.bad_txt();
        if !bad.exists() {
            fs::write(&bad, "this is not a pdf")?;
            info!("Created fixture {}", bad.display());
        }

        let big = self.big_pdf();
        if !big.exists() {
            write_padded(&big, MAX_UPLOAD_BYTES + OVERSIZE_MARGIN)?;
            info!("Created fixture {}", big.display());
        }

        Ok(())
    }

    /// Path to `name` inside the fixture dir, or [`E2eError::FixtureMissing`].
    pub fn require(&self, name: &str) -> E2eResult<PathBuf> {
        let path = self.dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(E2eError::FixtureMissing(path))
        }
    }
}

/// PDF header followed by `'0'` bytes up to `total` bytes, written in chunks.
fn write_padded(path: &Path, total: u64) -> E2eResult<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(PDF_HEADER)?;

    let chunk = [b'0'; 64 * 1024];
    let mut remaining = total.saturating_sub(PDF_HEADER.len() as u64);
    while remaining > 0 {
        let n = remaining.min(chunk.len() as u64) as usize;
        file.write_all(&chunk[..n])?;
        remaining -= n as u64;
    }
    file.flush()?;
    Ok(())
}
