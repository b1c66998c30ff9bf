//! Athena vocabulary bundle download (feature `download`).
//!
//! Athena emails registered users a link to a zip bundle holding every
//! selected vocabulary table. Only the two files the crosswalk reads are kept.

use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Archive members extracted from an Athena bundle.
pub const WANTED_FILES: [&str; 2] = ["CONCEPT.csv", "CONCEPT_RELATIONSHIP.csv"];

/// Fetch `url` and extract [`WANTED_FILES`] into `out_dir`.
pub fn download_vocabulary_archive(url: &str, out_dir: &Path) -> Result<Vec<PathBuf>> {
    tracing::info!(url, "downloading vocabulary bundle");
    let bytes = reqwest::blocking::get(url)
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .with_context(|| format!("failed to download {url}"))?;
    tracing::info!(bytes = bytes.len(), "download complete");
    extract_vocabulary_archive(Cursor::new(bytes), out_dir)
}

/// Extract [`WANTED_FILES`] from a zip archive, matched by file name
/// regardless of the directory they sit in, and written flat into `out_dir`.
pub fn extract_vocabulary_archive<R: Read + Seek>(reader: R, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = zip::ZipArchive::new(reader).context("not a zip archive")?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let entry_name = entry.name().to_string();
        let Some(file_name) = Path::new(&entry_name).file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !WANTED_FILES.contains(&file_name) {
            continue;
        }

        let dest = out_dir.join(file_name);
        let mut out = std::fs::File::create(&dest)
            .with_context(|| format!("failed to create {}", dest.display()))?;
        std::io::copy(&mut entry, &mut out)
            .with_context(|| format!("failed to extract {entry_name}"))?;
        tracing::debug!(member = %entry_name, dest = %dest.display(), "extracted");
        written.push(dest);
    }

    if written.len() < WANTED_FILES.len() {
        tracing::warn!(
            found = written.len(),
            "vocabulary bundle is missing CONCEPT.csv or CONCEPT_RELATIONSHIP.csv"
        );
    }
    Ok(written)
}
