//! Output Files

use crate::metadata::*;
use gonio::error::*;
use gonio::fileutil::*;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// File name used when a fixture name has no usable characters.
pub const DEFAULT_FIXTURE_FILE: &str = "fixture";

/// Creates a directory and its parents if missing.
///
/// * `dir` - The directory.
pub fn ensure_directory_exists(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
        .map_err(|e| GonioError::output("failed to create directory", dir, Some(e)))?;
    debug!("Created directory {}", dir.display());
    Ok(())
}

/// Returns true if the path is a non-empty regular file that can be read.
///
/// * `path` - The path.
pub fn verify_file_written(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(m) if m.is_file() && m.len() > 0 => {}
        _ => return false,
    }
    let mut buf = [0u8; 1];
    match File::open(path) {
        Ok(mut f) => matches!(f.read(&mut buf), Ok(1)),
        Err(_) => false,
    }
}

/// Writes bytes to a file, refusing to replace an existing file unless
/// `overwrite` is set, then verifies the file.
///
/// * `bytes`     - File contents.
/// * `path`      - Destination.
/// * `overwrite` - Replace an existing file.
fn write_verified(bytes: &[u8], path: &Path, overwrite: bool) -> Result<()> {
    ensure_directory_exists(&parent_dir(path))?;

    let file = if overwrite {
        File::create(path)
    } else {
        OpenOptions::new().write(true).create_new(true).open(path)
    };
    let file = file.map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => GonioError::output(
            "file already exists; enable overwrite to replace it",
            path,
            Some(e),
        ),
        _ => GonioError::output("failed to create file", path, Some(e)),
    })?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| GonioError::output("failed to write file", path, Some(e)))?;
    drop(writer);

    if !verify_file_written(path) {
        return Err(GonioError::output("file verification failed", path, None));
    }
    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Writes LM-63 text.
///
/// * `content`   - LM-63 text.
/// * `path`      - Destination.
/// * `overwrite` - Replace an existing file.
pub fn write_ies_file(content: &str, path: &Path, overwrite: bool) -> Result<()> {
    write_verified(content.as_bytes(), path, overwrite)
}

/// Writes the metadata sidecar as pretty printed JSON.
///
/// * `metadata`  - The sidecar document.
/// * `path`      - Destination.
/// * `overwrite` - Replace an existing file.
pub fn write_metadata_file(metadata: &Metadata, path: &Path, overwrite: bool) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| GonioError::output(format!("failed to serialize metadata: {e}"), path, None))?;
    write_verified(json.as_bytes(), path, overwrite)
}

/// Writes the progress of a cancelled sweep as pretty printed JSON.
///
/// * `dump`      - Partial sweep.
/// * `path`      - Destination.
/// * `overwrite` - Replace an existing file.
pub fn write_sampling_dump(dump: &SamplingDump, path: &Path, overwrite: bool) -> Result<()> {
    let json = serde_json::to_string_pretty(dump)
        .map_err(|e| GonioError::output(format!("failed to serialize sampling dump: {e}"), path, None))?;
    write_verified(json.as_bytes(), path, overwrite)
}

/// Returns regular expression matching characters that are not allowed in
/// generated file names.
fn regex_unsafe_chars() -> &'static Regex {
    static DATA: OnceLock<Regex> = OnceLock::new();
    DATA.get_or_init(|| Regex::new(r"[^\p{Alphabetic}\p{Nd} _-]").unwrap())
}

/// Returns `<dir>/<name>.ies` with the fixture name reduced to letters,
/// digits, '-' and '_'. Spaces become underscores.
///
/// * `fixture_name` - Fixture name.
/// * `dir`          - Output directory.
pub fn default_output_path(fixture_name: &str, dir: &Path) -> PathBuf {
    let cleaned = regex_unsafe_chars().replace_all(fixture_name, "");
    let safe_name = cleaned.trim().replace(' ', "_");
    let safe_name = if safe_name.is_empty() {
        DEFAULT_FIXTURE_FILE.to_string()
    } else {
        safe_name
    };
    dir.join(format!("{safe_name}.ies"))
}

/// Returns `<stem>_metadata.json` next to the IES file.
///
/// * `ies_path` - IES file path.
pub fn metadata_path(ies_path: &Path) -> PathBuf {
    sibling(ies_path, "_metadata.json")
}

/// Returns `<stem>_partial.json` next to the IES file.
///
/// * `ies_path` - IES file path.
pub fn dump_path(ies_path: &Path) -> PathBuf {
    sibling(ies_path, "_partial.json")
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = format!("{}{suffix}", file_stem(path));
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
