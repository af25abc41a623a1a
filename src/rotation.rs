//! # Rotation and Archival
//!
//! Size-triggered rotation renames the backing file to
//! `<base>_<YYYYMMDD_HHMMSS>[_<counter>]<ext>` and optionally replaces it
//! with a single-entry ZIP archive (`<rotated name>.zip`). The next append
//! recreates the original path as an empty file.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const ROTATION_STAMP: &str = "%Y%m%d_%H%M%S";

/// When and how the backing file is rotated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate once the file grows beyond this many bytes. `None` disables rotation.
    pub max_size_bytes: Option<u64>,
    /// Replace the rotated file with a ZIP archive.
    pub compress: bool,
}

impl RotationPolicy {
    pub fn new(max_size_bytes: Option<u64>, compress: bool) -> Self {
        RotationPolicy {
            max_size_bytes,
            compress,
        }
    }

    /// True when a file of `size` bytes exceeds the configured bound.
    pub fn should_rotate(&self, size: u64) -> bool {
        matches!(self.max_size_bytes, Some(max) if size > max)
    }
}

/// Current size of `path`, treating a missing file as empty.
pub fn file_size(path: &Path) -> io::Result<u64> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(err) => Err(err),
    }
}

/// `archive.txt` -> `archive.txt.zip`
pub fn zip_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".zip");
    PathBuf::from(name)
}

/// Picks the first free rotation target for `path` at instant `now`.
///
/// A candidate is taken when neither it nor, for compressing policies, its
/// `.zip` counterpart exists yet.
pub fn rotated_path(path: &Path, now: &NaiveDateTime, compress: bool) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stamp = now.format(ROTATION_STAMP);
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    let taken = |candidate: &Path| candidate.exists() || (compress && zip_path(candidate).exists());

    let mut candidate = dir.join(format!("{stem}_{stamp}{ext}"));
    let mut counter = 1u32;
    while taken(&candidate) {
        candidate = dir.join(format!("{stem}_{stamp}_{counter}{ext}"));
        counter += 1;
    }
    candidate
}

/// Writes `src` into a new DEFLATE archive at `archive`, stored under its file name.
pub fn compress_file(src: &Path, archive: &Path) -> io::Result<()> {
    let entry_name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file path: {}", src.display()),
            )
        })?;

    let mut input = File::open(src)?;
    let mut zip = ZipWriter::new(File::create(archive)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry_name, options).map_err(io::Error::other)?;
    io::copy(&mut input, &mut zip)?;
    zip.finish().map_err(io::Error::other)?;
    Ok(())
}

/// Compresses `path` into `target` and removes the original.
pub fn archive(path: &Path, target: &Path) -> io::Result<()> {
    compress_file(path, target)?;
    fs::remove_file(path)?;
    tracing::info!(
        file = %path.display(),
        archive = %target.display(),
        "Log file archived"
    );
    Ok(())
}

/// Moves `path` aside, compressing it when the policy asks for it.
///
/// Returns the path of the artifact left behind.
pub fn rotate(path: &Path, policy: &RotationPolicy, now: &NaiveDateTime) -> io::Result<PathBuf> {
    let target = rotated_path(path, now, policy.compress);
    fs::rename(path, &target)?;

    let artifact = if policy.compress {
        let zipped = zip_path(&target);
        compress_file(&target, &zipped)?;
        fs::remove_file(&target)?;
        zipped
    } else {
        target
    };

    tracing::info!(
        old_file = %path.display(),
        new_file = %artifact.display(),
        "Log file rotated"
    );
    Ok(artifact)
}

/// Rotates `path` if it exceeds the policy bound.
///
/// A missing file or a disabled policy is not an error and yields `None`.
pub fn rotate_if_needed(
    path: &Path,
    policy: &RotationPolicy,
    now: &NaiveDateTime,
) -> io::Result<Option<PathBuf>> {
    if policy.max_size_bytes.is_none() {
        return Ok(None);
    }
    if !policy.should_rotate(file_size(path)?) {
        return Ok(None);
    }
    rotate(path, policy, now).map(Some)
}
