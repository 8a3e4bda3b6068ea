use std::fs::{File, Permissions};
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Result of [`write_if_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The destination was (re)written.
    Written,
    /// The destination already held identical bytes; nothing was touched.
    UpToDate,
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write `contents` to `path` so that readers never observe a partial file.
///
/// The bytes go to a temporary file in the destination directory which is
/// then renamed over `path`. If anything fails the temporary file is dropped
/// (and deleted) and the previous contents of `path` are left untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().set_permissions(destination_permissions(path, tmp.as_file())?)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Permissions the replacement file should carry: those of the file being
/// replaced, or `0644` for a new file. Temporary files start out as `0600`.
fn destination_permissions(path: &Path, tmp: &File) -> std::io::Result<Permissions> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.permissions()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => new_file_permissions(tmp),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn new_file_permissions(_tmp: &File) -> std::io::Result<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions(tmp: &File) -> std::io::Result<Permissions> {
    Ok(tmp.metadata()?.permissions())
}

/// Like [`write_atomic`] but skips the write when `path` already contains
/// exactly `contents`.
pub fn write_if_changed(path: &Path, contents: &[u8]) -> std::io::Result<WriteOutcome> {
    if let Ok(existing) = std::fs::read(path) {
        if existing == contents {
            tracing::debug!("{} is up to date", path.display());
            return Ok(WriteOutcome::UpToDate);
        }
    }
    write_atomic(path, contents)?;
    Ok(WriteOutcome::Written)
}
