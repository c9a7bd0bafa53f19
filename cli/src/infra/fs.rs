//! Filesystem helper for writing credential material to disk.

use anyhow::{Context, Result};
use std::path::Path;

/// Writes `contents` to `path` with owner-only (0600) permissions,
/// creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, the file
/// cannot be written, or permissions cannot be set.
pub fn write_secret_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("cannot write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("cannot set permissions on {}", path.display()))?;
    }
    Ok(())
}
