//! Replace a file with a fully written temp file.
//!
//! The temp file lives next to the destination so the final step is a rename.
//! On Windows, rename-over-existing fails, so the old file is moved to a
//! `.bak` sibling first and restored if the second attempt fails too.

use std::fs;
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

pub(crate) fn persist_replacing(tmp: NamedTempFile, path: &Path) -> io::Result<()> {
    let Err(err) = tmp.persist(path) else {
        return Ok(());
    };
    if !path.exists() {
        return Err(err.error);
    }

    let backup = path.with_extension("bak");
    let _ = fs::remove_file(&backup);
    fs::rename(path, &backup)?;

    if let Err(retry) = err.file.persist(path) {
        let _ = fs::rename(&backup, path);
        return Err(retry.error);
    }
    if let Err(e) = fs::remove_file(&backup) {
        tracing::warn!(path = %backup.display(), "Failed to remove .bak after replace: {e}");
    }
    Ok(())
}
