//! Package a mod's `r6/` tree into `<modname>/<modname>.zip`.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ProjectError;
use crate::persist::persist_replacing;

/// Location of a script inside a well-formed mod directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModLayout {
    /// `<modname>/`
    pub mod_dir: PathBuf,
    /// `<modname>/r6/`
    pub r6_dir: PathBuf,
    pub name: String,
}

impl ModLayout {
    /// Derive the layout from a script at `<modname>/r6/scripts/<file>`.
    pub fn from_script(script: &Path) -> Result<Self, ProjectError> {
        let invalid = || ProjectError::InvalidLayout {
            path: script.to_path_buf(),
        };

        let scripts_dir = script.parent().filter(|dir| dir.ends_with("scripts")).ok_or_else(invalid)?;
        let r6_dir = scripts_dir.parent().filter(|dir| dir.ends_with("r6")).ok_or_else(invalid)?;
        let mod_dir = r6_dir.parent().ok_or_else(invalid)?;
        let name = mod_dir
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(invalid)?;

        Ok(Self {
            mod_dir: mod_dir.to_path_buf(),
            r6_dir: r6_dir.to_path_buf(),
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.mod_dir.join(format!("{}.zip", self.name))
    }
}

/// Zip the `r6/` tree of the mod that contains `script`.
///
/// Entries are stored relative to the mod directory, so the archive root is
/// `r6/` and it can be extracted straight into the game folder. An existing
/// archive is replaced only once the new one is complete.
pub fn package_mod(script: &Path) -> Result<PathBuf, ProjectError> {
    let layout = ModLayout::from_script(script)?;
    let archive = layout.archive_path();

    let mut tmp = NamedTempFile::new_in(&layout.mod_dir)
        .map_err(ProjectError::io("failed to create archive in", &layout.mod_dir))?;
    let entries = write_archive(&layout, tmp.as_file_mut()).map_err(|err| match err {
        ArchiveFailure::Read(path, source) => ProjectError::Io {
            action: "failed to read",
            path,
            source,
        },
        ArchiveFailure::Zip(source) => ProjectError::Archive {
            path: archive.clone(),
            source,
        },
    })?;
    persist_replacing(tmp, &archive).map_err(ProjectError::io("failed to write", &archive))?;

    tracing::info!(path = %archive.display(), entries, "Zip file created");
    Ok(archive)
}

enum ArchiveFailure {
    Read(PathBuf, io::Error),
    Zip(zip::result::ZipError),
}

impl From<zip::result::ZipError> for ArchiveFailure {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Zip(err)
    }
}

fn write_archive(layout: &ModLayout, out: &mut File) -> Result<usize, ArchiveFailure> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(out);
    let mut entries = 0;

    for entry in WalkDir::new(&layout.r6_dir).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map_or_else(|| layout.r6_dir.clone(), Path::to_path_buf);
            ArchiveFailure::Read(path, err.into())
        })?;
        let Ok(relative) = entry.path().strip_prefix(&layout.mod_dir) else {
            continue;
        };
        let name = archive_name(relative);

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            let mut file = File::open(entry.path())
                .map_err(|err| ArchiveFailure::Read(entry.path().to_path_buf(), err))?;
            io::copy(&mut file, &mut writer)
                .map_err(|err| ArchiveFailure::Zip(err.into()))?;
        }
        entries += 1;
    }

    writer.finish()?;
    Ok(entries)
}

/// Forward-slash entry name regardless of platform.
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
