// ABOUTME: Zip archives for folder uploads
// ABOUTME: Stages files in a temporary directory and packs them into a zip file

use crate::errors::{CursaError, Result};
use log::debug;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack every file under `src` into the zip file `dest`, with entry names
/// relative to `src`.
pub fn zip_directory(src: &Path, dest: &Path) -> Result<()> {
    let file = File::create(dest).map_err(|e| CursaError::write(dest, e))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| CursaError::ArchiveError(e.to_string()))?;
        let path = entry.path();
        let relative = path
            .strip_prefix(src)
            .map_err(|e| CursaError::ArchiveError(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        // zip entry names always use forward slashes
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else {
            let data = fs::read(path).map_err(|e| CursaError::read(path, e))?;
            zip.start_file(name, options)?;
            zip.write_all(&data)
                .map_err(|e| CursaError::ArchiveError(format!("Failed to add {}: {}", path.display(), e)))?;
        }
    }

    zip.finish()?;
    debug!("Packed {:?} into {:?}", src, dest);
    Ok(())
}

/// A temporary staging directory and the zip file made from it.
///
/// Both live inside one [`TempDir`], so dropping the value removes them
/// whether the upload succeeded or not.
pub struct StagedArchive {
    dir: TempDir,
    stage: PathBuf,
    zip_path: PathBuf,
}

impl StagedArchive {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("cursa")
            .tempdir()
            .map_err(|e| CursaError::ArchiveError(format!("Failed to create staging directory: {}", e)))?;
        let stage = dir.path().join("stage");
        fs::create_dir(&stage).map_err(|source| CursaError::DirectoryError {
            path: stage.clone(),
            source,
        })?;
        let zip_path = dir.path().join("archive.zip");
        Ok(Self {
            dir,
            stage,
            zip_path,
        })
    }

    /// Zip an existing directory without staging a copy of it first.
    pub fn of_dir(src: &Path) -> Result<Self> {
        let archive = Self::new()?;
        zip_directory(src, &archive.zip_path)?;
        Ok(archive)
    }

    /// Directory to copy files into before calling [`StagedArchive::pack`]
    pub fn stage_dir(&self) -> &Path {
        &self.stage
    }

    /// Zip the staging directory and return the archive path
    pub fn pack(&self) -> Result<&Path> {
        zip_directory(&self.stage, &self.zip_path)?;
        Ok(&self.zip_path)
    }

    pub fn zip_path(&self) -> &Path {
        &self.zip_path
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
