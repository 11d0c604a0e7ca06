// ABOUTME: Utility functions for the cursa application
// ABOUTME: Filesystem helpers that report failures as content errors

use crate::errors::{CursaError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|source| CursaError::DirectoryError {
            path: path.to_path_buf(),
            source,
        })?;
    } else if !path.is_dir() {
        return Err(CursaError::DirectoryError {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "not a directory"),
        });
    }
    Ok(())
}

/// Create every directory in the list
pub fn make_dirs(directories: &[PathBuf]) -> Result<()> {
    directories.iter().try_for_each(|dir| ensure_directory_exists(dir))
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        ensure_directory_exists(parent)?;
    }
    Ok(())
}

/// Read a UTF-8 text file
pub fn read_data_from_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CursaError::read(path, e))
}

/// Create (or truncate) a file and write `data` to it
pub fn write_to_file(path: &Path, data: &str) -> Result<()> {
    debug!("Writing {:?}", path);
    fs::write(path, data).map_err(|e| CursaError::write(path, e))
}

/// Create empty files, leaving existing ones untouched
pub fn create_files(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if !path.exists() {
            write_to_file(path, "")?;
        }
    }
    Ok(())
}

/// Copy each file into the `dest` directory
pub fn copy_files(files: &[PathBuf], dest: &Path) -> Result<()> {
    for file in files {
        let name = file.file_name().ok_or_else(|| {
            CursaError::ContentError(format!("Invalid asset path {}", file.display()))
        })?;
        let target = dest.join(name);
        fs::copy(file, &target).map_err(|source| CursaError::CopyError {
            from: file.clone(),
            to: dest.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Copy a directory tree to `dest`; a missing source is skipped.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    if !src.is_dir() {
        debug!("Nothing to copy from {:?}", src);
        return ensure_directory_exists(dest);
    }
    ensure_directory_exists(dest)?;
    let options = fs_extra::dir::CopyOptions::new()
        .overwrite(true)
        .content_only(true);
    fs_extra::dir::copy(src, dest, &options).map_err(|e| {
        CursaError::CopyError {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        }
    })?;
    Ok(())
}

/// Names of the regular files directly inside `dir`
pub fn gather_file_names(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| CursaError::read(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CursaError::read(dir, e))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Delete the files (not sub-directories) directly inside `dir`.
/// A directory that does not exist yet is created empty.
pub fn clean(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return ensure_directory_exists(dir);
    }
    for name in gather_file_names(dir)? {
        let path = dir.join(name);
        fs::remove_file(&path).map_err(|source| CursaError::DeleteError { path, source })?;
    }
    Ok(())
}

pub fn clean_directories(directories: &[PathBuf]) -> Result<()> {
    directories.iter().try_for_each(|dir| clean(dir))
}

/// Delete a previous output so it can be regenerated
pub fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|source| CursaError::DeleteError {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
