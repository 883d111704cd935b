use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

#[cfg(windows)]
const CROSS_DEVICE_ERROR: i32 = 17; // ERROR_NOT_SAME_DEVICE
#[cfg(not(windows))]
const CROSS_DEVICE_ERROR: i32 = 18; // EXDEV

/// Move a file or directory to `dst`, which must not exist yet.
///
/// Uses a rename; across filesystems it falls back to copy then remove.
pub fn move_entry(src: &Path, dst: &Path) -> io::Result<()> {
    if dst.exists() {
        return Err(io::Error::new(
            ErrorKind::AlreadyExists,
            format!("{} already exists", dst.display()),
        ));
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(err) if err.raw_os_error() == Some(CROSS_DEVICE_ERROR) => {
            debug!("Rename across devices, copying {} to {}", src.display(), dst.display());
            if src.is_dir() {
                copy_tree_missing(src, dst)?;
                fs::remove_dir_all(src)
            } else {
                fs::copy(src, dst)?;
                fs::remove_file(src)
            }
        }
        Err(err) => Err(err),
    }
}

/// Copy the tree under `src` into `dst`, skipping files that already exist there.
/// Returns the number of files copied.
pub fn copy_tree_missing(src: &Path, dst: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(ErrorKind::Other, e))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if !target.exists() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Remove empty directories under and including `dir`, bottom-up.
/// Returns true when `dir` itself was removed.
pub fn prune_empty_dirs(dir: &Path) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && !path.is_symlink() {
            prune_empty_dirs(&path)?;
        }
    }

    if fs::read_dir(dir)?.next().is_none() {
        fs::remove_dir(dir)?;
        return Ok(true);
    }
    Ok(false)
}
