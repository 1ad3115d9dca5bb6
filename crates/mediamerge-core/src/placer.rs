use crate::error::Error;
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copy `src` into the staging area without ever overwriting an existing
/// file. Collisions are resolved with a bounded suffix search: try
/// `staging_root/basename`, then `staging_root/duplicate-1/basename`,
/// `duplicate-2/…` and so on until an unoccupied path is found.
/// Intermediate directories are created as needed and the source's
/// modification time is preserved at the destination.
pub fn stage_copy(src: &Path, staging_root: &Path) -> Result<PathBuf, Error> {
    let basename = src
        .file_name()
        .ok_or_else(|| Error::Other(format!("Source has no file name: {}", src.display())))?;

    let mut index = 0u32;
    loop {
        let dest = if index == 0 {
            staging_root.join(basename)
        } else {
            staging_root
                .join(format!("duplicate-{}", index))
                .join(basename)
        };

        if dest.exists() {
            index += 1;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        copy_preserving_mtime(src, &dest)?;
        debug!("Staged {} -> {}", src.display(), dest.display());
        return Ok(dest);
    }
}

fn copy_preserving_mtime(src: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(src, dest)?;
    let metadata = fs::metadata(src)?;
    filetime::set_file_mtime(dest, FileTime::from_last_modification_time(&metadata))
}

/// Replace `dest` with `src` in place. Rename when both live on the same
/// filesystem, copy-and-remove otherwise. The fallback carries the source
/// mtime across; the modify date stamped during finalization must survive
/// a cross-device move.
pub fn move_replace(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_preserving_mtime(src, dest)?;
            fs::remove_file(src)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_first_placement_uses_root() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("photo.jpg");
        fs::write(&src, b"content").unwrap();
        let staging = tmp.path().join("staging");

        let dest = stage_copy(&src, &staging).unwrap();
        assert_eq!(dest, staging.join("photo.jpg"));
        assert_eq!(fs::read(&dest).unwrap(), b"content");
    }

    #[test]
    fn test_collisions_never_overwrite() {
        let tmp = tempdir().unwrap();
        let staging = tmp.path().join("staging");

        let mut destinations = Vec::new();
        for i in 0..4 {
            let src_dir = tmp.path().join(format!("src{}", i));
            fs::create_dir_all(&src_dir).unwrap();
            let src = src_dir.join("photo.jpg");
            fs::write(&src, format!("content {}", i)).unwrap();
            destinations.push(stage_copy(&src, &staging).unwrap());
        }

        // All four destinations are distinct and every payload survived.
        for (i, dest) in destinations.iter().enumerate() {
            assert_eq!(fs::read(dest).unwrap(), format!("content {}", i).as_bytes());
        }
        assert_eq!(destinations[0], staging.join("photo.jpg"));
        assert_eq!(destinations[1], staging.join("duplicate-1").join("photo.jpg"));
        assert_eq!(destinations[2], staging.join("duplicate-2").join("photo.jpg"));
        assert_eq!(destinations[3], staging.join("duplicate-3").join("photo.jpg"));
    }

    #[test]
    fn test_mtime_preserved() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("photo.jpg");
        fs::write(&src, b"content").unwrap();
        filetime::set_file_mtime(&src, FileTime::from_unix_time(1_577_836_800, 0)).unwrap();

        let dest = stage_copy(&src, &tmp.path().join("staging")).unwrap();
        let dest_mtime = FileTime::from_last_modification_time(&fs::metadata(&dest).unwrap());
        assert_eq!(dest_mtime.unix_seconds(), 1_577_836_800);
    }

    #[test]
    fn test_fallback_copy_preserves_mtime_over_existing_dest() {
        // The copy-and-remove branch of move_replace, exercised directly
        // since a cross-device rename failure cannot be forced here.
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("staged.jpg");
        let dest = tmp.path().join("original.jpg");
        fs::write(&src, b"better copy").unwrap();
        fs::write(&dest, b"worse copy").unwrap();
        filetime::set_file_mtime(&src, FileTime::from_unix_time(1_577_836_800, 0)).unwrap();

        copy_preserving_mtime(&src, &dest).unwrap();
        let dest_mtime = FileTime::from_last_modification_time(&fs::metadata(&dest).unwrap());
        assert_eq!(dest_mtime.unix_seconds(), 1_577_836_800);
        assert_eq!(fs::read(&dest).unwrap(), b"better copy");
    }

    #[test]
    fn test_move_replace_overwrites_dest() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("staged.jpg");
        let dest = tmp.path().join("original.jpg");
        fs::write(&src, b"better copy").unwrap();
        fs::write(&dest, b"worse copy").unwrap();

        move_replace(&src, &dest).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"better copy");
    }
}
