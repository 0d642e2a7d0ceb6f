//! Filesystem helpers used by the drivers.
//!
//! Everything here returns [FsError], which records what we were trying to do and to which path, so that the reports
//! can say more than "permission denied".
use std::path::{Path, PathBuf};

use crate::errors::FsError;

/// Delete `dir` if it exists, then create it again, empty.
///
/// Not crash safe: a crash between the two steps leaves no output for the test at all.  It never leaves old and new
/// output side by side.
pub fn reset_dir(dir: &Path) -> Result<(), FsError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => log::debug!("Removed previous output at {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(FsError::new("remove previous output", dir, e)),
    }

    std::fs::create_dir_all(dir).map_err(|e| FsError::new("create directory", dir, e))
}

pub fn create_dir(dir: &Path) -> Result<(), FsError> {
    std::fs::create_dir_all(dir).map_err(|e| FsError::new("create directory", dir, e))
}

/// Files directly inside `dir` whose names match `glob`, sorted by path.
///
/// A missing directory has no files in it and is not an error; generators are free to produce nothing.
pub fn files_matching(dir: &Path, glob: &str) -> Result<Vec<PathBuf>, FsError> {
    let matcher = globset::Glob::new(glob)
        .map(|g| g.compile_matcher())
        .map_err(|e| {
            FsError::new(
                "match files in",
                dir,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            )
        })?;

    let entries = match std::fs::read_dir(dir) {
        Ok(x) => x,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(FsError::new("list", dir, e)),
    };

    let mut ret = vec![];
    for entry in entries {
        let entry = entry.map_err(|e| FsError::new("list", dir, e))?;
        let is_file = entry
            .file_type()
            .map_err(|e| FsError::new("inspect", entry.path(), e))?
            .is_file();
        if is_file && matcher.is_match(entry.file_name()) {
            ret.push(entry.path());
        }
    }

    ret.sort();
    Ok(ret)
}

/// Copy every file in `src_dir` matching `glob` into `dest_dir`, replacing same-named files.
///
/// Copies contents only.  The sources may be read-only (they are shared by every test), and copying their permissions
/// would make the next regeneration unable to overwrite the copies.  Returns the number of files copied.
pub fn copy_matching(src_dir: &Path, glob: &str, dest_dir: &Path) -> Result<usize, FsError> {
    if !src_dir.is_dir() {
        return Err(FsError::new(
            "copy files from",
            src_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source directory does not exist"),
        ));
    }

    let files = files_matching(src_dir, glob)?;
    for src in files.iter() {
        let Some(file_name) = src.file_name() else {
            continue;
        };
        let dest = dest_dir.join(file_name);

        let contents = std::fs::read(src).map_err(|e| FsError::new("read", src, e))?;
        make_writable(&dest)?;
        std::fs::write(&dest, contents).map_err(|e| FsError::new("write", &dest, e))?;
    }

    Ok(files.len())
}

/// If `path` exists and is read-only, clear that so it can be overwritten.
fn make_writable(path: &Path) -> Result<(), FsError> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(FsError::new("inspect", path, e)),
    };

    let mut perms = meta.permissions();
    if perms.readonly() {
        allow_owner_write(&mut perms);
        std::fs::set_permissions(path, perms)
            .map_err(|e| FsError::new("make writable", path, e))?;
    }
    Ok(())
}

/// Only the owner gets write access back; group and other bits are left as they were.
#[cfg(unix)]
fn allow_owner_write(perms: &mut std::fs::Permissions) {
    use std::os::unix::fs::PermissionsExt;

    perms.set_mode(perms.mode() | 0o200);
}

#[cfg(not(unix))]
fn allow_owner_write(perms: &mut std::fs::Permissions) {
    // There is only the one read-only attribute here.
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_reset_removes_old_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("FooTogetherAsJson");
        std::fs::create_dir_all(root.join("model")).unwrap();
        std::fs::write(root.join("model").join("sentinel.txt"), b"stale").unwrap();

        reset_dir(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_creates_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("a").join("b");
        reset_dir(&root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_files_matching() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.proto", "a.proto", "c.avsc", "x.schema.json", "y.json"] {
            std::fs::write(tmp.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(tmp.path().join("dir.proto")).unwrap();

        let names = |glob| {
            files_matching(tmp.path(), glob)
                .unwrap()
                .into_iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
        };

        assert_eq!(names("*.proto"), vec!["a.proto", "b.proto"]);
        assert_eq!(names("*.schema.json"), vec!["x.schema.json"]);
        assert_eq!(names("*.avsc"), vec!["c.avsc"]);
        assert!(files_matching(&tmp.path().join("missing"), "*.proto")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_copy_overwrites_and_ignores_readonly_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dest).unwrap();

        let src_file = src.join("JsonSerializer.cs");
        std::fs::write(&src_file, b"new").unwrap();
        std::fs::write(src.join("notes.md"), b"skip me").unwrap();
        let mut perms = std::fs::metadata(&src_file).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&src_file, perms).unwrap();

        std::fs::write(dest.join("JsonSerializer.cs"), b"old").unwrap();

        assert_eq!(copy_matching(&src, "*.cs", &dest).unwrap(), 1);
        assert_eq!(
            std::fs::read(dest.join("JsonSerializer.cs")).unwrap(),
            b"new"
        );
        assert!(!dest.join("notes.md").exists());

        // A second copy must still be able to overwrite.
        assert_eq!(copy_matching(&src, "*.cs", &dest).unwrap(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_only_restores_owner_write() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(src.join("CborSerializer.cs"), b"new").unwrap();

        let dest_file = dest.join("CborSerializer.cs");
        std::fs::write(&dest_file, b"old").unwrap();
        std::fs::set_permissions(&dest_file, std::fs::Permissions::from_mode(0o444)).unwrap();

        assert_eq!(copy_matching(&src, "*.cs", &dest).unwrap(), 1);
        assert_eq!(std::fs::read(&dest_file).unwrap(), b"new");
        let mode = std::fs::metadata(&dest_file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_copy_from_missing_source_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = copy_matching(&tmp.path().join("nope"), "*.cs", tmp.path()).unwrap_err();
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }
}
