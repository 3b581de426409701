//! Module archive building and installation.
//!
//! A module archive is a deflate-compressed zip of the whole output
//! directory, with entry names relative to that directory.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackageError, PackageResult};

/// Result of building an archive.
#[derive(Debug, Clone)]
pub struct ArchiveBuildResult {
    /// Full path of the archive file.
    pub path: PathBuf,

    /// Entry names in the order they were written.
    pub entries: Vec<String>,

    /// Archive size in bytes.
    pub size: u64,

    /// SHA-256 checksum of the archive (hex).
    pub checksum: String,
}

/// Zip every regular file below `source_dir` into `archive_path`.
///
/// Any existing file at `archive_path` is replaced. If writing fails the
/// partial archive is removed.
pub fn build_archive(source_dir: &Path, archive_path: &Path) -> PackageResult<ArchiveBuildResult> {
    if !source_dir.is_dir() {
        return Err(PackageError::ReadFailed {
            path: source_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "output directory does not exist"),
        });
    }

    let file = File::create(archive_path).map_err(|e| PackageError::WriteFailed {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    let entries = match write_entries(file, source_dir, archive_path) {
        Ok(entries) => entries,
        Err(e) => {
            // Best effort; the original error is what matters.
            let _ = fs::remove_file(archive_path);
            return Err(e);
        }
    };

    let size = fs::metadata(archive_path)
        .map_err(|e| PackageError::ReadFailed {
            path: archive_path.to_path_buf(),
            source: e,
        })?
        .len();
    let checksum = calculate_sha256(archive_path)?;

    info!(
        archive = %archive_path.display(),
        entries = entries.len(),
        size,
        "Archive written"
    );

    Ok(ArchiveBuildResult {
        path: archive_path.to_path_buf(),
        entries,
        size,
        checksum,
    })
}

fn write_entries(file: File, source_dir: &Path, archive_path: &Path) -> PackageResult<Vec<String>> {
    // The archive may live inside the directory being archived.
    let skip = archive_path.canonicalize().ok();

    let mut files = Vec::new();
    collect_files(source_dir, &mut files)?;

    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(file);
    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        if skip.is_some() && path.canonicalize().ok() == skip {
            continue;
        }

        let name = entry_name(source_dir, &path)?;
        let mut input = File::open(&path).map_err(|e| PackageError::ReadFailed {
            path: path.clone(),
            source: e,
        })?;

        zip.start_file(name.as_str(), options)
            .map_err(|e| PackageError::ArchiveFailed(format!("{}: {}", name, e)))?;
        io::copy(&mut input, &mut zip).map_err(|e| PackageError::ReadFailed {
            path: path.clone(),
            source: e,
        })?;

        debug!(entry = %name, "Added archive entry");
        entries.push(name);
    }

    zip.finish()
        .map_err(|e| PackageError::ArchiveFailed(e.to_string()))?;

    Ok(entries)
}

/// Recursively collect regular files, sorted by name within each directory.
///
/// Symlinked directories are not descended into; symlinks to files are kept.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> PackageResult<()> {
    let read_failed = |e: io::Error| PackageError::ReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut paths = fs::read_dir(dir)
        .map_err(read_failed)?
        .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_failed)?;
    paths.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, file_type) in paths {
        if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            files.push(path);
        } else if file_type.is_symlink() {
            debug!(path = %path.display(), "Not following symlinked directory");
        }
    }

    Ok(())
}

/// Archive entry name: path relative to `root`, joined with `/`.
fn entry_name(root: &Path, path: &Path) -> PackageResult<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        PackageError::ArchiveFailed(format!(
            "{} is not inside {}",
            path.display(),
            root.display()
        ))
    })?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Move an archive into the host application's modules directory.
///
/// An existing module with the same file name is replaced. Falls back to
/// copy and delete when a rename is not possible (e.g. across file systems).
pub fn install_archive(archive_path: &Path, modules_dir: &Path) -> PackageResult<PathBuf> {
    if !modules_dir.is_dir() {
        return Err(PackageError::Config(format!(
            "modules directory does not exist: {}",
            modules_dir.display()
        )));
    }

    let file_name = archive_path.file_name().ok_or_else(|| {
        PackageError::Config(format!("invalid archive path: {}", archive_path.display()))
    })?;
    let target = modules_dir.join(file_name);

    if is_same_file(archive_path, &target) {
        info!(module = %target.display(), "Module already in place");
        return Ok(target);
    }

    if target.exists() {
        fs::remove_file(&target).map_err(|e| PackageError::WriteFailed {
            path: target.clone(),
            source: e,
        })?;
    }

    if fs::rename(archive_path, &target).is_err() {
        fs::copy(archive_path, &target).map_err(|e| PackageError::WriteFailed {
            path: target.clone(),
            source: e,
        })?;
        fs::remove_file(archive_path).map_err(|e| PackageError::WriteFailed {
            path: archive_path.to_path_buf(),
            source: e,
        })?;
    }

    info!(module = %target.display(), "Module installed");
    Ok(target)
}

/// Whether both paths resolve to the same existing file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Calculate the SHA-256 checksum of a file as lowercase hex.
pub fn calculate_sha256(path: &Path) -> PackageResult<String> {
    let mut file = File::open(path).map_err(|e| PackageError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(|e| PackageError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn archive_names(path: &Path) -> Vec<String> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_build_archive_nested_entries() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("bin");
        fs::create_dir_all(out.join("images")).unwrap();
        fs::write(out.join("db.xml"), b"<root/>").unwrap();
        fs::write(out.join("images").join("map.png"), b"png").unwrap();

        let archive_path = temp.path().join("Test.mod");
        let result = build_archive(&out, &archive_path).unwrap();

        assert_eq!(result.entries, vec!["db.xml", "images/map.png"]);
        assert_eq!(archive_names(&archive_path), result.entries);
        assert_eq!(result.checksum.len(), 64);
        assert!(result.size > 0);
    }

    #[test]
    fn test_build_archive_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("bin");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("a.xml"), b"a").unwrap();

        let archive_path = temp.path().join("Test.mod");
        fs::write(&archive_path, b"not a zip").unwrap();

        build_archive(&out, &archive_path).unwrap();
        assert_eq!(archive_names(&archive_path), vec!["a.xml"]);
    }

    #[test]
    fn test_build_archive_inside_source_skips_itself() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("db.xml"), b"<root/>").unwrap();

        let archive_path = temp.path().join("Self.mod");
        let result = build_archive(temp.path(), &archive_path).unwrap();

        assert_eq!(result.entries, vec!["db.xml"]);
    }

    #[test]
    fn test_build_archive_missing_source() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("Test.mod");

        let err = build_archive(&temp.path().join("missing"), &archive_path).unwrap_err();
        assert!(matches!(err, PackageError::ReadFailed { .. }));
        assert!(!archive_path.exists());
    }

    #[test]
    fn test_install_archive_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let modules = temp.path().join("modules");
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join("Test.mod"), b"old").unwrap();

        let archive_path = temp.path().join("Test.mod");
        fs::write(&archive_path, b"new").unwrap();

        let installed = install_archive(&archive_path, &modules).unwrap();

        assert_eq!(installed, modules.join("Test.mod"));
        assert_eq!(fs::read(&installed).unwrap(), b"new");
        assert!(!archive_path.exists());
    }

    #[test]
    fn test_install_archive_already_in_modules_dir() {
        let temp = TempDir::new().unwrap();
        let modules = temp.path().join("modules");
        fs::create_dir_all(&modules).unwrap();
        let archive_path = modules.join("HMaps.mod");
        fs::write(&archive_path, b"built").unwrap();

        let installed = install_archive(&archive_path, &modules).unwrap();

        assert_eq!(installed, modules.join("HMaps.mod"));
        assert_eq!(fs::read(&installed).unwrap(), b"built");
    }

    #[cfg(unix)]
    #[test]
    fn test_build_archive_skips_symlinked_directories() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("bin");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("db.xml"), b"<root/>").unwrap();
        fs::write(temp.path().join("token.png"), b"png").unwrap();
        std::os::unix::fs::symlink(&out, out.join("loop")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("token.png"), out.join("token.png")).unwrap();

        let archive_path = temp.path().join("Test.mod");
        let result = build_archive(&out, &archive_path).unwrap();

        assert_eq!(result.entries, vec!["db.xml", "token.png"]);
        assert_eq!(archive_names(&archive_path), result.entries);
    }

    #[test]
    fn test_install_archive_missing_modules_dir() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("Test.mod");
        fs::write(&archive_path, b"x").unwrap();

        let err = install_archive(&archive_path, &temp.path().join("nope")).unwrap_err();
        assert!(err.is_config_error());
        assert!(archive_path.exists());
    }

    #[test]
    fn test_calculate_sha256_known_value() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("abc.txt");
        fs::write(&path, b"abc").unwrap();

        assert_eq!(
            calculate_sha256(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
