use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Create the directory if it doesn't exist; error if a non-directory exists there.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("[common::fs] Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("[common::fs] Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Extract the given `.zip` file into `dest_dir`.
pub fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(zip_path)
        .with_context(|| format!("[common::fs] Failed to open {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("[common::fs] Failed to read zip archive {}", zip_path.display()))?;
    archive.extract(dest_dir)
        .with_context(|| format!("[common::fs] Failed to extract {} to {}", zip_path.display(), dest_dir.display()))
}

/// First file under `dir` (sorted walk) with the given extension, case-insensitive.
pub fn find_file_with_extension(dir: &Path, extension: &str) -> Result<PathBuf> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("[common::fs] Failed to walk {}", dir.display()))?;
        let matches = entry.file_type().is_file() && entry.path().extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches { return Ok(entry.into_path()) }
    }
    bail!("[common::fs] No .{extension} file found under {}", dir.display())
}

/// Lowercase file extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Hex-encoded SHA-256 of a byte slice.
pub fn sha256_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(sha256_bytes(b""), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }

    #[test]
    fn ensure_dir_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, b"x").unwrap();
        assert!(ensure_dir_exists(&file).is_err());

        let nested = dir.path().join("a/b");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn zip_is_extracted_and_searched() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("villages.zip");
        {
            let mut writer = zip::ZipWriter::new(fs::File::create(&zip_path).unwrap());
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("inner/readme.txt", options).unwrap();
            writer.write_all(b"hello").unwrap();
            writer.start_file("inner/Villages.SHP", options).unwrap();
            writer.write_all(b"stub").unwrap();
            writer.finish().unwrap();
        }

        let out = dir.path().join("out");
        extract_zip(&zip_path, &out).unwrap();
        let found = find_file_with_extension(&out, "shp").unwrap();
        assert_eq!(found.file_name().unwrap(), "Villages.SHP");
        assert_eq!(extension_of(&found), "shp");
        assert!(find_file_with_extension(&out, "dbf").is_err());
    }
}
