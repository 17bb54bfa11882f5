use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Pick a path in `dir` for `name` that does not exist yet: `name`, then
/// `stem (1).ext`, `stem (2).ext`, ...
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let first = dir.join(name);
    if !first.exists() {
        return first;
    }
    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, ext)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

/// Write `bytes` into `dir` under `name` without overwriting anything.
pub fn save_bytes(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    // Only the final path component of a display name is trusted.
    let safe_name = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "attachment".to_string());
    let path = unique_path(dir, &safe_name);
    fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn saves_under_display_name() {
        let dir = TempDir::new().unwrap();
        let path = save_bytes(dir.path(), "photo.png", b"abc").unwrap();
        assert_eq!(path, dir.path().join("photo.png"));
        assert_eq!(fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn never_overwrites() {
        let dir = TempDir::new().unwrap();
        save_bytes(dir.path(), "photo.png", b"one").unwrap();
        let second = save_bytes(dir.path(), "photo.png", b"two").unwrap();
        assert_eq!(second, dir.path().join("photo (1).png"));
        assert_eq!(fs::read(dir.path().join("photo.png")).unwrap(), b"one");
    }

    #[test]
    fn strips_directory_components_from_name() {
        let dir = TempDir::new().unwrap();
        let path = save_bytes(dir.path(), "../../etc/passwd", b"x").unwrap();
        assert_eq!(path, dir.path().join("passwd"));
    }
}
