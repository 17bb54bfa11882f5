use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::item::{Attachment, Blob};
use super::validate::Candidate;
use crate::error::{AppError, Result};

/// A file on disk that has been inspected but not read yet.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub path: PathBuf,
    pub candidate: Candidate,
}

/// Guess a mime type from a path's extension.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Stat a path so it can be validated before its bytes are read.
pub fn inspect(path: &Path) -> Result<PendingFile> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(AppError::InvalidPath(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::InvalidPath(format!("{} has no file name", path.display())))?;
    Ok(PendingFile {
        path: path.to_path_buf(),
        candidate: Candidate {
            name,
            size_bytes: metadata.len(),
            mime: guess_mime(path),
        },
    })
}

/// Read an inspected file into a binary attachment.
pub fn load(pending: PendingFile) -> Result<Attachment> {
    let bytes = fs::read(&pending.path)?;
    debug!(path = %pending.path.display(), len = bytes.len(), "read attachment");
    Ok(
        Attachment::binary(pending.candidate.name, pending.candidate.mime, Blob::new(bytes))
            .with_source(pending.path),
    )
}

/// Build a reference attachment for an already-hosted resource.
pub fn remote(url: &str) -> Attachment {
    let path_part = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/');
    let after_scheme = path_part
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(path_part);
    let name = after_scheme
        .split_once('/')
        .and_then(|(_, path)| path.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(url);
    let mime = guess_mime(Path::new(name));
    Attachment::remote(name, mime, url)
}

/// Split pasted text (a terminal file drop) into candidate paths.
///
/// Handles one path per line, `file://` URIs, surrounding quotes and the
/// backslash-escaped spaces some terminals emit for a single dropped file.
pub fn parse_paste(text: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let line = line
                .strip_prefix('\'')
                .and_then(|l| l.strip_suffix('\''))
                .or_else(|| line.strip_prefix('"').and_then(|l| l.strip_suffix('"')))
                .unwrap_or(line);
            let line = line.strip_prefix("file://").unwrap_or(line);
            PathBuf::from(line.replace("\\ ", " "))
        })
        .collect()
}
