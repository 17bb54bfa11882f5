use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

/// Length of the random part of a minted id.
const ID_SUFFIX_LEN: usize = 9;

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Opaque, stable identity of a staged item.
///
/// Minted once when an attachment enters a session and never reused, even
/// when two attachments carry identical names and bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Mint a fresh id of the form `<name>-<unix millis>-<random>-<seq>`.
    pub fn mint(name: &str) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}-{}-{}-{}", name, millis, suffix, seq))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable, cheaply clonable byte buffer of a staged file.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Arc<[u8]>,
}

impl Blob {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob").field("len", &self.len()).finish()
    }
}

/// What a staged item actually is.
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// Raw bytes awaiting submission. Previews allocate object URLs for these.
    BinaryFile {
        blob: Blob,
        /// Where the bytes were read from, if they came from disk.
        source: Option<PathBuf>,
    },
    /// Reference to an already-hosted resource; owned by someone else.
    RemoteUrl { url: String },
}

/// An attachment without an identity yet, as handed to the staging store.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub kind: ItemKind,
    pub mime_hint: String,
}

impl Attachment {
    pub fn binary(name: impl Into<String>, mime_hint: impl Into<String>, blob: Blob) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::BinaryFile { blob, source: None },
            mime_hint: mime_hint.into(),
        }
    }

    pub fn remote(
        name: impl Into<String>,
        mime_hint: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::RemoteUrl { url: url.into() },
            mime_hint: mime_hint.into(),
        }
    }

    /// Record the on-disk origin of a binary attachment.
    pub fn with_source(mut self, path: PathBuf) -> Self {
        if let ItemKind::BinaryFile { ref mut source, .. } = self.kind {
            *source = Some(path);
        }
        self
    }

    /// Size in bytes; `None` for remote references.
    pub fn size_bytes(&self) -> Option<u64> {
        match &self.kind {
            ItemKind::BinaryFile { blob, .. } => Some(blob.len() as u64),
            ItemKind::RemoteUrl { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_hint.starts_with("image/")
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.kind, ItemKind::RemoteUrl { .. })
    }
}

/// An attachment paired with its session identity.
#[derive(Debug, Clone)]
pub struct StagedItem {
    pub id: ItemId,
    pub payload: Attachment,
}

impl StagedItem {
    pub fn new(payload: Attachment) -> Self {
        Self {
            id: ItemId::mint(&payload.name),
            payload,
        }
    }

    pub fn name(&self) -> &str {
        &self.payload.name
    }

    pub fn kind(&self) -> &ItemKind {
        &self.payload.kind
    }

    pub fn mime_hint(&self) -> &str {
        &self.payload.mime_hint
    }

    pub fn is_image(&self) -> bool {
        self.payload.is_image()
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.payload.size_bytes()
    }
}
