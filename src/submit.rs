//! Handing the final ordered attachment list to a submission backend.
//!
//! The only backend is [`ManifestSubmitter`], which records the submission as
//! a JSON manifest on disk. Nothing is uploaded anywhere.

use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::error::Result;
use crate::event::Event;
use crate::staging::item::{ItemId, ItemKind, StagedItem};

/// One attachment as recorded in a manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub position: usize,
    pub id: ItemId,
    pub name: String,
    pub mime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The ordered attachment list of one submission.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub submitted_at_ms: u64,
    pub attachments: Vec<ManifestEntry>,
}

impl Manifest {
    /// Snapshot `items` in their current order.
    pub fn from_items(items: &[StagedItem]) -> Self {
        let attachments = items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let (source, url) = match item.kind() {
                    ItemKind::BinaryFile { source, .. } => {
                        (source.as_ref().map(|p| p.display().to_string()), None)
                    }
                    ItemKind::RemoteUrl { url } => (None, Some(url.clone())),
                };
                ManifestEntry {
                    position,
                    id: item.id.clone(),
                    name: item.name().to_string(),
                    mime: item.mime_hint().to_string(),
                    size_bytes: item.size_bytes(),
                    source,
                    url,
                }
            })
            .collect();
        let submitted_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            submitted_at_ms,
            attachments,
        }
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }
}

/// Result of a submission as reported back to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub success: bool,
    pub message: String,
}

/// A submission backend. Implementations may block.
pub trait Submitter: Send + Sync {
    fn submit(&self, manifest: &Manifest) -> Result<()>;
}

/// Writes each submission as pretty-printed JSON to a fixed path.
#[derive(Debug, Clone)]
pub struct ManifestSubmitter {
    path: PathBuf,
}

impl ManifestSubmitter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Submitter for ManifestSubmitter {
    fn submit(&self, manifest: &Manifest) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), manifest)?;
        Ok(())
    }
}

/// Run `submitter` off the UI loop and report completion as an event.
pub fn spawn_submit(
    submitter: Arc<dyn Submitter>,
    manifest: Manifest,
    tx: mpsc::UnboundedSender<Event>,
) {
    tokio::task::spawn_blocking(move || {
        let outcome = run_submit(submitter.as_ref(), &manifest);
        let _ = tx.send(Event::Submitted(outcome));
    });
}

/// Submit synchronously and turn the result into an outcome.
pub fn run_submit(submitter: &dyn Submitter, manifest: &Manifest) -> SubmitOutcome {
    match submitter.submit(manifest) {
        Ok(()) => {
            info!(count = manifest.len(), "submission recorded");
            SubmitOutcome {
                success: true,
                message: format!("Submitted {} attachment(s)", manifest.len()),
            }
        }
        Err(e) => {
            error!(error = %e, "submission failed");
            SubmitOutcome {
                success: false,
                message: format!("Submission failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::staging::item::{Attachment, Blob};
    use crate::staging::store::StagingStore;
    use tempfile::TempDir;

    struct FailingSubmitter;

    impl Submitter for FailingSubmitter {
        fn submit(&self, _manifest: &Manifest) -> Result<()> {
            Err(AppError::Terminal("backend unavailable".into()))
        }
    }

    fn sample_store() -> StagingStore {
        let mut store = StagingStore::new();
        store.add(vec![
            Attachment::binary("a.png", "image/png", Blob::new(vec![0; 16])),
            Attachment::remote("demo.jpg", "image/jpeg", "https://example.com/demo.jpg"),
        ]);
        store
    }

    #[test]
    fn manifest_preserves_order_and_kinds() {
        let mut store = sample_store();
        store.reorder(1, 0);
        let manifest = Manifest::from_items(store.items());
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.attachments[0].name, "demo.jpg");
        assert_eq!(
            manifest.attachments[0].url.as_deref(),
            Some("https://example.com/demo.jpg")
        );
        assert_eq!(manifest.attachments[1].size_bytes, Some(16));
        assert_eq!(manifest.attachments[1].position, 1);
    }

    #[test]
    fn manifest_submitter_writes_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let manifest = Manifest::from_items(sample_store().items());

        let outcome = run_submit(&ManifestSubmitter::new(&path), &manifest);
        assert!(outcome.success);

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let attachments = written["attachments"].as_array().unwrap();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0]["name"], "a.png");
        assert!(attachments[0].get("url").is_none());
    }

    #[test]
    fn failure_is_reported_not_raised() {
        let manifest = Manifest::from_items(sample_store().items());
        let outcome = run_submit(&FailingSubmitter, &manifest);
        assert!(!outcome.success);
        assert!(outcome.message.contains("backend unavailable"));
    }

    #[tokio::test]
    async fn spawned_submit_reports_through_channel() {
        let dir = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let submitter: Arc<dyn Submitter> =
            Arc::new(ManifestSubmitter::new(dir.path().join("m.json")));

        spawn_submit(submitter, Manifest::from_items(sample_store().items()), tx);

        match rx.recv().await {
            Some(Event::Submitted(outcome)) => assert!(outcome.success),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
