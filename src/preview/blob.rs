//! In-process object URLs.
//!
//! A [`BlobRegistry`] plays the part of the host's object-URL table: it hands
//! out revocable `blob:` URLs over byte buffers and keeps those buffers alive
//! until the URL is revoked.

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::staging::item::Blob;

const URL_PREFIX: &str = "blob:stager/";

/// A revocable URL naming an in-memory blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Table of live object URLs.
#[derive(Debug, Default)]
pub struct BlobRegistry {
    live: HashMap<ObjectUrl, Blob>,
    next_id: u64,
    created: u64,
    revoked: u64,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new URL for `blob`. Every call yields a distinct URL.
    pub fn create(&mut self, blob: &Blob) -> ObjectUrl {
        let url = ObjectUrl(format!("{}{}", URL_PREFIX, self.next_id));
        self.next_id += 1;
        self.created += 1;
        self.live.insert(url.clone(), blob.clone());
        url
    }

    /// Release `url`. Returns `false` if it was unknown or already revoked.
    pub fn revoke(&mut self, url: &ObjectUrl) -> bool {
        if self.live.remove(url).is_some() {
            self.revoked += 1;
            true
        } else {
            warn!(%url, "revoke of an object URL that is not live");
            false
        }
    }

    pub fn resolve(&self, url: &ObjectUrl) -> Option<&Blob> {
        self.live.get(url)
    }

    /// Number of URLs currently allocated and not yet revoked.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn total_created(&self) -> u64 {
        self.created
    }

    pub fn total_revoked(&self) -> u64 {
        self.revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_returns_distinct_urls_for_same_blob() {
        let mut registry = BlobRegistry::new();
        let blob = Blob::new(vec![1, 2, 3]);
        let a = registry.create(&blob);
        let b = registry.create(&blob);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("blob:stager/"));
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn resolve_until_revoked() {
        let mut registry = BlobRegistry::new();
        let url = registry.create(&Blob::new(vec![7]));
        assert_eq!(registry.resolve(&url).map(|b| b.bytes().to_vec()), Some(vec![7]));
        assert!(registry.revoke(&url));
        assert!(registry.resolve(&url).is_none());
    }

    #[test]
    fn double_revoke_is_reported() {
        let mut registry = BlobRegistry::new();
        let url = registry.create(&Blob::new(vec![0]));
        assert!(registry.revoke(&url));
        assert!(!registry.revoke(&url));
        assert_eq!(registry.total_created(), 1);
        assert_eq!(registry.total_revoked(), 1);
        assert_eq!(registry.live_count(), 0);
    }
}
