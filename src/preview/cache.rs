//! Item id to displayable URL, with exact-once release of allocated URLs.

use std::collections::HashMap;

use tracing::debug;

use super::blob::{BlobRegistry, ObjectUrl};
use crate::staging::item::{ItemId, ItemKind, StagedItem};

/// A URL held by the cache, tagged with who owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedUrl {
    /// Allocated by this cache; must be revoked exactly once.
    Owned(ObjectUrl),
    /// A remote reference reused as-is; never revoked.
    Borrowed(String),
}

impl CachedUrl {
    pub fn as_str(&self) -> &str {
        match self {
            CachedUrl::Owned(url) => url.as_str(),
            CachedUrl::Borrowed(url) => url,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, CachedUrl::Owned(_))
    }
}

/// Preview URLs for the items of one open preview.
#[derive(Debug, Default)]
pub struct PreviewUrlCache {
    entries: HashMap<ItemId, CachedUrl>,
    built_for: Option<u64>,
}

impl PreviewUrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the mapping if the list changed since the last build.
    ///
    /// A rebuild first releases every URL from the previous build, then maps
    /// every visible item: binary images get a fresh object URL, remote items
    /// reuse their reference, other binaries get no entry. Returns whether a
    /// rebuild happened.
    pub fn sync(
        &mut self,
        items: &[StagedItem],
        generation: u64,
        registry: &mut BlobRegistry,
    ) -> bool {
        if self.built_for == Some(generation) {
            return false;
        }
        let released = self.release_all(registry);
        for item in items {
            self.ensure(item, registry);
        }
        self.built_for = Some(generation);
        debug!(
            generation,
            released,
            entries = self.entries.len(),
            "rebuilt preview URL cache"
        );
        true
    }

    /// Create the entry for `item` if it has none yet.
    pub fn ensure(&mut self, item: &StagedItem, registry: &mut BlobRegistry) -> Option<&CachedUrl> {
        if !self.entries.contains_key(&item.id) {
            let url = match item.kind() {
                ItemKind::BinaryFile { blob, .. } if item.is_image() => {
                    CachedUrl::Owned(registry.create(blob))
                }
                ItemKind::BinaryFile { .. } => return None,
                ItemKind::RemoteUrl { url } => CachedUrl::Borrowed(url.clone()),
            };
            self.entries.insert(item.id.clone(), url);
        }
        self.entries.get(&item.id)
    }

    /// Drop the entry for `id`, revoking its URL if this cache allocated it.
    pub fn release(&mut self, id: &ItemId, registry: &mut BlobRegistry) -> bool {
        match self.entries.remove(id) {
            Some(CachedUrl::Owned(url)) => registry.revoke(&url),
            Some(CachedUrl::Borrowed(_)) | None => false,
        }
    }

    /// Drop every entry. Returns how many owned URLs were revoked.
    pub fn release_all(&mut self, registry: &mut BlobRegistry) -> usize {
        let released = self
            .entries
            .drain()
            .filter_map(|(_, url)| match url {
                CachedUrl::Owned(url) => Some(url),
                CachedUrl::Borrowed(_) => None,
            })
            .filter(|url| registry.revoke(url))
            .count();
        self.built_for = None;
        released
    }

    pub fn url_for(&self, id: &ItemId) -> Option<&CachedUrl> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn owned_count(&self) -> usize {
        self.entries.values().filter(|u| u.is_owned()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::item::{Attachment, Blob};
    use crate::staging::store::StagingStore;

    fn image(name: &str) -> Attachment {
        Attachment::binary(name, "image/png", Blob::new(name.as_bytes().to_vec()))
    }

    #[test]
    fn open_three_images_close_releases_three() {
        let mut store = StagingStore::new();
        store.add(vec![image("a.png"), image("b.png"), image("c.png")]);
        let mut registry = BlobRegistry::new();
        let mut cache = PreviewUrlCache::new();

        cache.sync(store.items(), store.generation(), &mut registry);
        assert_eq!(cache.len(), 3);
        assert_eq!(registry.live_count(), 3);

        assert_eq!(cache.release_all(&mut registry), 3);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.total_revoked(), 3);
        assert!(cache.is_empty());
    }

    #[test]
    fn remote_items_are_reused_not_allocated() {
        let mut store = StagingStore::new();
        store.add(vec![
            image("a.png"),
            Attachment::remote("demo.jpg", "image/jpeg", "https://example.com/demo.jpg"),
        ]);
        let mut registry = BlobRegistry::new();
        let mut cache = PreviewUrlCache::new();
        cache.sync(store.items(), store.generation(), &mut registry);

        let remote_id = &store.items()[1].id;
        assert_eq!(
            cache.url_for(remote_id),
            Some(&CachedUrl::Borrowed("https://example.com/demo.jpg".into()))
        );
        assert_eq!(cache.owned_count(), 1);
        assert_eq!(cache.release_all(&mut registry), 1);
        assert_eq!(registry.total_created(), 1);
    }

    #[test]
    fn non_image_binaries_get_no_entry() {
        let mut store = StagingStore::new();
        store.add(vec![Attachment::binary(
            "doc.pdf",
            "application/pdf",
            Blob::new(vec![1]),
        )]);
        let mut registry = BlobRegistry::new();
        let mut cache = PreviewUrlCache::new();
        cache.sync(store.items(), store.generation(), &mut registry);
        assert!(cache.is_empty());
        assert_eq!(registry.total_created(), 0);
    }

    #[test]
    fn sync_is_noop_for_same_generation() {
        let mut store = StagingStore::new();
        store.add(vec![image("a.png")]);
        let mut registry = BlobRegistry::new();
        let mut cache = PreviewUrlCache::new();
        assert!(cache.sync(store.items(), store.generation(), &mut registry));
        assert!(!cache.sync(store.items(), store.generation(), &mut registry));
        assert_eq!(registry.total_created(), 1);
    }

    #[test]
    fn list_change_releases_previous_build_exactly_once() {
        let mut store = StagingStore::new();
        store.add(vec![image("a.png"), image("b.png")]);
        let mut registry = BlobRegistry::new();
        let mut cache = PreviewUrlCache::new();
        cache.sync(store.items(), store.generation(), &mut registry);

        store.reorder(0, 1);
        cache.sync(store.items(), store.generation(), &mut registry);
        assert_eq!(registry.total_created(), 4);
        assert_eq!(registry.total_revoked(), 2);
        assert_eq!(registry.live_count(), 2);

        cache.release_all(&mut registry);
        assert_eq!(registry.total_revoked(), 4);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn release_single_entry_and_again_is_noop() {
        let mut store = StagingStore::new();
        store.add(vec![image("a.png"), image("b.png")]);
        let mut registry = BlobRegistry::new();
        let mut cache = PreviewUrlCache::new();
        cache.sync(store.items(), store.generation(), &mut registry);

        let id = store.items()[0].id.clone();
        assert!(cache.release(&id, &mut registry));
        assert!(!cache.release(&id, &mut registry));
        assert_eq!(registry.total_revoked(), 1);
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn ensure_is_lazy_and_stable() {
        let mut store = StagingStore::new();
        store.add(vec![image("a.png")]);
        let mut registry = BlobRegistry::new();
        let mut cache = PreviewUrlCache::new();

        let item = &store.items()[0];
        let first = cache.ensure(item, &mut registry).cloned();
        let second = cache.ensure(item, &mut registry).cloned();
        assert_eq!(first, second);
        assert_eq!(registry.total_created(), 1);
    }
}
