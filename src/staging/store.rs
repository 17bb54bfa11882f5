//! The ordered attachment list of one form session.
//!
//! The `items` vector is the only ordering in the program. Navigation, the
//! preview cache and the reorder controller all address items by index into
//! it or by [`ItemId`], and never keep a private copy of the order.

use tracing::debug;

use super::item::{Attachment, ItemId, StagedItem};

/// Ordered staging session: items, active item and preview flag.
#[derive(Debug, Default)]
pub struct StagingStore {
    items: Vec<StagedItem>,
    active_id: Option<ItemId>,
    preview_open: bool,
    generation: u64,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append attachments, each with a freshly minted id.
    ///
    /// No deduplication and no validation; the active item is left alone.
    pub fn add(&mut self, attachments: impl IntoIterator<Item = Attachment>) {
        let before = self.items.len();
        self.items
            .extend(attachments.into_iter().map(StagedItem::new));
        let added = self.items.len() - before;
        if added > 0 {
            self.bump();
            debug!(added, total = self.items.len(), "staged attachments");
        }
    }

    /// Remove the item with `id` and return it.
    ///
    /// Unknown ids are a no-op, so removing twice is harmless. When the
    /// removed item was active, the item that slid into its slot (clamped to
    /// the new last index) becomes active; an emptied session clears the
    /// active item and closes the preview.
    pub fn remove(&mut self, id: &ItemId) -> Option<StagedItem> {
        let index = self.index_of(id)?;
        let removed = self.items.remove(index);
        self.bump();

        if self.active_id.as_ref() == Some(id) {
            if self.items.is_empty() {
                self.active_id = None;
                self.preview_open = false;
            } else {
                let next = index.min(self.items.len() - 1);
                self.active_id = Some(self.items[next].id.clone());
            }
        } else if self.items.is_empty() {
            self.preview_open = false;
        }

        debug!(id = %removed.id, index, remaining = self.items.len(), "removed attachment");
        Some(removed)
    }

    /// Move the item at `from` to `to`, shifting the items in between.
    ///
    /// Out-of-range indices are rejected without touching the list. Returns
    /// whether the order changed.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from >= len || to >= len {
            debug!(from, to, len, "rejected out-of-range reorder");
            return false;
        }
        if from == to {
            return false;
        }
        let moved = self.items.remove(from);
        self.items.insert(to, moved);
        self.bump();
        debug!(from, to, "reordered attachments");
        true
    }

    /// Point the active item at `id`, or clear it. Unknown ids are ignored.
    pub fn set_active(&mut self, id: Option<&ItemId>) {
        match id {
            None => self.active_id = None,
            Some(id) if self.index_of(id).is_some() => self.active_id = Some(id.clone()),
            Some(_) => {}
        }
    }

    pub fn open_preview(&mut self) {
        self.preview_open = true;
    }

    /// Close the preview. Closing always clears the active item too.
    pub fn close_preview(&mut self) {
        self.preview_open = false;
        self.active_id = None;
    }

    /// Empty the session, e.g. after a successful submission.
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.bump();
        }
        self.items.clear();
        self.active_id = None;
        self.preview_open = false;
        debug!("cleared staging session");
    }

    pub fn items(&self) -> &[StagedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StagedItem> {
        self.items.get(index)
    }

    pub fn index_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn active_id(&self) -> Option<&ItemId> {
        self.active_id.as_ref()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_id.as_ref().and_then(|id| self.index_of(id))
    }

    pub fn is_preview_open(&self) -> bool {
        self.preview_open
    }

    /// Counter bumped on every change to the ordered list.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}
