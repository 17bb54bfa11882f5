//! Decoding images for display, and warming the neighbours of the current one.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbImage;
use tracing::debug;

use super::blob::BlobRegistry;
use super::cache::{CachedUrl, PreviewUrlCache};
use crate::error::Result;
use crate::staging::item::{Blob, ItemId, StagedItem};

/// Decoded images are downscaled to fit this box; terminals never need more.
pub const MAX_DECODED_DIM: u32 = 320;

/// A decoded, display-sized copy of a staged image.
#[derive(Debug)]
pub struct DecodedImage {
    /// Dimensions of the original image.
    pub width: u32,
    pub height: u32,
    pub pixels: RgbImage,
}

impl DecodedImage {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        let (width, height) = (img.width(), img.height());
        let pixels = if width > MAX_DECODED_DIM || height > MAX_DECODED_DIM {
            img.thumbnail(MAX_DECODED_DIM, MAX_DECODED_DIM).to_rgb8()
        } else {
            img.to_rgb8()
        };
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Where the bytes of a preview come from.
#[derive(Debug, Clone)]
pub enum DecodeSource {
    /// Bytes behind an object URL this session allocated.
    Memory(Blob),
    /// A local reference (`file://` or a bare path) read at decode time.
    Disk(PathBuf),
}

impl DecodeSource {
    /// Resolve the cached URL of `item` to something decodable.
    ///
    /// Network references resolve to `None`; they are shown as links.
    pub fn resolve(item: &StagedItem, cache: &PreviewUrlCache, registry: &BlobRegistry) -> Option<Self> {
        match cache.url_for(&item.id)? {
            CachedUrl::Owned(url) => registry.resolve(url).cloned().map(DecodeSource::Memory),
            CachedUrl::Borrowed(url) => {
                if let Some(path) = url.strip_prefix("file://") {
                    Some(DecodeSource::Disk(PathBuf::from(path)))
                } else if url.contains("://") {
                    None
                } else {
                    Some(DecodeSource::Disk(PathBuf::from(url)))
                }
            }
        }
    }

    /// Load and decode. Blocking; run it off the UI loop.
    pub fn decode(&self) -> Result<DecodedImage> {
        match self {
            DecodeSource::Memory(blob) => DecodedImage::decode(blob.bytes()),
            DecodeSource::Disk(path) => DecodedImage::decode(&fs::read(path)?),
        }
    }
}

/// Decode progress of one item.
#[derive(Debug, Clone)]
pub enum DecodeState {
    Pending,
    Ready(Arc<DecodedImage>),
    Failed,
}

/// Decoded images of the open preview, keyed by item id.
#[derive(Debug, Default)]
pub struct Preloader {
    states: HashMap<ItemId, DecodeState>,
}

impl Preloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Neighbours of `index` worth warming: one step back and one forward,
    /// without wrapping. Out-of-range neighbours are skipped.
    pub fn adjacent(index: usize, len: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(2);
        if index > 0 && index - 1 < len {
            out.push(index - 1);
        }
        if index + 1 < len {
            out.push(index + 1);
        }
        out
    }

    pub fn state(&self, id: &ItemId) -> Option<&DecodeState> {
        self.states.get(id)
    }

    /// Mark `id` as pending. Returns `false` if it is already pending or
    /// done, in which case no new decode should be started.
    pub fn request(&mut self, id: &ItemId) -> bool {
        if self.states.contains_key(id) {
            return false;
        }
        self.states.insert(id.clone(), DecodeState::Pending);
        true
    }

    /// Store a decode result. Results for ids no longer pending (the preview
    /// closed or the item was removed meanwhile) are dropped.
    pub fn complete(&mut self, id: &ItemId, result: Result<DecodedImage>) {
        let Some(state) = self.states.get_mut(id) else {
            debug!(%id, "dropping decode result for a forgotten item");
            return;
        };
        if !matches!(state, DecodeState::Pending) {
            return;
        }
        *state = match result {
            Ok(img) => DecodeState::Ready(Arc::new(img)),
            Err(e) => {
                debug!(%id, error = %e, "preview decode failed");
                DecodeState::Failed
            }
        };
    }

    /// Forget everything not in `items`.
    pub fn retain(&mut self, items: &[StagedItem]) {
        self.states
            .retain(|id, _| items.iter().any(|item| &item.id == id));
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }
}
