//! Preview resources: object URLs, the per-preview URL cache and image
//! decoding with adjacent preloading.

pub mod blob;
pub mod cache;
pub mod preload;
