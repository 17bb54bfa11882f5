//! Attachment staging: identities, the ordered session store, validation,
//! loading from disk and saving back out.

pub mod export;
pub mod item;
pub mod loader;
pub mod store;
pub mod validate;
