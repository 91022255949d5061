//! Ticket image asset loading
//!
//! Logos, photos and the watermark are referenced by URL. [`AssetLoader`]
//! turns a reference into a decoded image; [`HttpAssetLoader`] handles
//! `http(s)://`, `data:` and local file references.

pub mod loader;

pub use loader::{AssetLoader, HttpAssetLoader};
