//! External system integrations for hallticket.
//!
//! - [`backend`] - Hosted school database (Supabase / PostgREST)
//! - [`assets`] - Image loading for logos, photos and watermarks
//!
//! Both sit behind traits ([`backend::SchoolBackend`], [`assets::AssetLoader`])
//! so the export pipeline can be driven by test stubs.

pub mod assets;
pub mod backend;
