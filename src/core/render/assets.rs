//! Bounded asset loading for one ticket
//!
//! Each ticket needs up to three images: the school logo, the student photo
//! and the watermark. They load concurrently and each load is raced against
//! one shared deadline, so a slow image never stalls a ticket for longer
//! than the configured timeout. Losing the race is an outcome, not an error.

use crate::adapters::assets::AssetLoader;
use image::DynamicImage;
use std::sync::Arc;
use tokio::time::Instant;

/// What happened to one asset load
#[derive(Debug, Clone)]
pub enum AssetOutcome {
    /// Decoded image
    Loaded(Arc<DynamicImage>),
    /// No reference was given
    Missing,
    /// Fetch or decode failed
    Failed(String),
    /// The deadline passed first
    TimedOut,
}

impl AssetOutcome {
    pub fn image(&self) -> Option<&DynamicImage> {
        match self {
            AssetOutcome::Loaded(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, AssetOutcome::Loaded(_))
    }
}

/// Images available to the renderer for one ticket
#[derive(Debug, Clone)]
pub struct TicketAssets {
    pub logo: AssetOutcome,
    pub photo: AssetOutcome,
    pub watermark: AssetOutcome,
}

impl TicketAssets {
    /// No images at all
    pub fn none() -> Self {
        Self {
            logo: AssetOutcome::Missing,
            photo: AssetOutcome::Missing,
            watermark: AssetOutcome::Missing,
        }
    }
}

/// Loads `reference` unless `deadline` passes first
pub async fn load_before(
    loader: &dyn AssetLoader,
    reference: Option<&str>,
    deadline: Instant,
) -> AssetOutcome {
    let reference = match reference.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return AssetOutcome::Missing,
    };

    match tokio::time::timeout_at(deadline, loader.load(reference)).await {
        Ok(Ok(image)) => AssetOutcome::Loaded(Arc::new(image)),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Asset failed to load");
            AssetOutcome::Failed(e.to_string())
        }
        Err(_) => {
            tracing::warn!("Asset load timed out");
            AssetOutcome::TimedOut
        }
    }
}

/// Returns the memoized outcome, or loads before `deadline`
pub async fn reuse_or_load(
    loader: &dyn AssetLoader,
    cached: Option<AssetOutcome>,
    reference: Option<&str>,
    deadline: Instant,
) -> AssetOutcome {
    match cached {
        Some(outcome) => outcome,
        None => load_before(loader, reference, deadline).await,
    }
}
