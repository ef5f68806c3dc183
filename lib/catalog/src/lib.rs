//! Asset library: the planner's read-only view of measured media.
//!
//! The library answers duration, marker, and interstitial queries from
//! memory. It performs no I/O on the pacing path; enrichment and probing
//! happen upstream, before assets are admitted here.

mod library;
mod manifest;

pub use library::{AssetRecord, FillerAsset, InMemoryAssetLibrary};
pub use manifest::CatalogManifest;

use headend_types::Marker;

/// Lookup failures surfaced to planning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown asset: {uri}")]
    UnknownAsset { uri: String },
    #[error("asset {uri} has non-positive duration {duration_ms} ms")]
    UnmeasuredAsset { uri: String, duration_ms: i64 },
}

/// Capability set the planner requires. Read-only.
pub trait AssetLibrary: Send + Sync {
    /// Measured duration of an asset. Always positive for admitted assets.
    fn duration_ms(&self, asset_uri: &str) -> Result<i64, CatalogError>;

    /// Stored first-class markers, ordered by offset.
    fn markers(&self, asset_uri: &str) -> Result<Vec<Marker>, CatalogError>;

    /// Interstitial candidates no longer than `max_duration_ms`, at most
    /// `max_count`, in library order. The traffic layer applies channel
    /// policy on top of this raw listing.
    fn filler_assets(&self, max_duration_ms: i64, max_count: usize) -> Vec<FillerAsset>;

    /// Viewer-facing title for guide derivation.
    fn title(&self, asset_uri: &str) -> Result<String, CatalogError>;

    /// Viewer-facing synopsis, when one was ingested.
    fn synopsis(&self, asset_uri: &str) -> Option<String>;
}
