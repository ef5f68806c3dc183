use crate::manifest::CatalogManifest;
use crate::{AssetLibrary, CatalogError};
use headend_types::{Marker, SegmentType};
use std::collections::HashMap;

/// One admitted asset with everything the planner may ask about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub asset_uri: String,
    pub duration_ms: i64,
    pub markers: Vec<Marker>,
    pub title: String,
    pub synopsis: Option<String>,
}

/// An interstitial candidate offered for break packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerAsset {
    pub asset_uri: String,
    pub duration_ms: i64,
    pub asset_type: SegmentType,
}

/// In-memory asset library seeded once at startup.
///
/// Interstitials keep their seed order; break packing takes the first
/// candidate that fits, so seed order is selection order.
#[derive(Debug, Default)]
pub struct InMemoryAssetLibrary {
    assets: HashMap<String, AssetRecord>,
    interstitials: Vec<FillerAsset>,
}

impl InMemoryAssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_manifest(manifest: CatalogManifest) -> Result<Self, CatalogError> {
        let mut library = Self::new();
        for asset in manifest.assets {
            library.insert_asset(asset.into_record())?;
        }
        for filler in manifest.interstitials {
            library.insert_interstitial(filler.into_filler())?;
        }
        Ok(library)
    }

    pub fn insert_asset(&mut self, mut record: AssetRecord) -> Result<(), CatalogError> {
        if record.duration_ms <= 0 {
            return Err(CatalogError::UnmeasuredAsset {
                uri: record.asset_uri,
                duration_ms: record.duration_ms,
            });
        }
        record.markers.sort_by_key(|m| m.offset_ms);
        self.assets.insert(record.asset_uri.clone(), record);
        Ok(())
    }

    pub fn insert_interstitial(&mut self, filler: FillerAsset) -> Result<(), CatalogError> {
        if filler.duration_ms <= 0 {
            return Err(CatalogError::UnmeasuredAsset {
                uri: filler.asset_uri,
                duration_ms: filler.duration_ms,
            });
        }
        self.interstitials.push(filler);
        Ok(())
    }

    fn record(&self, asset_uri: &str) -> Result<&AssetRecord, CatalogError> {
        self.assets.get(asset_uri).ok_or_else(|| CatalogError::UnknownAsset {
            uri: asset_uri.to_string(),
        })
    }
}

impl AssetLibrary for InMemoryAssetLibrary {
    fn duration_ms(&self, asset_uri: &str) -> Result<i64, CatalogError> {
        Ok(self.record(asset_uri)?.duration_ms)
    }

    fn markers(&self, asset_uri: &str) -> Result<Vec<Marker>, CatalogError> {
        Ok(self.record(asset_uri)?.markers.clone())
    }

    fn filler_assets(&self, max_duration_ms: i64, max_count: usize) -> Vec<FillerAsset> {
        self.interstitials
            .iter()
            .filter(|f| f.duration_ms <= max_duration_ms)
            .take(max_count)
            .cloned()
            .collect()
    }

    fn title(&self, asset_uri: &str) -> Result<String, CatalogError> {
        Ok(self.record(asset_uri)?.title.clone())
    }

    fn synopsis(&self, asset_uri: &str) -> Option<String> {
        self.assets.get(asset_uri).and_then(|r| r.synopsis.clone())
    }
}
