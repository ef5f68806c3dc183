use crate::library::{AssetRecord, FillerAsset};
use headend_types::{Marker, SegmentType};
use serde::Deserialize;

/// Seed file for the in-memory library. Produced by the import/enrichment
/// tooling; consumed once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogManifest {
    #[serde(default)]
    pub assets: Vec<ManifestAsset>,
    #[serde(default)]
    pub interstitials: Vec<ManifestInterstitial>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestAsset {
    pub asset_uri: String,
    pub duration_ms: i64,
    #[serde(default)]
    pub markers: Vec<Marker>,
    pub title: String,
    #[serde(default)]
    pub synopsis: Option<String>,
}

impl ManifestAsset {
    pub(crate) fn into_record(self) -> AssetRecord {
        AssetRecord {
            asset_uri: self.asset_uri,
            duration_ms: self.duration_ms,
            markers: self.markers,
            title: self.title,
            synopsis: self.synopsis,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestInterstitial {
    pub asset_uri: String,
    pub duration_ms: i64,
    pub asset_type: SegmentType,
}

impl ManifestInterstitial {
    pub(crate) fn into_filler(self) -> FillerAsset {
        FillerAsset {
            asset_uri: self.asset_uri,
            duration_ms: self.duration_ms,
            asset_type: self.asset_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssetLibrary, InMemoryAssetLibrary};

    #[test]
    fn manifest_seeds_a_usable_library() {
        let manifest: CatalogManifest = serde_json::from_str(
            r#"{
                "assets": [
                    {"asset_uri": "file:///ep1.mp4", "duration_ms": 1320000, "title": "Pilot"}
                ],
                "interstitials": [
                    {"asset_uri": "file:///spot.mp4", "duration_ms": 30000, "asset_type": "commercial"}
                ]
            }"#,
        )
        .unwrap();
        let lib = InMemoryAssetLibrary::from_manifest(manifest).unwrap();
        assert_eq!(lib.duration_ms("file:///ep1.mp4").unwrap(), 1_320_000);
        assert_eq!(lib.filler_assets(60_000, 5).len(), 1);
    }

    #[test]
    fn unknown_manifest_keys_are_rejected() {
        let err = serde_json::from_str::<CatalogManifest>(r#"{"assets": [], "extra": 1}"#);
        assert!(err.is_err());
    }
}
