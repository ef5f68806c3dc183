use serde::{Deserialize, Serialize};

/// Kind of a scheduled segment. The smallest executable span in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Content,
    Filler,
    Promo,
    Ad,
    Commercial,
    Pad,
}

impl SegmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentType::Content => "content",
            SegmentType::Filler => "filler",
            SegmentType::Promo => "promo",
            SegmentType::Ad => "ad",
            SegmentType::Commercial => "commercial",
            SegmentType::Pad => "pad",
        }
    }

    /// Interstitial kinds eligible for break packing.
    pub fn is_interstitial(self) -> bool {
        matches!(
            self,
            SegmentType::Filler | SegmentType::Promo | SegmentType::Ad | SegmentType::Commercial
        )
    }
}

/// How a segment hands off to its successor at a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// Hard cut; used on first-class (chapter-marker) breakpoints.
    None,
    /// Crossfade; used on computed second-class breakpoints.
    Fade { duration_ms: i64 },
}

/// Provenance of the breakpoint that bounds a content segment.
///
/// First-class breakpoints come from stored chapter markers; second-class
/// are computed by equal division. The class is carried through to the
/// as-run log so attestation stays faithful to how the cut was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointClass {
    FirstClass,
    SecondClass,
}

/// One executable span within a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSegment {
    pub segment_type: SegmentType,
    /// Opaque media path/URI. Empty for pad segments.
    pub asset_uri: String,
    pub asset_start_offset_ms: i64,
    pub segment_duration_ms: i64,
    pub transition: Transition,
    /// Set on content segments that end at a breakpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint_class: Option<BreakpointClass>,
    /// Pad inserted by the runtime to absorb an execution fault, not by
    /// planning. Recovery segments are exempt from runway accounting.
    #[serde(default)]
    pub runtime_recovery: bool,
}

impl ScheduledSegment {
    pub fn content(asset_uri: impl Into<String>, offset_ms: i64, duration_ms: i64) -> Self {
        Self {
            segment_type: SegmentType::Content,
            asset_uri: asset_uri.into(),
            asset_start_offset_ms: offset_ms,
            segment_duration_ms: duration_ms,
            transition: Transition::None,
            breakpoint_class: None,
            runtime_recovery: false,
        }
    }

    pub fn pad(duration_ms: i64) -> Self {
        Self {
            segment_type: SegmentType::Pad,
            asset_uri: String::new(),
            asset_start_offset_ms: 0,
            segment_duration_ms: duration_ms,
            transition: Transition::None,
            breakpoint_class: None,
            runtime_recovery: false,
        }
    }

    /// Recovery accounting rule: only runtime-inserted pads are exempt.
    pub fn is_recovery(&self) -> bool {
        self.segment_type == SegmentType::Pad && self.runtime_recovery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_type_round_trips_through_serde_names() {
        let json = serde_json::to_string(&SegmentType::Commercial).unwrap();
        assert_eq!(json, "\"commercial\"");
        let back: SegmentType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SegmentType::Commercial);
    }

    #[test]
    fn recovery_requires_pad_and_flag() {
        let mut seg = ScheduledSegment::pad(500);
        assert!(!seg.is_recovery());
        seg.runtime_recovery = true;
        assert!(seg.is_recovery());

        let mut content = ScheduledSegment::content("file:///a.mp4", 0, 500);
        content.runtime_recovery = true;
        assert!(!content.is_recovery());
    }
}
