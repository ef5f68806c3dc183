use serde::{Deserialize, Serialize};

/// Tagged reference to schedulable programming.
///
/// The variant determines how the reference resolves to a [`ResolvedAsset`]:
/// episodes and movies bind to library assets; virtual programs resolve
/// through a generator registered under the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ProgramRef {
    Episode(String),
    Movie(String),
    Virtual(String),
}

impl ProgramRef {
    pub fn id(&self) -> &str {
        match self {
            ProgramRef::Episode(id) | ProgramRef::Movie(id) | ProgramRef::Virtual(id) => id,
        }
    }

    /// Stable key used in sequence-cursor identity.
    pub fn key(&self) -> String {
        match self {
            ProgramRef::Episode(id) => format!("episode:{id}"),
            ProgramRef::Movie(id) => format!("movie:{id}"),
            ProgramRef::Virtual(id) => format!("virtual:{id}"),
        }
    }
}

/// First-class marker kinds stored with an asset. Second-class breakpoints
/// are computed at segmentation time and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Chapter,
    AdBreakHint,
}

/// A position of interest within an asset, ordered by offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub offset_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A program reference bound to measured media. Measured once; immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAsset {
    pub asset_uri: String,
    /// Always positive once resolved.
    pub duration_ms: i64,
    /// Ordered by `offset_ms`.
    pub markers: Vec<Marker>,
}

impl ResolvedAsset {
    /// Chapter-marker offsets strictly inside `(0, duration_ms)`, sorted.
    pub fn chapter_breakpoints(&self) -> Vec<i64> {
        let mut points: Vec<i64> = self
            .markers
            .iter()
            .filter(|m| m.kind == MarkerKind::Chapter)
            .map(|m| m.offset_ms)
            .filter(|&off| off > 0 && off < self.duration_ms)
            .collect();
        points.sort_unstable();
        points.dedup();
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_breakpoints_exclude_edges_and_hints() {
        let asset = ResolvedAsset {
            asset_uri: "file:///ep.mp4".into(),
            duration_ms: 1_320_000,
            markers: vec![
                Marker { kind: MarkerKind::Chapter, offset_ms: 0, label: None },
                Marker { kind: MarkerKind::Chapter, offset_ms: 660_000, label: None },
                Marker { kind: MarkerKind::AdBreakHint, offset_ms: 200_000, label: None },
                Marker { kind: MarkerKind::Chapter, offset_ms: 330_000, label: None },
                Marker { kind: MarkerKind::Chapter, offset_ms: 1_320_000, label: None },
            ],
        };
        assert_eq!(asset.chapter_breakpoints(), vec![330_000, 660_000]);
    }

    #[test]
    fn program_ref_keys_are_kind_scoped() {
        assert_eq!(ProgramRef::Episode("s1e1".into()).key(), "episode:s1e1");
        assert_ne!(
            ProgramRef::Episode("x".into()).key(),
            ProgramRef::Movie("x".into()).key()
        );
    }
}
