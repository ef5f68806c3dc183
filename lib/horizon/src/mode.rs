use serde::{Deserialize, Serialize};

/// Horizon authority policy for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizonAuthorityMode {
    /// The manager does not run; an external legacy path owns planning.
    Legacy,
    /// The manager runs and populates stores, but cutover has not happened;
    /// useful for validating that horizon maintenance keeps up.
    Shadow,
    /// The manager is the sole planning trigger. Consumers are read-only
    /// and any consumer-triggered planning is a policy violation.
    Authoritative,
}

impl std::str::FromStr for HorizonAuthorityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "shadow" => Ok(Self::Shadow),
            "authoritative" => Ok(Self::Authoritative),
            other => Err(format!(
                "unrecognized horizon authority mode '{other}'; expected legacy|shadow|authoritative"
            )),
        }
    }
}

impl HorizonAuthorityMode {
    /// Whether the manager's extension loop runs in this mode.
    pub fn extends(self) -> bool {
        !matches!(self, Self::Legacy)
    }
}
