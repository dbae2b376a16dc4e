// ===== stanza-common/src/model/arch.rs =====
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, StanzaError};

/// CPU family as seen by platform-conditional logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    Intel,
    Arm,
    /// Reported for hosts that are neither Intel nor ARM. Never accepted as an override.
    Dunno,
}

impl Arch {
    /// Kinds that may be used as a simulated architecture.
    pub const SIMULATABLE: [Arch; 2] = [Arch::Intel, Arch::Arm];

    /// CPU kind of the machine this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(target_arch = "aarch64") {
            Arch::Arm
        } else if cfg!(any(target_arch = "x86_64", target_arch = "x86")) {
            Arch::Intel
        } else {
            Arch::Dunno
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Arch::Intel => "intel",
            Arch::Arm => "arm",
            Arch::Dunno => "dunno",
        }
    }

    /// Name used in bottle tags, e.g. `arm64_sonoma`.
    pub fn standardized(self) -> &'static str {
        match self {
            Arch::Intel => "x86_64",
            Arch::Arm => "arm64",
            Arch::Dunno => "dunno",
        }
    }

    /// Inverse of [`Arch::standardized`] for the two real kinds.
    pub fn from_standardized(name: &str) -> Option<Self> {
        match name {
            "x86_64" => Some(Arch::Intel),
            "arm64" => Some(Arch::Arm),
            _ => None,
        }
    }

    pub fn is_simulatable(self) -> bool {
        Self::SIMULATABLE.contains(&self)
    }

    /// Returns `self` if it may be used as an override, otherwise `InvalidArchValue`.
    pub fn ensure_simulatable(self) -> Result<Self> {
        if self.is_simulatable() {
            Ok(self)
        } else {
            Err(StanzaError::InvalidArchValue(self.to_string()))
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches(':') {
            "intel" => Ok(Arch::Intel),
            "arm" => Ok(Arch::Arm),
            _ => Err(StanzaError::InvalidArchValue(s.to_string())),
        }
    }
}

/// Architecture descriptor stored by a `depends_on arch` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArchSpec {
    #[serde(rename = "type")] // Matches the JSON "type" field of the cask API
    pub kind: Arch,
    pub bits: u32,
}

impl ArchSpec {
    pub const fn new(kind: Arch, bits: u32) -> Self {
        Self { kind, bits }
    }
}

impl fmt::Display for ArchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-bit)", self.kind, self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_override_values() {
        assert_eq!("arm".parse::<Arch>().unwrap(), Arch::Arm);
        assert_eq!(":intel".parse::<Arch>().unwrap(), Arch::Intel);
        assert!(matches!(
            "dunno".parse::<Arch>(),
            Err(StanzaError::InvalidArchValue(v)) if v == "dunno"
        ));
        assert!("arm64".parse::<Arch>().is_err());
    }

    #[test]
    fn standardized_names_round_trip() {
        for arch in Arch::SIMULATABLE {
            assert_eq!(Arch::from_standardized(arch.standardized()), Some(arch));
        }
        assert_eq!(Arch::from_standardized("ppc"), None);
    }

    #[test]
    fn dunno_is_not_simulatable() {
        assert!(Arch::Dunno.ensure_simulatable().is_err());
        assert_eq!(Arch::Arm.ensure_simulatable().unwrap(), Arch::Arm);
    }

    #[test]
    fn arch_spec_serializes_with_type_field() {
        let json = serde_json::to_value(ArchSpec::new(Arch::Arm, 64)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "arm", "bits": 64 }));
    }
}
