// ===== stanza-common/src/model/macos.rs =====
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Result, StanzaError};

/// Release nickname of a supported macOS version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MacOSCodename {
    ElCapitan,
    Sierra,
    HighSierra,
    Mojave,
    Catalina,
    BigSur,
    Monterey,
    Ventura,
    Sonoma,
    Sequoia,
    Tahoe,
}

impl MacOSCodename {
    /// Newest first.
    pub const ALL: [MacOSCodename; 11] = [
        MacOSCodename::Tahoe,
        MacOSCodename::Sequoia,
        MacOSCodename::Sonoma,
        MacOSCodename::Ventura,
        MacOSCodename::Monterey,
        MacOSCodename::BigSur,
        MacOSCodename::Catalina,
        MacOSCodename::Mojave,
        MacOSCodename::HighSierra,
        MacOSCodename::Sierra,
        MacOSCodename::ElCapitan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tahoe => "tahoe",
            Self::Sequoia => "sequoia",
            Self::Sonoma => "sonoma",
            Self::Ventura => "ventura",
            Self::Monterey => "monterey",
            Self::BigSur => "big_sur",
            Self::Catalina => "catalina",
            Self::Mojave => "mojave",
            Self::HighSierra => "high_sierra",
            Self::Sierra => "sierra",
            Self::ElCapitan => "el_capitan",
        }
    }

    pub fn version_str(self) -> &'static str {
        match self {
            Self::Tahoe => "26",
            Self::Sequoia => "15",
            Self::Sonoma => "14",
            Self::Ventura => "13",
            Self::Monterey => "12",
            Self::BigSur => "11",
            Self::Catalina => "10.15",
            Self::Mojave => "10.14",
            Self::HighSierra => "10.13",
            Self::Sierra => "10.12",
            Self::ElCapitan => "10.11",
        }
    }

    /// The numeric release this codename stands for.
    pub fn version(self) -> MacOSVersion {
        MacOSVersion::from_codename(self)
    }

    /// Looks up a codename, accepting an optional leading `:` marker.
    pub fn lookup(name: &str) -> Option<Self> {
        let name = name.strip_prefix(':').unwrap_or(name);
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for MacOSCodename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MacOSCodename {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s).ok_or_else(|| {
            StanzaError::VersionError(format!(
                "unknown or unsupported macOS version: :{}",
                s.trim_start_matches(':')
            ))
        })
    }
}

impl Serialize for MacOSCodename {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A strict numeric macOS version such as `10.15` or `14`.
///
/// Ordering and equality use the numeric value, so `14` and `14.0` compare equal
/// while [`MacOSVersion::as_str`] keeps what was written.
#[derive(Debug, Clone)]
pub struct MacOSVersion {
    raw: String,
    parsed: semver::Version,
}

impl MacOSVersion {
    pub fn parse(value: &str) -> Result<Self> {
        let raw = value.trim();
        let components: Vec<&str> = raw.split('.').collect();
        let well_formed = (1..=3).contains(&components.len())
            && components
                .iter()
                .all(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()));
        if !well_formed {
            return Err(StanzaError::VersionError(format!(
                "unknown or unsupported macOS version: {value:?}"
            )));
        }

        let mut numbers = [0u64; 3];
        for (slot, component) in numbers.iter_mut().zip(&components) {
            *slot = component.parse().map_err(|e| {
                StanzaError::VersionError(format!(
                    "unknown or unsupported macOS version: {value:?} ({e})"
                ))
            })?;
        }
        let [major, minor, patch] = numbers;
        let parsed = semver::Version::new(major, minor, patch);

        Ok(Self {
            raw: raw.to_string(),
            parsed,
        })
    }

    pub fn from_codename(codename: MacOSCodename) -> Self {
        let (major, minor) = match codename.version_str().split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (codename.version_str(), "0"),
        };
        // The codename table only holds plain numeric versions.
        let parsed = semver::Version::new(
            major.parse().unwrap_or_default(),
            minor.parse().unwrap_or_default(),
            0,
        );
        Self {
            raw: codename.version_str().to_string(),
            parsed,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> u64 {
        self.parsed.major
    }

    pub fn minor(&self) -> u64 {
        self.parsed.minor
    }

    /// Drops the parts that do not identify a release: everything after the major
    /// version from Big Sur (11) onwards, everything after major.minor before it.
    pub fn strip_patch(&self) -> Self {
        let (raw, parsed) = if self.major() >= 11 {
            (
                self.major().to_string(),
                semver::Version::new(self.major(), 0, 0),
            )
        } else {
            (
                format!("{}.{}", self.major(), self.minor()),
                semver::Version::new(self.major(), self.minor(), 0),
            )
        };
        Self { raw, parsed }
    }

    /// Codename of the release this version belongs to, if it is a known one.
    pub fn codename(&self) -> Option<MacOSCodename> {
        let release = self.strip_patch();
        MacOSCodename::ALL
            .into_iter()
            .find(|c| c.version() == release)
    }
}

impl PartialEq for MacOSVersion {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl Eq for MacOSVersion {}

impl Hash for MacOSVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parsed.hash(state);
    }
}

impl PartialOrd for MacOSVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MacOSVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

impl fmt::Display for MacOSVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for MacOSVersion {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for MacOSVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
