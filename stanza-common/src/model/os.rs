// ===== stanza-common/src/model/os.rs =====
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Result, StanzaError};
use crate::model::macos::{MacOSCodename, MacOSVersion};

/// Operating system identifier used by platform-conditional logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsId {
    /// No assumption made about the operating system.
    Generic,
    /// Any macOS release.
    Macos,
    Linux,
    /// A specific macOS release.
    Codename(MacOSCodename),
}

impl OsId {
    /// Operating system this binary was compiled for, `Generic` elsewhere.
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            OsId::Macos
        } else if cfg!(target_os = "linux") {
            OsId::Linux
        } else {
            OsId::Generic
        }
    }

    pub fn is_macos(self) -> bool {
        matches!(self, OsId::Macos | OsId::Codename(_))
    }

    pub fn is_linux(self) -> bool {
        self == OsId::Linux
    }

    pub fn codename(self) -> Option<MacOSCodename> {
        match self {
            OsId::Codename(codename) => Some(codename),
            _ => None,
        }
    }

    /// Release version when the identifier names a specific macOS release.
    pub fn macos_version(self) -> Option<MacOSVersion> {
        self.codename().map(MacOSCodename::version)
    }

    /// Returns `self` if it may be used as an override, otherwise `InvalidOsValue`.
    pub fn ensure_simulatable(self) -> Result<Self> {
        match self {
            OsId::Generic => Err(StanzaError::InvalidOsValue(self.to_string())),
            _ => Ok(self),
        }
    }
}

impl From<MacOSCodename> for OsId {
    fn from(codename: MacOSCodename) -> Self {
        OsId::Codename(codename)
    }
}

impl fmt::Display for OsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsId::Generic => f.write_str("generic"),
            OsId::Macos => f.write_str("macos"),
            OsId::Linux => f.write_str("linux"),
            OsId::Codename(codename) => f.write_str(codename.as_str()),
        }
    }
}

impl FromStr for OsId {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let name = name.strip_prefix(':').unwrap_or(name);
        match name {
            "generic" => Ok(OsId::Generic),
            "macos" => Ok(OsId::Macos),
            "linux" => Ok(OsId::Linux),
            other => MacOSCodename::lookup(other)
                .map(OsId::Codename)
                .ok_or_else(|| StanzaError::InvalidOsValue(s.to_string())),
        }
    }
}

impl Serialize for OsId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
