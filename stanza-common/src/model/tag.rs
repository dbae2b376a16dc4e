// ===== stanza-common/src/model/tag.rs =====
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Result, StanzaError};
use crate::model::arch::Arch;
use crate::model::macos::MacOSCodename;
use crate::model::os::OsId;

/// The `{system, arch}` pair identifying a build/bottle target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTag {
    pub system: OsId,
    pub arch: Arch,
}

impl PlatformTag {
    pub const fn new(system: OsId, arch: Arch) -> Self {
        Self { system, arch }
    }

    /// Big Sur is the first macOS release that runs on ARM.
    pub fn valid_combination(&self) -> bool {
        if self.arch != Arch::Arm {
            return true;
        }
        match self.system.macos_version() {
            Some(version) => version >= MacOSCodename::BigSur.version(),
            None => true,
        }
    }

    pub fn standardized_arch(&self) -> &'static str {
        self.arch.standardized()
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intel macOS bottles are tagged by release name alone.
        if self.system.codename().is_some() && self.arch == Arch::Intel {
            write!(f, "{}", self.system)
        } else {
            write!(f, "{}_{}", self.standardized_arch(), self.system)
        }
    }
}

impl FromStr for PlatformTag {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        let parse_os = |name: &str| -> Result<OsId> {
            name.parse::<OsId>().map_err(|_| {
                StanzaError::ParseError("platform tag", format!("unknown system in {value:?}"))
            })
        };

        for arch in Arch::SIMULATABLE {
            let prefix = format!("{}_", arch.standardized());
            if let Some(system) = value.strip_prefix(&prefix) {
                return Ok(Self::new(parse_os(system)?, arch));
            }
        }
        Ok(Self::new(parse_os(value)?, Arch::Intel))
    }
}

impl Serialize for PlatformTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
