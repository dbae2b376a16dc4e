// stanza-common/src/config.rs
use std::env;

use tracing::debug;

use super::error::{Result, StanzaError};
use crate::model::{Arch, OsId};

pub const SIMULATE_OS_VAR: &str = "STANZA_SIMULATE_OS";
pub const SIMULATE_ARCH_VAR: &str = "STANZA_SIMULATE_ARCH";

/// Environment-derived settings. Both overrides seed the simulated system at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub simulate_os: Option<OsId>,
    pub simulate_arch: Option<Arch>,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading stanza configuration");
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        debug!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    /// Builds a config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let simulate_os = read(SIMULATE_OS_VAR)
            .map(|value| {
                value
                    .parse::<OsId>()
                    .and_then(OsId::ensure_simulatable)
                    .map_err(|e| StanzaError::Config(format!("{SIMULATE_OS_VAR}={value:?}: {e}")))
            })
            .transpose()?;

        let simulate_arch = read(SIMULATE_ARCH_VAR)
            .map(|value| {
                value
                    .parse::<Arch>()
                    .map_err(|e| StanzaError::Config(format!("{SIMULATE_ARCH_VAR}={value:?}: {e}")))
            })
            .transpose()?;

        if let Some(os) = simulate_os {
            debug!("{} requests simulated OS {}", SIMULATE_OS_VAR, os);
        }
        if let Some(arch) = simulate_arch {
            debug!("{} requests simulated arch {}", SIMULATE_ARCH_VAR, arch);
        }

        Ok(Self {
            simulate_os,
            simulate_arch,
        })
    }

    pub fn simulates_anything(&self) -> bool {
        self.simulate_os.is_some() || self.simulate_arch.is_some()
    }
}
