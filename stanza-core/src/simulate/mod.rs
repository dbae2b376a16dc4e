// stanza-core/src/simulate/mod.rs
//! Evaluation platform that platform-conditional logic consults instead of the
//! real host. Overrides can be set outright or for the duration of a closure.
use stanza_common::config::Config;
use stanza_common::error::{Result, StanzaError};
use stanza_common::model::{Arch, OsId, PlatformTag};
use tracing::{debug, trace};

pub mod ambient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Overrides {
    os: Option<OsId>,
    arch: Option<Arch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    NoOverride,
    OsOverridden,
    ArchOverridden,
    BothOverridden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedSystem {
    overrides: Overrides,
    /// Reported by `current_os` while no OS override is active.
    baseline_os: OsId,
    host_arch: Arch,
}

impl Default for SimulatedSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSystem {
    /// No overrides; the OS reads as `generic` and the arch as the host CPU.
    pub fn new() -> Self {
        Self {
            overrides: Overrides::default(),
            baseline_os: OsId::Generic,
            host_arch: Arch::host(),
        }
    }

    /// Like [`SimulatedSystem::new`] but the OS reads as the compile target OS.
    pub fn for_host() -> Self {
        Self {
            baseline_os: OsId::host(),
            ..Self::new()
        }
    }

    /// Replaces the detected host CPU kind.
    pub fn with_host_arch(mut self, arch: Arch) -> Self {
        self.host_arch = arch;
        self
    }

    /// Starts from [`SimulatedSystem::new`] with the configured overrides applied.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut system = Self::new();
        system.apply_config(config)?;
        Ok(system)
    }

    pub fn apply_config(&mut self, config: &Config) -> Result<()> {
        if let Some(os) = config.simulate_os {
            self.set_os(os)?;
        }
        if let Some(arch) = config.simulate_arch {
            self.set_arch(arch)?;
        }
        Ok(())
    }

    /// The OS override, if any.
    pub fn os(&self) -> Option<OsId> {
        self.overrides.os
    }

    /// The arch override, if any.
    pub fn arch(&self) -> Option<Arch> {
        self.overrides.arch
    }

    pub fn state(&self) -> SimulationState {
        match (self.overrides.os, self.overrides.arch) {
            (None, None) => SimulationState::NoOverride,
            (Some(_), None) => SimulationState::OsOverridden,
            (None, Some(_)) => SimulationState::ArchOverridden,
            (Some(_), Some(_)) => SimulationState::BothOverridden,
        }
    }

    pub fn current_os(&self) -> OsId {
        self.overrides.os.unwrap_or(self.baseline_os)
    }

    pub fn current_arch(&self) -> Arch {
        self.overrides.arch.unwrap_or(self.host_arch)
    }

    pub fn current_tag(&self) -> PlatformTag {
        PlatformTag::new(self.current_os(), self.current_arch())
    }

    /// Accepts `macos`, `linux` or a macOS codename.
    pub fn set_os(&mut self, os: OsId) -> Result<()> {
        let os = os.ensure_simulatable()?;
        debug!("Simulating OS {}", os);
        self.overrides.os = Some(os);
        Ok(())
    }

    /// Accepts `intel` or `arm`.
    pub fn set_arch(&mut self, arch: Arch) -> Result<()> {
        let arch = arch.ensure_simulatable()?;
        debug!("Simulating arch {}", arch);
        self.overrides.arch = Some(arch);
        Ok(())
    }

    pub fn clear(&mut self) {
        debug!("Clearing simulated OS and arch");
        self.overrides = Overrides::default();
    }

    pub fn is_simulating_or_running_on_macos(&self) -> bool {
        self.current_os().is_macos()
    }

    pub fn is_simulating_or_running_on_linux(&self) -> bool {
        self.current_os().is_linux()
    }

    /// Runs `body` with the requested overrides applied, then restores the
    /// overrides that were active before the call, also when `body` panics.
    /// A requested value equal to the current one is left as is.
    pub fn with<T, F>(&mut self, os: Option<OsId>, arch: Option<Arch>, body: F) -> Result<T>
    where
        F: FnOnce(&mut SimulatedSystem) -> T,
    {
        check_scope_request(os, arch)?;
        let guard = RestoreOnDrop::new(self);
        guard.system.apply_scoped(os, arch)?;
        Ok(body(&mut *guard.system))
    }

    /// [`SimulatedSystem::with`] for the system and arch of `tag`.
    pub fn with_tag<T, F>(&mut self, tag: &PlatformTag, body: F) -> Result<T>
    where
        F: FnOnce(&mut SimulatedSystem) -> T,
    {
        check_tag(tag)?;
        self.with(Some(tag.system), Some(tag.arch), body)
    }

    pub(crate) fn snapshot(&self) -> Overrides {
        self.overrides
    }

    pub(crate) fn restore(&mut self, snapshot: Overrides) {
        if self.overrides != snapshot {
            trace!(
                "Restoring simulated system {:?} -> {:?}",
                self.overrides,
                snapshot
            );
        }
        self.overrides = snapshot;
    }

    pub(crate) fn apply_scoped(&mut self, os: Option<OsId>, arch: Option<Arch>) -> Result<()> {
        if let Some(os) = os.filter(|os| *os != self.current_os()) {
            self.set_os(os)?;
        }
        if let Some(arch) = arch.filter(|arch| *arch != self.current_arch()) {
            self.set_arch(arch)?;
        }
        Ok(())
    }
}

pub(crate) fn check_scope_request(os: Option<OsId>, arch: Option<Arch>) -> Result<()> {
    if os.is_none() && arch.is_none() {
        return Err(StanzaError::InvalidScopeRequest);
    }
    Ok(())
}

pub(crate) fn check_tag(tag: &PlatformTag) -> Result<()> {
    if tag.valid_combination() {
        Ok(())
    } else {
        Err(StanzaError::InvalidTag(tag.to_string()))
    }
}

struct RestoreOnDrop<'a> {
    system: &'a mut SimulatedSystem,
    snapshot: Overrides,
}

impl<'a> RestoreOnDrop<'a> {
    fn new(system: &'a mut SimulatedSystem) -> Self {
        let snapshot = system.snapshot();
        Self { system, snapshot }
    }
}

impl Drop for RestoreOnDrop<'_> {
    fn drop(&mut self) {
        self.system.restore(self.snapshot);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use stanza_common::model::MacOSCodename;

    use super::*;

    const SONOMA: OsId = OsId::Codename(MacOSCodename::Sonoma);

    #[test]
    fn defaults_to_generic_and_host_arch() {
        let system = SimulatedSystem::new().with_host_arch(Arch::Intel);
        assert_eq!(system.current_os(), OsId::Generic);
        assert_eq!(system.current_arch(), Arch::Intel);
        assert_eq!(system.state(), SimulationState::NoOverride);
        assert_eq!(
            system.current_tag(),
            PlatformTag::new(OsId::Generic, Arch::Intel)
        );
    }

    #[test]
    fn host_baseline_reports_target_os() {
        assert_eq!(SimulatedSystem::for_host().current_os(), OsId::host());
    }

    #[test]
    fn set_and_clear_move_through_states() {
        let mut system = SimulatedSystem::new();
        system.set_os(OsId::Linux).unwrap();
        assert_eq!(system.state(), SimulationState::OsOverridden);
        system.set_arch(Arch::Arm).unwrap();
        assert_eq!(system.state(), SimulationState::BothOverridden);
        system.clear();
        assert_eq!(system.state(), SimulationState::NoOverride);
        system.set_arch(Arch::Intel).unwrap();
        assert_eq!(system.state(), SimulationState::ArchOverridden);
    }

    #[test]
    fn rejects_values_outside_the_enumerations() {
        let mut system = SimulatedSystem::new();
        assert!(matches!(
            system.set_os(OsId::Generic),
            Err(StanzaError::InvalidOsValue(v)) if v == "generic"
        ));
        assert!(matches!(
            system.set_arch(Arch::Dunno),
            Err(StanzaError::InvalidArchValue(v)) if v == "dunno"
        ));
        assert_eq!(system.state(), SimulationState::NoOverride);
    }

    #[test]
    fn scoped_override_restores_on_panic() {
        let mut system = SimulatedSystem::new();
        system.set_arch(Arch::Intel).unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            system
                .with(Some(SONOMA), Some(Arch::Arm), |_| panic!("boom"))
                .map(|()| ())
        }));
        assert!(result.is_err());
        assert_eq!(system.os(), None);
        assert_eq!(system.arch(), Some(Arch::Intel));
    }

    #[test]
    fn scoped_override_restores_after_failed_apply() {
        let mut system = SimulatedSystem::new();
        let err = system
            .with(Some(OsId::Linux), Some(Arch::Dunno), |_| ())
            .unwrap_err();
        assert!(matches!(err, StanzaError::InvalidArchValue(_)));
        assert_eq!(system.state(), SimulationState::NoOverride);
    }

    #[test]
    fn equal_values_are_not_reapplied() {
        let mut system = SimulatedSystem::new().with_host_arch(Arch::Arm);
        let state = system
            .with(None, Some(Arch::Arm), |inner| inner.state())
            .unwrap();
        assert_eq!(state, SimulationState::NoOverride);

        // The generic baseline is never a valid override, but it is already current.
        let os = system.with(Some(OsId::Generic), None, |inner| inner.current_os());
        assert_eq!(os.unwrap(), OsId::Generic);
    }

    #[test]
    fn empty_scope_request_leaves_system_unchanged() {
        let mut system = SimulatedSystem::new();
        system.set_os(OsId::Linux).unwrap();
        let before = system.clone();

        let err = system
            .with(None, None, |_| unreachable!())
            .map(|()| ())
            .unwrap_err();
        assert!(matches!(err, StanzaError::InvalidScopeRequest));
        assert_eq!(system, before);
    }

    #[test]
    fn invalid_tag_leaves_system_unchanged() {
        let mut system = SimulatedSystem::new();
        system.set_arch(Arch::Intel).unwrap();
        let before = system.clone();

        let tag = PlatformTag::new(OsId::Codename(MacOSCodename::Mojave), Arch::Arm);
        let err = system.with_tag(&tag, |_| ()).unwrap_err();
        assert!(matches!(err, StanzaError::InvalidTag(t) if t == "arm64_mojave"));
        assert_eq!(system, before);
    }

    #[test]
    fn valid_tag_applies_and_restores() {
        let mut system = SimulatedSystem::new();
        let tag: PlatformTag = "arm64_sonoma".parse().unwrap();
        let seen = system.with_tag(&tag, |inner| inner.current_tag()).unwrap();
        assert_eq!(seen, tag);
        assert_eq!(system.state(), SimulationState::NoOverride);
    }

    #[test]
    fn body_may_mutate_within_scope() {
        let mut system = SimulatedSystem::new();
        system
            .with(Some(OsId::Linux), None, |inner| {
                inner.set_arch(Arch::Arm).unwrap();
                assert_eq!(inner.state(), SimulationState::BothOverridden);
            })
            .unwrap();
        assert_eq!(system.state(), SimulationState::NoOverride);
    }

    #[test]
    fn seeds_from_config() {
        let config = Config {
            simulate_os: Some(SONOMA),
            simulate_arch: Some(Arch::Arm),
        };
        let system = SimulatedSystem::from_config(&config).unwrap();
        assert_eq!(system.current_tag().to_string(), "arm64_sonoma");
    }
}
