// stanza-core/src/simulate/ambient.rs
//! A per-thread [`SimulatedSystem`] for code that cannot have one passed in.
//!
//! Each thread starts with no overrides. Nothing here is shared between
//! threads, so a scope opened on one thread is invisible to the others.
use std::cell::RefCell;

use stanza_common::config::Config;
use stanza_common::error::Result;
use stanza_common::model::{Arch, OsId, PlatformTag};

use super::{check_scope_request, check_tag, Overrides, SimulatedSystem, SimulationState};

thread_local! {
    static SYSTEM: RefCell<SimulatedSystem> = RefCell::new(SimulatedSystem::new());
}

fn read<T>(f: impl FnOnce(&SimulatedSystem) -> T) -> T {
    SYSTEM.with(|cell| f(&cell.borrow()))
}

fn write<T>(f: impl FnOnce(&mut SimulatedSystem) -> T) -> T {
    SYSTEM.with(|cell| f(&mut cell.borrow_mut()))
}

pub fn os() -> Option<OsId> {
    read(SimulatedSystem::os)
}

pub fn arch() -> Option<Arch> {
    read(SimulatedSystem::arch)
}

pub fn state() -> SimulationState {
    read(SimulatedSystem::state)
}

pub fn current_os() -> OsId {
    read(SimulatedSystem::current_os)
}

pub fn current_arch() -> Arch {
    read(SimulatedSystem::current_arch)
}

pub fn current_tag() -> PlatformTag {
    read(SimulatedSystem::current_tag)
}

pub fn set_os(os: OsId) -> Result<()> {
    write(|system| system.set_os(os))
}

pub fn set_arch(arch: Arch) -> Result<()> {
    write(|system| system.set_arch(arch))
}

pub fn clear() {
    write(SimulatedSystem::clear)
}

pub fn apply_config(config: &Config) -> Result<()> {
    write(|system| system.apply_config(config))
}

/// Replaces this thread's system, returning the previous one.
pub fn replace(system: SimulatedSystem) -> SimulatedSystem {
    SYSTEM.with(|cell| cell.replace(system))
}

pub fn is_simulating_or_running_on_macos() -> bool {
    read(SimulatedSystem::is_simulating_or_running_on_macos)
}

pub fn is_simulating_or_running_on_linux() -> bool {
    read(SimulatedSystem::is_simulating_or_running_on_linux)
}

/// Same contract as [`SimulatedSystem::with`]; `body` reaches the overridden
/// system through the functions of this module and may open nested scopes.
pub fn with<T, F>(os: Option<OsId>, arch: Option<Arch>, body: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    check_scope_request(os, arch)?;
    let _guard = RestoreAmbient(read(SimulatedSystem::snapshot));
    write(|system| system.apply_scoped(os, arch))?;
    Ok(body())
}

pub fn with_tag<T, F>(tag: &PlatformTag, body: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    check_tag(tag)?;
    with(Some(tag.system), Some(tag.arch), body)
}

struct RestoreAmbient(Overrides);

impl Drop for RestoreAmbient {
    fn drop(&mut self) {
        // Ignore the error raised when the thread-local is already torn down.
        let _ = SYSTEM.try_with(|cell| cell.borrow_mut().restore(self.0));
    }
}
