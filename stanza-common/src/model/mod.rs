// src/model/mod.rs
// Declares the platform model shared by the stanza parser and the simulated system.
pub mod arch;
pub mod macos;
pub mod os;
pub mod tag;

// Re-export
pub use arch::{Arch, ArchSpec};
pub use macos::{MacOSCodename, MacOSVersion};
pub use os::OsId;
pub use tag::PlatformTag;
