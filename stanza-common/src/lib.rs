// stanza-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;

// Re-export key types
pub use config::Config;
pub use error::{Result, StanzaError};
pub use model::{Arch, ArchSpec, MacOSCodename, MacOSVersion, OsId, PlatformTag};
