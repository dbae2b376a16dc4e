// stanza-core/src/lib.rs
pub mod depends_on;
pub mod simulate;

pub use depends_on::DependsOn;
pub use simulate::SimulatedSystem;
// Re-export common types so downstream crates rarely need stanza-common directly
pub use stanza_common::error::{Result, StanzaError};
pub use stanza_common::model::{Arch, ArchSpec, MacOSCodename, MacOSVersion, OsId, PlatformTag};
