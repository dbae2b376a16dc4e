// stanza-core/src/depends_on/arch.rs
//! Normalization of `depends_on arch:` tokens into architecture descriptors.
use stanza_common::error::{Result, StanzaError};
use stanza_common::model::{Arch, ArchSpec};
use tracing::trace;

/// Canonical token table. `intel` is the generic name, the rest are specific.
pub const VALID_ARCHES: [(&str, ArchSpec); 3] = [
    ("intel", ArchSpec::new(Arch::Intel, 64)),
    ("x86_64", ArchSpec::new(Arch::Intel, 64)),
    ("arm64", ArchSpec::new(Arch::Arm, 64)),
];

/// Lower-cases, drops one leading `:` and maps `-` to `_`.
pub fn normalize_token(token: &str) -> String {
    let lowered = token.to_lowercase();
    let stripped = lowered.strip_prefix(':').unwrap_or(&lowered);
    stripped.replace('-', "_")
}

fn lookup(normalized: &str) -> Option<ArchSpec> {
    VALID_ARCHES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, spec)| *spec)
}

pub fn normalize(token: &str) -> Result<ArchSpec> {
    let normalized = normalize_token(token);
    lookup(&normalized).ok_or(StanzaError::InvalidArchToken(vec![normalized]))
}

/// Normalizes every token, reporting all unknown ones in a single error.
pub fn normalize_all<I, S>(tokens: I) -> Result<Vec<ArchSpec>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut specs = Vec::new();
    let mut invalid = Vec::new();

    for token in tokens {
        let normalized = normalize_token(token.as_ref());
        match lookup(&normalized) {
            Some(spec) => {
                trace!("arch token {:?} -> {}", token.as_ref(), spec);
                specs.push(spec);
            }
            None => invalid.push(normalized),
        }
    }

    if invalid.is_empty() {
        Ok(specs)
    } else {
        Err(StanzaError::InvalidArchToken(invalid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_case_and_marker_variants() {
        let arm = ArchSpec::new(Arch::Arm, 64);
        assert_eq!(normalize("ARM64").unwrap(), arm);
        assert_eq!(normalize(":arm64").unwrap(), arm);
        assert_eq!(normalize("x86-64").unwrap(), ArchSpec::new(Arch::Intel, 64));
        assert_eq!(normalize(":Intel").unwrap(), ArchSpec::new(Arch::Intel, 64));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!(matches!(
            normalize("arm-64"),
            Err(StanzaError::InvalidArchToken(v)) if v == ["arm_64"]
        ));
        assert!(matches!(
            normalize("riscv"),
            Err(StanzaError::InvalidArchToken(v)) if v == ["riscv"]
        ));
    }

    #[test]
    fn reports_every_invalid_token_at_once() {
        let err = normalize_all(["arm64", "riscv", ":PPC", "intel"]).unwrap_err();
        assert!(matches!(err, StanzaError::InvalidArchToken(v) if v == ["riscv", "ppc"]));
    }

    #[test]
    fn keeps_order_and_duplicates() {
        let specs = normalize_all(["intel", "arm64", "x86_64"]).unwrap();
        let kinds: Vec<Arch> = specs.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, [Arch::Intel, Arch::Arm, Arch::Intel]);
    }
}
