// stanza-core/src/depends_on/mod.rs
//! The `depends_on` stanza of a formula or cask definition.
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use stanza_common::error::{Result, StanzaError};
use stanza_common::model::{Arch, ArchSpec, OsId, PlatformTag};
use tracing::debug;

pub mod arch;
pub mod macos;

pub use macos::{Comparator, MacOSRequirement, RequiredVersion, VersionValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependsOnKey {
    Formula,
    Cask,
    Macos,
    Arch,
}

impl DependsOnKey {
    pub const ALL: [DependsOnKey; 4] = [
        DependsOnKey::Formula,
        DependsOnKey::Cask,
        DependsOnKey::Macos,
        DependsOnKey::Arch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DependsOnKey::Formula => "formula",
            DependsOnKey::Cask => "cask",
            DependsOnKey::Macos => "macos",
            DependsOnKey::Arch => "arch",
        }
    }
}

impl fmt::Display for DependsOnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependsOnKey {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| StanzaError::InvalidKey(s.to_string()))
    }
}

/// Accumulated `depends_on` declarations of one formula or cask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependsOn {
    formula: Vec<String>,
    cask: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    macos: Option<MacOSRequirement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    arch: Vec<ArchSpec>,
}

impl DependsOn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `(key, values)` pairs in order. The first invalid key or value
    /// aborts the call; pairs applied before it stay applied.
    pub fn declare<I, K, V, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (key, values) in fields {
            let key: DependsOnKey = key.as_ref().parse()?;
            let values: Vec<S> = values.into_iter().collect();
            self.declare_one(key, values.as_slice())?;
        }
        Ok(())
    }

    fn declare_one<S: AsRef<str>>(&mut self, key: DependsOnKey, values: &[S]) -> Result<()> {
        let names = || values.iter().map(|v| v.as_ref().to_string());
        match key {
            DependsOnKey::Formula => self.formula.extend(names()),
            DependsOnKey::Cask => self.cask.extend(names()),
            DependsOnKey::Macos => {
                if self.macos.is_some() {
                    return Err(StanzaError::DuplicateConstraint);
                }
                let requirement = MacOSRequirement::parse(values)?;
                debug!("depends_on macos: {}", requirement);
                self.macos = Some(requirement);
            }
            DependsOnKey::Arch => {
                let specs = arch::normalize_all(values)?;
                debug!("depends_on arch: {} value(s)", specs.len());
                self.arch.extend(specs);
            }
        }
        Ok(())
    }

    /// Declares a stanza written as a JSON object. Values may be a string or a
    /// list; `macos` also takes the API map form (`{">=": ["10.15"]}`) and `arch`
    /// also takes `{"type": "arm", "bits": 64}` objects.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut depends_on = Self::new();
        depends_on.declare_json(value)?;
        Ok(depends_on)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json(&value)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        debug!("Loading depends_on stanza from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn declare_json(&mut self, value: &Value) -> Result<()> {
        let fields = value.as_object().ok_or_else(|| {
            StanzaError::ParseError("depends_on", format!("expected a JSON object, got {value}"))
        })?;
        for (name, raw) in fields {
            let key: DependsOnKey = name.parse()?;
            let tokens = json_tokens(key, raw)?;
            self.declare_one(key, tokens.as_slice())?;
        }
        Ok(())
    }

    pub fn formula(&self) -> &[String] {
        &self.formula
    }

    pub fn cask(&self) -> &[String] {
        &self.cask
    }

    pub fn macos(&self) -> Option<&MacOSRequirement> {
        self.macos.as_ref()
    }

    pub fn arch(&self) -> &[ArchSpec] {
        &self.arch
    }

    pub fn is_empty(&self) -> bool {
        self.formula.is_empty()
            && self.cask.is_empty()
            && self.macos.is_none()
            && self.arch.is_empty()
    }

    pub fn is_present(&self) -> bool {
        !self.is_empty()
    }

    /// True when no arch is required or `arch` is one of the required kinds.
    pub fn arch_satisfied_by(&self, arch: Arch) -> bool {
        self.arch.is_empty() || self.arch.iter().any(|spec| spec.kind == arch)
    }

    /// True when no macOS constraint exists or `os` meets it. An unversioned
    /// `macos` is assumed to meet any constraint; other systems never do.
    pub fn macos_satisfied_by(&self, os: OsId) -> bool {
        let Some(requirement) = &self.macos else {
            return true;
        };
        match os {
            OsId::Codename(codename) => requirement.satisfied_by(&codename.version()),
            OsId::Macos => true,
            OsId::Linux | OsId::Generic => false,
        }
    }

    pub fn satisfied_on(&self, tag: &PlatformTag) -> bool {
        self.arch_satisfied_by(tag.arch) && self.macos_satisfied_by(tag.system)
    }
}

fn expect_str<'v>(key: DependsOnKey, value: &'v Value) -> Result<&'v str> {
    value.as_str().ok_or_else(|| {
        StanzaError::ParseError(
            "depends_on",
            format!("'{key}' expects strings, got {value}"),
        )
    })
}

/// A single string or a list of strings.
fn string_list(key: DependsOnKey, raw: &Value) -> Result<Vec<String>> {
    match raw {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| expect_str(key, item).map(str::to_string))
            .collect(),
        other => Err(StanzaError::ParseError(
            "depends_on",
            format!("unsupported value for '{key}': {other}"),
        )),
    }
}

fn json_tokens(key: DependsOnKey, raw: &Value) -> Result<Vec<String>> {
    match (key, raw) {
        (DependsOnKey::Arch, Value::Array(items)) => arch_tokens(items),
        (DependsOnKey::Macos, Value::Object(map)) => macos_map_tokens(map),
        _ => string_list(key, raw),
    }
}

/// Strings and cask-API objects mixed in one list. Every unknown token and
/// every unsupported object is reported together.
fn arch_tokens(items: &[Value]) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut invalid = Vec::new();

    for item in items {
        let token = match item {
            Value::Object(spec) => arch_spec_token(item, spec)?,
            other => Some(expect_str(DependsOnKey::Arch, other)?.to_string()),
        };
        match token {
            Some(token) if arch::normalize(&token).is_ok() => tokens.push(token),
            Some(token) => invalid.push(arch::normalize_token(&token)),
            None => invalid.push(item.to_string()),
        }
    }

    if invalid.is_empty() {
        Ok(tokens)
    } else {
        Err(StanzaError::InvalidArchToken(invalid))
    }
}

/// `{"type": "arm", "bits": 64}` as emitted by the cask API. Only 64-bit
/// descriptors exist, so any other `bits` yields `None`.
fn arch_spec_token(
    item: &Value,
    spec: &serde_json::Map<String, Value>,
) -> Result<Option<String>> {
    let Some(kind) = spec.get("type").and_then(Value::as_str) else {
        return Err(StanzaError::ParseError(
            "depends_on",
            format!("arch object without a \"type\": {item}"),
        ));
    };
    match spec.get("bits") {
        None => {}
        Some(bits) if bits.as_u64() == Some(64) => {}
        Some(_) => return Ok(None),
    }
    Ok(Some(match kind {
        "arm" => "arm64".to_string(),
        other => other.to_string(),
    }))
}

/// `{"<comparator>": [versions]}`; several versions are only allowed with `==`.
fn macos_map_tokens(map: &serde_json::Map<String, Value>) -> Result<Vec<String>> {
    let mut entries = map.iter();
    let (Some((comparator, versions)), None) = (entries.next(), entries.next()) else {
        return Err(StanzaError::ParseError(
            "depends_on",
            format!("'macos' map needs exactly one comparator, got {}", map.len()),
        ));
    };

    let versions = string_list(DependsOnKey::Macos, versions)?;
    if versions.len() == 1 {
        return Ok(vec![format!("{comparator}{}", versions[0])]);
    }
    if versions.len() > 1 && comparator.parse::<Comparator>()? == Comparator::Eq {
        return Ok(versions);
    }
    Err(StanzaError::InvalidVersionValue(format!(
        "'{comparator}' needs exactly one version, got {versions:?}"
    )))
}
