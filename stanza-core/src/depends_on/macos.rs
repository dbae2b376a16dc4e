// stanza-core/src/depends_on/macos.rs
//! `depends_on macos:` constraints.
//!
//! A declaration is a list of tokens. The list is classified into exactly one
//! [`TokenForm`], checked in this order:
//!
//! 1. several tokens: an explicit set of acceptable releases, compared with `==`
//! 2. one known codename (`:big_sur` or `big_sur`): `== codename`
//! 3. `<comparator>:<codename>`, e.g. `>= :monterey`
//! 4. `<comparator><literal>`, e.g. `<11.0`
//! 5. anything else: `== literal`
//!
//! Comparators are `<`, `>`, `<=`, `>=`, `==` and `=` (an alias of `==`).
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use stanza_common::error::{Result, StanzaError};
use stanza_common::model::{MacOSCodename, MacOSVersion};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Comparator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

/// Longest spellings first so `<=` is never read as `<`.
const COMPARATOR_PREFIXES: [(&str, Comparator); 6] = [
    ("<=", Comparator::Le),
    (">=", Comparator::Ge),
    ("==", Comparator::Eq),
    ("<", Comparator::Lt),
    (">", Comparator::Gt),
    ("=", Comparator::Eq),
];

impl Comparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Lt => "<",
            Comparator::Gt => ">",
            Comparator::Le => "<=",
            Comparator::Ge => ">=",
        }
    }

    /// Evaluates `lhs <comparator> rhs`.
    pub fn compare<T: Ord + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        let ordering = lhs.cmp(rhs);
        match self {
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Gt => ordering == Ordering::Greater,
            Comparator::Le => ordering != Ordering::Greater,
            Comparator::Ge => ordering != Ordering::Less,
        }
    }

    /// Splits a leading comparator off `input`, returning it with the rest of the string.
    fn split_prefix(input: &str) -> Option<(Self, &str)> {
        COMPARATOR_PREFIXES
            .iter()
            .find_map(|(text, cmp)| input.strip_prefix(text).map(|rest| (*cmp, rest)))
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self> {
        match Self::split_prefix(s.trim()) {
            Some((cmp, "")) => Ok(cmp),
            _ => Err(StanzaError::ParseError(
                "comparator",
                format!("unknown comparator {s:?}"),
            )),
        }
    }
}

/// One release named by a constraint, as it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionValue {
    Codename(MacOSCodename),
    Literal(MacOSVersion),
}

impl VersionValue {
    /// A known codename (with or without `:`), otherwise a strict literal version.
    fn from_token(token: &str) -> Result<Self> {
        match MacOSCodename::lookup(token.trim()) {
            Some(codename) => Ok(VersionValue::Codename(codename)),
            None => MacOSVersion::parse(token).map(VersionValue::Literal),
        }
    }

    pub fn version(&self) -> MacOSVersion {
        match self {
            VersionValue::Codename(codename) => codename.version(),
            VersionValue::Literal(version) => version.clone(),
        }
    }
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionValue::Codename(codename) => write!(f, ":{codename}"),
            VersionValue::Literal(version) => write!(f, "{version}"),
        }
    }
}

impl Serialize for VersionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Operand of a constraint: a single release or an explicit list of releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequiredVersion {
    One(VersionValue),
    AnyOf(Vec<VersionValue>),
}

impl fmt::Display for RequiredVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredVersion::One(value) => write!(f, "{value}"),
            RequiredVersion::AnyOf(values) => {
                let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

/// A parsed `depends_on macos:` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacOSRequirement {
    comparator: Comparator,
    version: RequiredVersion,
}

impl MacOSRequirement {
    pub fn new(comparator: Comparator, version: RequiredVersion) -> Self {
        Self {
            comparator,
            version,
        }
    }

    /// Parses declaration tokens. Version construction failures become
    /// `InvalidVersionValue` carrying the underlying message.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let form = TokenForm::classify(tokens)?;
        trace!("depends_on macos tokens classified as {:?}", form);
        form.build().map_err(|e| match e {
            StanzaError::VersionError(msg) => StanzaError::InvalidVersionValue(msg),
            other => other,
        })
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn version(&self) -> &RequiredVersion {
        &self.version
    }

    /// Whether a machine running `host` meets the constraint. Both sides are
    /// reduced to their release (`14.2.1` counts as `14`, `10.15.7` as `10.15`).
    pub fn satisfied_by(&self, host: &MacOSVersion) -> bool {
        let host = host.strip_patch();
        let check = |value: &VersionValue| {
            self.comparator
                .compare(&host, &value.version().strip_patch())
        };
        match &self.version {
            RequiredVersion::One(value) => check(value),
            RequiredVersion::AnyOf(values) => values.iter().any(check),
        }
    }
}

impl fmt::Display for MacOSRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "macOS {} {}", self.comparator, self.version)
    }
}

/// The shape of a token list, one variant per accepted grammar.
#[derive(Debug, PartialEq, Eq)]
enum TokenForm<'a> {
    AlternativeSet(Vec<&'a str>),
    BareCodename(MacOSCodename),
    ComparedCodename(Comparator, &'a str),
    ComparedLiteral(Comparator, &'a str),
    Fallback(&'a str),
}

impl<'a> TokenForm<'a> {
    fn classify<S: AsRef<str>>(tokens: &'a [S]) -> Result<Self> {
        let first = match tokens {
            [] => {
                return Err(StanzaError::InvalidVersionValue(
                    "no macOS version given".to_string(),
                ))
            }
            [only] => only.as_ref(),
            many => {
                return Ok(TokenForm::AlternativeSet(
                    many.iter().map(|token| token.as_ref()).collect(),
                ))
            }
        };

        if let Some(codename) = MacOSCodename::lookup(first.trim()) {
            return Ok(TokenForm::BareCodename(codename));
        }

        if let Some((cmp, operand)) = Self::compared_operand(first) {
            return Ok(match operand.strip_prefix(':') {
                Some(codename) if !codename.is_empty() => {
                    TokenForm::ComparedCodename(cmp, codename)
                }
                Some(_) => TokenForm::Fallback(first),
                None => TokenForm::ComparedLiteral(cmp, operand),
            });
        }

        Ok(TokenForm::Fallback(first))
    }

    /// `<comparator> <operand>` with optional surrounding whitespace and an
    /// operand made of a single non-blank word.
    fn compared_operand(token: &str) -> Option<(Comparator, &str)> {
        let (cmp, rest) = Comparator::split_prefix(token.trim())?;
        let operand = rest.trim_start();
        if operand.is_empty() || operand.contains(char::is_whitespace) {
            return None;
        }
        Some((cmp, operand))
    }

    fn build(self) -> Result<MacOSRequirement> {
        let (comparator, version) = match self {
            TokenForm::AlternativeSet(tokens) => {
                let values = tokens
                    .into_iter()
                    .map(VersionValue::from_token)
                    .collect::<Result<Vec<_>>>()?;
                (Comparator::Eq, RequiredVersion::AnyOf(values))
            }
            TokenForm::BareCodename(codename) => (
                Comparator::Eq,
                RequiredVersion::One(VersionValue::Codename(codename)),
            ),
            TokenForm::ComparedCodename(cmp, name) => (
                cmp,
                RequiredVersion::One(VersionValue::Codename(name.parse()?)),
            ),
            TokenForm::ComparedLiteral(cmp, literal) => (
                cmp,
                RequiredVersion::One(VersionValue::Literal(MacOSVersion::parse(literal)?)),
            ),
            TokenForm::Fallback(raw) => (
                Comparator::Eq,
                RequiredVersion::One(VersionValue::Literal(MacOSVersion::parse(raw)?)),
            ),
        };
        Ok(MacOSRequirement::new(comparator, version))
    }
}
