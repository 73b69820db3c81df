//! Protocol identifiers with semantic-version constraints.
//!
//! A protocol string looks like `/echo/1.0.0` or `/echo`. The trailing
//! `major.minor.patch` segment, when present, is split off as the version
//! and the rest is the protocol name. Two protocols are compatible when
//! their names are equal and their versions satisfy each other's
//! constraints (see [`SemVerProtocol::matches`]).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors from parsing a protocol string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolParseError {
    #[error("protocol string '{0}' is too short")]
    TooShort(String),

    /// The trailing segment looked like a version but was not `N.N.N`
    #[error("malformed version '{version}' in protocol string '{input}'")]
    MalformedVersion { input: String, version: String },

    /// A bare version string that is not `N.N.N`
    #[error("invalid version '{0}'")]
    InvalidVersion(String),
}

/// A concrete `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ProtocolVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ProtocolVersion {
    type Err = ProtocolParseError;

    /// Exactly three dot-separated runs of ASCII digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolParseError::InvalidVersion(s.to_string());
        let mut parts = s.split('.');
        let mut next = || -> Result<u64, ProtocolParseError> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

/// How strictly a declared version must match a peer's version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionConstraint {
    /// All three components equal
    Exact(ProtocolVersion),
    /// Major equal
    From(ProtocolVersion),
    /// Major and minor equal
    UpToNextMinor(ProtocolVersion),
    /// Major equal
    UpToNextMajor(ProtocolVersion),
}

impl VersionConstraint {
    /// The concrete version this constraint was declared with.
    pub fn version(&self) -> ProtocolVersion {
        match *self {
            VersionConstraint::Exact(v)
            | VersionConstraint::From(v)
            | VersionConstraint::UpToNextMinor(v)
            | VersionConstraint::UpToNextMajor(v) => v,
        }
    }

    pub fn accepts(&self, other: &ProtocolVersion) -> bool {
        match self {
            VersionConstraint::Exact(v) => v == other,
            VersionConstraint::From(v) | VersionConstraint::UpToNextMajor(v) => v.major == other.major,
            VersionConstraint::UpToNextMinor(v) => v.major == other.major && v.minor == other.minor,
        }
    }
}

/// A protocol name plus an optional version constraint.
///
/// Derived equality is structural and is what protocol sets use for
/// membership. Negotiation compatibility is [`SemVerProtocol::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemVerProtocol {
    name: String,
    version: Option<VersionConstraint>,
}

impl SemVerProtocol {
    /// Build a protocol, prefixing the name with `/` if it lacks one.
    pub fn new(name: impl Into<String>, version: Option<VersionConstraint>) -> Self {
        let name = name.into();
        let name = if name.starts_with('/') { name } else { format!("/{name}") };
        Self { name, version }
    }

    /// Shorthand for a protocol requiring `version` exactly.
    pub fn exact(name: impl Into<String>, version: ProtocolVersion) -> Self {
        Self::new(name, Some(VersionConstraint::Exact(version)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&VersionConstraint> {
        self.version.as_ref()
    }

    /// Whether two protocols are compatible.
    ///
    /// Names must be equal. Unversioned only matches unversioned. When both
    /// carry versions it is enough for either side's constraint to accept
    /// the other side's version.
    pub fn matches(&self, other: &SemVerProtocol) -> bool {
        if self.name != other.name {
            return false;
        }
        match (&self.version, &other.version) {
            (None, None) => true,
            (Some(a), Some(b)) => a.accepts(&b.version()) || b.accepts(&a.version()),
            _ => false,
        }
    }
}

impl fmt::Display for SemVerProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}/{}", self.name, v.version()),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for SemVerProtocol {
    type Err = ProtocolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() < 2 {
            return Err(ProtocolParseError::TooShort(s.to_string()));
        }
        let trimmed = s.strip_prefix('/').unwrap_or(s);
        let mut segments: Vec<&str> = trimmed.split('/').filter(|seg| !seg.is_empty()).collect();

        let mut version = None;
        if let Some(last) = segments.last().copied().filter(|seg| seg.contains('.')) {
            let parsed = last.parse::<ProtocolVersion>().map_err(|_| {
                ProtocolParseError::MalformedVersion {
                    input: s.to_string(),
                    version: last.to_string(),
                }
            })?;
            version = Some(VersionConstraint::Exact(parsed));
            segments.pop();
        }

        Ok(Self {
            name: format!("/{}", segments.join("/")),
            version,
        })
    }
}

/// Parse two protocol strings and report whether they match.
pub fn match_protocols(a: &str, b: &str) -> Result<bool, ProtocolParseError> {
    let a: SemVerProtocol = a.parse()?;
    let b: SemVerProtocol = b.parse()?;
    Ok(a.matches(&b))
}

/// First locally supported protocol that matches any of the offered ones.
pub fn negotiate<'a>(
    supported: &'a [SemVerProtocol],
    offered: &[SemVerProtocol],
) -> Option<&'a SemVerProtocol> {
    supported
        .iter()
        .find(|local| offered.iter().any(|remote| local.matches(remote)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> SemVerProtocol {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_versioned() {
        let proto = p("/echo/1.2.3");
        assert_eq!(proto.name(), "/echo");
        assert_eq!(
            proto.version(),
            Some(&VersionConstraint::Exact(ProtocolVersion::new(1, 2, 3)))
        );
    }

    #[test]
    fn test_parse_multi_segment_name() {
        let proto = p("/ipfs/kad/1.0.0");
        assert_eq!(proto.name(), "/ipfs/kad");
        assert_eq!(proto.to_string(), "/ipfs/kad/1.0.0");
    }

    #[test]
    fn test_parse_unversioned() {
        let proto = p("/echo");
        assert_eq!(proto.name(), "/echo");
        assert_eq!(proto.version(), None);
        assert_eq!(p("echo").name(), "/echo");
    }

    #[test]
    fn test_parse_rejects_short_input() {
        assert!(matches!("".parse::<SemVerProtocol>(), Err(ProtocolParseError::TooShort(_))));
        assert!(matches!("/".parse::<SemVerProtocol>(), Err(ProtocolParseError::TooShort(_))));
    }

    #[test]
    fn test_parse_malformed_version_is_failure() {
        for bad in ["/foo/1.x.0", "/foo/1.2", "/foo/1.2.3.4", "/foo/1..3", "/foo/-1.0.0", "/foo/+1.0.0"] {
            assert!(
                matches!(bad.parse::<SemVerProtocol>(), Err(ProtocolParseError::MalformedVersion { .. })),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn test_bare_version_parse_errors() {
        assert_eq!("1.2.3".parse::<ProtocolVersion>(), Ok(ProtocolVersion::new(1, 2, 3)));
        for bad in ["1.2", "1.2.3.4", "1.x.0", "", "1..3"] {
            assert_eq!(
                bad.parse::<ProtocolVersion>(),
                Err(ProtocolParseError::InvalidVersion(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_match_truth_table() {
        assert!(match_protocols("/echo/1.0.0", "/echo/1.0.0").unwrap());
        assert!(!match_protocols("/echo/1.0.0", "/echo/1.2.0").unwrap());
        assert!(!match_protocols("/echo", "/echo/1.0.0").unwrap());
        assert!(!match_protocols("/echo/1.0.0", "/echo").unwrap());
        assert!(match_protocols("/echo", "/echo").unwrap());
        assert!(!match_protocols("/echo/1.0.0", "/ping/1.0.0").unwrap());
        assert!(!match_protocols("/Echo", "/echo").unwrap());
    }

    #[test]
    fn test_up_to_next_minor() {
        let c = VersionConstraint::UpToNextMinor(ProtocolVersion::new(1, 2, 0));
        assert!(c.accepts(&ProtocolVersion::new(1, 2, 9)));
        assert!(!c.accepts(&ProtocolVersion::new(1, 3, 0)));
    }

    #[test]
    fn test_from_and_up_to_next_major() {
        for c in [
            VersionConstraint::From(ProtocolVersion::new(2, 1, 0)),
            VersionConstraint::UpToNextMajor(ProtocolVersion::new(2, 1, 0)),
        ] {
            assert!(c.accepts(&ProtocolVersion::new(2, 0, 0)));
            assert!(c.accepts(&ProtocolVersion::new(2, 9, 9)));
            assert!(!c.accepts(&ProtocolVersion::new(3, 0, 0)));
        }
    }

    #[test]
    fn test_either_side_constraint_is_enough() {
        let loose = SemVerProtocol::new("/echo", Some(VersionConstraint::UpToNextMajor(ProtocolVersion::new(1, 0, 0))));
        let strict = SemVerProtocol::exact("/echo", ProtocolVersion::new(1, 4, 2));
        assert!(loose.matches(&strict));
        assert!(strict.matches(&loose));
    }

    #[test]
    fn test_new_normalizes_slash() {
        let proto = SemVerProtocol::exact("echo", ProtocolVersion::new(1, 0, 0));
        assert_eq!(proto.name(), "/echo");
        assert_eq!(proto.to_string(), "/echo/1.0.0");
    }

    #[test]
    fn test_negotiate_picks_first_supported() {
        let supported = vec![p("/yamux/1.0.0"), p("/mplex/6.7.0")];
        let offered = vec![p("/mplex/6.7.0"), p("/yamux/1.0.0")];
        assert_eq!(negotiate(&supported, &offered), Some(&supported[0]));

        let none_offered = vec![p("/yamux/2.0.0")];
        assert_eq!(negotiate(&supported, &none_offered), None);
    }
}
