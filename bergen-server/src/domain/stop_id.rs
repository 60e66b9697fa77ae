//! Stop identifier types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum accepted identifier length in bytes.
const MAX_LEN: usize = 64;

/// Prefix of the upstream station ("stop place") namespace.
const STATION_PREFIX: &str = "NSR:StopPlace:";

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// A validated stop identifier, e.g. `NSR:StopPlace:62356` or `NSR:Quay:7180`.
///
/// Only ASCII alphanumerics and `:` `_` `-` `.` are accepted, so a `StopId`
/// can never carry quoting or query syntax into an upstream request.
///
/// # Examples
///
/// ```
/// use bergen_server::domain::StopId;
///
/// let id = StopId::parse("NSR:StopPlace:62356").unwrap();
/// assert!(id.is_station());
///
/// let quay = StopId::parse("NSR:Quay:7180").unwrap();
/// assert!(!quay.is_station());
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("x\") { evil }").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(String);

impl StopId {
    /// Parse an identifier, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be blank",
            });
        }

        if s.len() > MAX_LEN {
            return Err(InvalidStopId {
                reason: "must be at most 64 bytes",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'-' | b'.'))
        {
            return Err(InvalidStopId {
                reason: "may only contain ASCII letters, digits, ':', '_', '-' and '.'",
            });
        }

        Ok(StopId(s.to_string()))
    }

    /// Whether this id lives in the upstream station namespace
    /// (`NSR:StopPlace:<digits>`), so it can be queried without a lookup.
    pub fn is_station(&self) -> bool {
        self.0
            .strip_prefix(STATION_PREFIX)
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for StopId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StopId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StopId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(StopId::parse("NSR:StopPlace:62356").is_ok());
        assert!(StopId::parse("NSR:Quay:7180").is_ok());
        assert!(StopId::parse("SKY:Line:20").is_ok());
        assert!(StopId::parse("abc_def-1.2").is_ok());
    }

    #[test]
    fn parse_trims_whitespace() {
        let id = StopId::parse("  NSR:Quay:1 ").unwrap();
        assert_eq!(id.as_str(), "NSR:Quay:1");
    }

    #[test]
    fn reject_blank() {
        assert!(StopId::parse("").is_err());
        assert!(StopId::parse("   ").is_err());
    }

    #[test]
    fn reject_query_syntax() {
        assert!(StopId::parse("NSR:StopPlace:1\"").is_err());
        assert!(StopId::parse("a) { __schema { types { name } } }").is_err());
        assert!(StopId::parse("a b").is_err());
        assert!(StopId::parse("Bergen busstasjon").is_err());
        assert!(StopId::parse("Åsane").is_err());
    }

    #[test]
    fn reject_too_long() {
        let long = "A".repeat(65);
        assert!(StopId::parse(&long).is_err());
        assert!(StopId::parse(&"A".repeat(64)).is_ok());
    }

    #[test]
    fn station_namespace() {
        assert!(StopId::parse("NSR:StopPlace:62356").unwrap().is_station());
        assert!(!StopId::parse("NSR:StopPlace:").unwrap().is_station());
        assert!(!StopId::parse("NSR:StopPlace:12a").unwrap().is_station());
        assert!(!StopId::parse("NSR:Quay:62356").unwrap().is_station());
        assert!(!StopId::parse("nsr:stopplace:1").unwrap().is_station());
    }

    #[test]
    fn serde_roundtrip_validates() {
        let id: StopId = serde_json::from_str("\"NSR:Quay:5\"").unwrap();
        assert_eq!(id.as_str(), "NSR:Quay:5");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"NSR:Quay:5\"");

        let bad: Result<StopId, _> = serde_json::from_str("\"a\\\"b\"");
        assert!(bad.is_err());
    }

    #[test]
    fn debug_and_display() {
        let id = StopId::parse("NSR:Quay:5").unwrap();
        assert_eq!(format!("{id}"), "NSR:Quay:5");
        assert_eq!(format!("{id:?}"), "StopId(NSR:Quay:5)");
    }
}
