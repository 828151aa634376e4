//! Station identity types.

use std::fmt;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// Longest identifier we accept. Real ids are 6-9 digit EVA numbers, but
/// the API also hands out longer location ids for addresses and POIs.
const MAX_ID_LEN: usize = 64;

/// A validated station identifier as used by the journey API.
///
/// In practice these are EVA numbers such as `8011160` (Berlin Hbf), but
/// the type only guarantees the id is non-empty, reasonably short and
/// contains no whitespace or control characters.
///
/// # Examples
///
/// ```
/// use split_server::domain::StationId;
///
/// let berlin = StationId::parse("8011160").unwrap();
/// assert_eq!(berlin.as_str(), "8011160");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("80 11160").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(String);

impl StationId {
    /// Parse a station id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_ID_LEN {
            return Err(InvalidStationId {
                reason: "too long",
            });
        }

        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidStationId {
                reason: "must not contain whitespace or control characters",
            });
        }

        Ok(StationId(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station: identity plus an optional human-readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub id: StationId,
    pub name: Option<String>,
}

impl Station {
    /// Create a station with a display name.
    pub fn new(id: StationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// Create a station known only by id.
    pub fn unnamed(id: StationId) -> Self {
        Self { id, name: None }
    }

    /// Name for display, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any run of digits parses and round-trips.
        #[test]
        fn digits_roundtrip(s in "[0-9]{1,12}") {
            let id = StationId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Inner whitespace is always rejected.
        #[test]
        fn inner_space_rejected(a in "[0-9]{1,6}", b in "[0-9]{1,6}") {
            let joined = format!("{a} {b}");
            prop_assert!(StationId::parse(&joined).is_err());
        }
    }
}
