//! Identifier types for the access controller
//!
//! This module contains the badge identifier read from a contactless credential
//! and the UUID-based correlation identifier attached to each processing cycle.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Errors produced when a raw reader value cannot be turned into a [`BadgeId`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BadgeIdError {
    /// Nothing left after trimming whitespace
    #[error("Badge identifier is empty")]
    Empty,

    /// A character outside the hexadecimal alphabet
    #[error("Badge identifier contains non-hex character '{0}'")]
    InvalidCharacter(char),

    /// Reader UIDs are whole bytes, so the hex form always has an even length
    #[error("Badge identifier has odd length {0}")]
    OddLength(usize),
}

/// Identifier of a contactless badge, normalized to uppercase hex
///
/// Equality between two `BadgeId`s is exact because both sides are normalized
/// on construction. Comparison against a configured identifier that did not go
/// through [`BadgeId::parse`] uses [`BadgeId::matches_ignore_case`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BadgeId(String);

impl BadgeId {
    /// Parse a badge identifier from text, trimming and uppercasing it
    pub fn parse(raw: &str) -> Result<Self, BadgeIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BadgeIdError::Empty);
        }
        if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(BadgeIdError::InvalidCharacter(bad));
        }
        if trimmed.len() % 2 != 0 {
            return Err(BadgeIdError::OddLength(trimmed.len()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Render raw UID bytes from the reader as two-digit uppercase hex
    pub fn from_uid_bytes(uid: &[u8]) -> Result<Self, BadgeIdError> {
        if uid.is_empty() {
            return Err(BadgeIdError::Empty);
        }
        let hex: String = uid.iter().map(|byte| format!("{:02X}", byte)).collect();
        Ok(Self(hex))
    }

    /// Case-insensitive comparison against an identifier from configuration
    pub fn matches_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }

    /// The normalized identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BadgeId {
    type Err = BadgeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BadgeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BadgeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BadgeId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Correlation identifier for one badge processing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanId(pub Uuid);

impl ScanId {
    /// Create a new random scan ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SCAN_{}", self.0.simple())
    }
}
