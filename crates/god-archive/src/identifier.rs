//! Image identifiers
//!
//! An identifier such as `n01443537_22563.JPEG` names both the archive that
//! holds the image (its synset prefix, before the first `_`) and the archive
//! member itself (the whole identifier).

use crate::error::ArchiveError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between synset prefix and image suffix
pub const SYNSET_SEPARATOR: char = '_';

/// Synset-prefixed image identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageIdentifier {
    raw: String,
    synset_len: usize,
}

impl ImageIdentifier {
    /// Parse an identifier
    ///
    /// Surrounding whitespace is trimmed. An identifier without a separator is
    /// its own synset.
    ///
    /// # Errors
    /// Returns [`ArchiveError::InvalidIdentifier`] if the identifier is empty
    /// or the synset prefix is empty.
    pub fn parse(s: &str) -> Result<Self, ArchiveError> {
        let raw = s.trim();
        let synset_len = raw.find(SYNSET_SEPARATOR).unwrap_or(raw.len());
        if synset_len == 0 {
            return Err(ArchiveError::InvalidIdentifier(s.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            synset_len,
        })
    }

    /// Synset prefix, which selects the archive
    #[inline]
    #[must_use]
    pub fn synset(&self) -> &str {
        &self.raw[..self.synset_len]
    }

    /// Name of the archive member holding the image
    #[inline]
    #[must_use]
    pub fn member_name(&self) -> &str {
        &self.raw
    }

    /// Full identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Display for ImageIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ImageIdentifier {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ImageIdentifier {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl Serialize for ImageIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ImageIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
