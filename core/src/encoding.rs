// core/src/encoding.rs
//
// The closed set of encodings the engine knows about, and the owned buffer
// type that carries text between converters.
//
// Indices are fixed: UTF-8 = 0, UTF-16 = 1, URL-encoding = 2, ASCII = 3.
// Route search iterates in this order, so it also decides tie-breaks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of encodings in the graph.
pub const ENCODING_COUNT: usize = 4;

/// A text encoding handled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Encoding {
    Utf8,
    Utf16,
    UrlEncode,
    Ascii,
}

impl Encoding {
    /// All encodings in ascending index order.
    pub const ALL: [Encoding; ENCODING_COUNT] = [
        Encoding::Utf8,
        Encoding::Utf16,
        Encoding::UrlEncode,
        Encoding::Ascii,
    ];

    /// Position of this encoding in the graph's dispatch table.
    pub const fn index(self) -> usize {
        match self {
            Encoding::Utf8 => 0,
            Encoding::Utf16 => 1,
            Encoding::UrlEncode => 2,
            Encoding::Ascii => 3,
        }
    }

    /// Inverse of [`Encoding::index`].
    pub fn from_index(index: usize) -> Option<Encoding> {
        Self::ALL.get(index).copied()
    }

    /// Canonical display name.
    pub const fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16 => "UTF-16",
            Encoding::UrlEncode => "URL-encoding",
            Encoding::Ascii => "ASCII",
        }
    }

    /// Accepted spellings besides the canonical name.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Encoding::Utf8 => &["utf8"],
            Encoding::Utf16 => &["utf16"],
            Encoding::UrlEncode => &["url", "urlencode", "url-encode", "percent"],
            Encoding::Ascii => &["us-ascii"],
        }
    }

    /// Width of one code unit in this encoding.
    pub const fn unit_kind(self) -> UnitKind {
        match self {
            Encoding::Utf16 => UnitKind::Wide,
            Encoding::Utf8 | Encoding::UrlEncode | Encoding::Ascii => UnitKind::Byte,
        }
    }

    /// Check if `name` refers to this encoding (case-insensitive).
    pub fn matches(self, name: &str) -> bool {
        let name = name.trim();
        self.name().eq_ignore_ascii_case(name)
            || self.aliases().iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when an encoding name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown encoding: {0}")]
pub struct UnknownEncodingError(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Encoding::ALL
            .into_iter()
            .find(|e| e.matches(s))
            .ok_or_else(|| UnknownEncodingError(s.to_string()))
    }
}

impl TryFrom<String> for Encoding {
    type Error = UnknownEncodingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Encoding> for &'static str {
    fn from(value: Encoding) -> Self {
        value.name()
    }
}

/// Code unit width: 8-bit bytes or 16-bit UTF-16 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Byte,
    Wide,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Byte => f.write_str("8-bit bytes"),
            UnitKind::Wide => f.write_str("16-bit units"),
        }
    }
}

/// An owned, in-memory encoded sequence.
///
/// The variant only records unit width; which encoding the data is in is
/// tracked by whoever holds it (the converter knows its source).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Text {
    Bytes(Vec<u8>),
    Units(Vec<u16>),
}

impl Text {
    /// UTF-8 bytes of a Rust string.
    pub fn from_str_utf8(s: &str) -> Self {
        Text::Bytes(s.as_bytes().to_vec())
    }

    /// UTF-16 units of a Rust string.
    pub fn from_utf16_str(s: &str) -> Self {
        Text::Units(s.encode_utf16().collect())
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Text::Bytes(_) => UnitKind::Byte,
            Text::Units(_) => UnitKind::Wide,
        }
    }

    /// Number of code units (bytes or 16-bit units).
    pub fn len(&self) -> usize {
        match self {
            Text::Bytes(b) => b.len(),
            Text::Units(u) => u.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Text::Bytes(b) => Some(b),
            Text::Units(_) => None,
        }
    }

    pub fn as_units(&self) -> Option<&[u16]> {
        match self {
            Text::Units(u) => Some(u),
            Text::Bytes(_) => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Text::Bytes(b) => Some(b),
            Text::Units(_) => None,
        }
    }

    pub fn into_units(self) -> Option<Vec<u16>> {
        match self {
            Text::Units(u) => Some(u),
            Text::Bytes(_) => None,
        }
    }
}

impl From<Vec<u8>> for Text {
    fn from(value: Vec<u8>) -> Self {
        Text::Bytes(value)
    }
}

impl From<&[u8]> for Text {
    fn from(value: &[u8]) -> Self {
        Text::Bytes(value.to_vec())
    }
}

impl From<Vec<u16>> for Text {
    fn from(value: Vec<u16>) -> Self {
        Text::Units(value)
    }
}

impl From<&[u16]> for Text {
    fn from(value: &[u16]) -> Self {
        Text::Units(value.to_vec())
    }
}
