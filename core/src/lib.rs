//! libtranscode-core
//!
//! Conversion engine between UTF-8, UTF-16, ASCII and URL-encoding. When two
//! encodings have no direct converter, the shortest chain of primitive
//! converters is found on a static encoding graph and composed into one
//! conversion, optionally restricted to lossless edges.
//!
//! Public API:
//! - `Encoding` / `Text` - the closed set of encodings and owned buffers
//! - `codepoint` - single code point UTF-8 / UTF-16 codec
//! - `convert` - base converters, borrowed and in-place variants
//! - `EncodingGraph` - immutable graph of base converters
//! - `find_route` / `Route` - breadth-first route search
//! - `Converter` / `Transcoder` - composed conversions with a route cache
//! - `Config` - engine defaults, loadable from TOML
//!
//! ```
//! use libtranscode_core::{convert, Encoding, Text};
//!
//! let units = Text::Units(vec![0x0024, 0x20AC]);
//! let bytes = convert(Encoding::Utf16, Encoding::Utf8, true, &units).unwrap();
//! assert_eq!(bytes.as_bytes(), Some(&[0x24, 0xE2, 0x82, 0xAC][..]));
//! ```
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub mod codepoint;

pub mod convert;
pub use convert::{BaseConverter, ASCII_SUBSTITUTE};

pub mod encoding;
pub use encoding::{Encoding, Text, UnitKind, UnknownEncodingError, ENCODING_COUNT};

pub mod engine;
pub use engine::{Converter, Transcoder};

pub mod error;
pub use error::{Result, TranscodeError};

pub mod graph;
pub use graph::{Edge, EncodingGraph};

pub mod path;
pub use path::{find_route, Route};

/// Engine configuration.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Restrict route search to lossless edges unless a call says otherwise.
    pub lossless_only: bool,

    /// Capacity of the route cache in `Transcoder`.
    /// 0 falls back to `Config::DEFAULT_CACHE_SIZE`.
    pub max_cache_size: usize,

    /// Source encoding used by tools when none is given.
    pub default_source: Encoding,

    /// Destination encoding used by tools when none is given.
    pub default_destination: Encoding,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lossless_only: true,
            // 4 x 4 pairs x 2 constraints fit with room to spare
            max_cache_size: Self::DEFAULT_CACHE_SIZE,
            default_source: Encoding::Utf8,
            default_destination: Encoding::Utf16,
        }
    }
}

impl Config {
    pub const DEFAULT_CACHE_SIZE: usize = 64;

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

static DEFAULT_TRANSCODER: Lazy<Transcoder> = Lazy::new(Transcoder::default);

/// Every supported encoding, in index order.
pub fn list_encodings() -> &'static [Encoding] {
    &Encoding::ALL
}

/// Convert `input` from `from` to `to` through the shared default transcoder.
///
/// The route is resolved before the input is looked at, so a missing route
/// fails with [`TranscodeError::NoConversionPath`] regardless of the data.
pub fn convert(from: Encoding, to: Encoding, lossless_only: bool, input: &Text) -> Result<Text> {
    DEFAULT_TRANSCODER.convert(from, to, lossless_only, input)
}

/// True iff a route from `from` to `to` exists under the constraint.
pub fn can_convert(from: Encoding, to: Encoding, lossless_only: bool) -> bool {
    DEFAULT_TRANSCODER.can_convert(from, to, lossless_only)
}
