//! Error types for libtranscode-core.
//!
//! Every failure is terminal: a conversion either completes or stops at the
//! first malformed unit and returns one of these, never partial output.
//!
//! Two families:
//! - Structural: no route between the requested encodings, or the caller
//!   handed over the wrong kind of buffer. Known before any data is touched.
//! - Data validity: the input is not well-formed in its source encoding.

use thiserror::Error;

use crate::encoding::{Encoding, UnitKind};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TranscodeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    /// A multi-unit sequence ends before its declared length.
    #[error("truncated sequence at offset {offset}: expected {expected} units, {available} available")]
    TruncatedSequence {
        offset: usize,
        expected: usize,
        available: usize,
    },

    /// A UTF-8 lead byte that starts no known sequence length.
    #[error("invalid UTF-8 lead byte {byte:#04x} at offset {offset}")]
    InvalidLeadByte { offset: usize, byte: u8 },

    /// A UTF-8 continuation byte without the `10` high bits.
    #[error("invalid UTF-8 continuation byte {byte:#04x} at offset {offset}")]
    InvalidContinuationByte { offset: usize, byte: u8 },

    /// A UTF-8 sequence encoding a value below the minimum for its length.
    #[error("overlong UTF-8 encoding of U+{codepoint:04X} at offset {offset}")]
    OverlongEncoding { offset: usize, codepoint: u32 },

    /// A malformed UTF-16 pair, or a code point in the surrogate range.
    #[error("invalid surrogate at offset {offset}")]
    InvalidSurrogate { offset: usize },

    /// A code point at or above 0x110000.
    #[error("code point {codepoint:#x} is out of range")]
    CodepointOutOfRange { codepoint: u32 },

    /// A byte >= 128 where strict ASCII is required.
    #[error("invalid ASCII byte {byte:#04x} at offset {offset}")]
    InvalidAsciiByte { offset: usize, byte: u8 },

    /// `%` without two hex digits after it, or a literal space.
    #[error("invalid percent-encoded sequence at offset {offset}")]
    InvalidPercentSequence { offset: usize },

    /// No chain of edges joins the two encodings under the constraint.
    #[error("no conversion path from {from} to {to} (lossless only: {lossless_only})")]
    NoConversionPath {
        from: Encoding,
        to: Encoding,
        lossless_only: bool,
    },

    /// The input buffer holds the wrong unit kind for its encoding.
    #[error("{encoding} input must be {expected}, got {found}")]
    UnitMismatch {
        encoding: Encoding,
        expected: UnitKind,
        found: UnitKind,
    },
}

impl TranscodeError {
    /// True for failures that depend only on the requested encodings and the
    /// buffer kind, not on the data itself.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TranscodeError::NoConversionPath { .. } | TranscodeError::UnitMismatch { .. }
        )
    }

    /// Input offset carried by the error, if it has one.
    pub fn offset(&self) -> Option<usize> {
        use TranscodeError::*;
        match *self {
            TruncatedSequence { offset, .. }
            | InvalidLeadByte { offset, .. }
            | InvalidContinuationByte { offset, .. }
            | OverlongEncoding { offset, .. }
            | InvalidSurrogate { offset }
            | InvalidAsciiByte { offset, .. }
            | InvalidPercentSequence { offset } => Some(offset),
            CodepointOutOfRange { .. } | NoConversionPath { .. } | UnitMismatch { .. } => None,
        }
    }

    /// Shift a position-carrying error by `base` units.
    ///
    /// The codepoint codec reports offsets relative to the sequence it was
    /// handed; converters call this to make them absolute.
    pub(crate) fn at_offset(self, base: usize) -> Self {
        self.map_offset(|offset| base + offset)
    }

    /// Rewrite the offset of a position-carrying error; others pass through.
    pub(crate) fn map_offset(self, f: impl FnOnce(usize) -> usize) -> Self {
        use TranscodeError::*;
        match self {
            TruncatedSequence {
                offset,
                expected,
                available,
            } => TruncatedSequence {
                offset: f(offset),
                expected,
                available,
            },
            InvalidLeadByte { offset, byte } => InvalidLeadByte {
                offset: f(offset),
                byte,
            },
            InvalidContinuationByte { offset, byte } => InvalidContinuationByte {
                offset: f(offset),
                byte,
            },
            OverlongEncoding { offset, codepoint } => OverlongEncoding {
                offset: f(offset),
                codepoint,
            },
            InvalidSurrogate { offset } => InvalidSurrogate { offset: f(offset) },
            InvalidAsciiByte { offset, byte } => InvalidAsciiByte {
                offset: f(offset),
                byte,
            },
            InvalidPercentSequence { offset } => InvalidPercentSequence { offset: f(offset) },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        let no_path = TranscodeError::NoConversionPath {
            from: Encoding::UrlEncode,
            to: Encoding::Ascii,
            lossless_only: true,
        };
        assert!(no_path.is_structural());
        assert!(!TranscodeError::InvalidSurrogate { offset: 0 }.is_structural());
    }

    #[test]
    fn test_at_offset_rebases_positions() {
        let err = TranscodeError::InvalidContinuationByte { offset: 1, byte: 0x41 }.at_offset(10);
        assert_eq!(err, TranscodeError::InvalidContinuationByte { offset: 11, byte: 0x41 });

        let err = TranscodeError::CodepointOutOfRange { codepoint: 0x110000 }.at_offset(10);
        assert_eq!(err, TranscodeError::CodepointOutOfRange { codepoint: 0x110000 });
    }

    #[test]
    fn test_offset_accessor() {
        assert_eq!(TranscodeError::InvalidSurrogate { offset: 7 }.offset(), Some(7));
        assert_eq!(
            TranscodeError::TruncatedSequence { offset: 2, expected: 3, available: 1 }.offset(),
            Some(2)
        );
        assert_eq!(TranscodeError::CodepointOutOfRange { codepoint: 0x110000 }.offset(), None);

        let err = TranscodeError::InvalidLeadByte { offset: 1, byte: 0xFF }.map_offset(|_| 3);
        assert_eq!(err, TranscodeError::InvalidLeadByte { offset: 3, byte: 0xFF });
    }

    #[test]
    fn test_display_messages() {
        let err = TranscodeError::NoConversionPath {
            from: Encoding::UrlEncode,
            to: Encoding::Ascii,
            lossless_only: true,
        };
        assert_eq!(
            err.to_string(),
            "no conversion path from URL-encoding to ASCII (lossless only: true)"
        );
        let err = TranscodeError::OverlongEncoding { offset: 0, codepoint: 0 };
        assert_eq!(err.to_string(), "overlong UTF-8 encoding of U+0000 at offset 0");
    }
}
