//! Codepoint codec: one code point to and from its UTF-8 / UTF-16 form.
//!
//! These are the leaf routines under the UTF-8 ↔ UTF-16 converters. They work
//! on a single, already-delimited sequence; finding sequence boundaries is the
//! converters' job. Error offsets are relative to the start of the sequence.

use crate::error::{Result, TranscodeError};

/// One past the largest Unicode scalar value.
pub const CODEPOINT_LIMIT: u32 = 0x11_0000;

pub const SURROGATE_START: u32 = 0xD800;
pub const SURROGATE_END: u32 = 0xDFFF;
const HIGH_SURROGATE_END: u32 = 0xDBFF;
const LOW_SURROGATE_START: u32 = 0xDC00;

#[inline]
pub fn is_surrogate(value: u32) -> bool {
    (SURROGATE_START..=SURROGATE_END).contains(&value)
}

#[inline]
fn is_high_surrogate(unit: u16) -> bool {
    (SURROGATE_START..=HIGH_SURROGATE_END).contains(&u32::from(unit))
}

#[inline]
fn is_low_surrogate(unit: u16) -> bool {
    (LOW_SURROGATE_START..=SURROGATE_END).contains(&u32::from(unit))
}

#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Sequence length announced by a UTF-8 lead byte, from its high bits.
#[inline]
pub fn utf8_sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

/// Encode a code point as one UTF-16 unit or a surrogate pair.
///
/// Returns the number of units written into the array (1 or 2).
pub fn codepoint_to_utf16(cp: u32) -> Result<(usize, [u16; 2])> {
    if is_surrogate(cp) {
        return Err(TranscodeError::InvalidSurrogate { offset: 0 });
    }
    if cp < 0x1_0000 {
        return Ok((1, [cp as u16, 0]));
    }
    if cp < CODEPOINT_LIMIT {
        let v = cp - 0x1_0000;
        let high = (v >> 10) + SURROGATE_START;
        let low = (v & 0x3FF) + LOW_SURROGATE_START;
        return Ok((2, [high as u16, low as u16]));
    }
    Err(TranscodeError::CodepointOutOfRange { codepoint: cp })
}

/// Decode the first `len` units of `units` into a code point.
///
/// A single unit must not be a surrogate; a pair must be high then low.
pub fn codepoint_from_utf16(len: usize, units: &[u16; 2]) -> Result<u32> {
    match len {
        1 => {
            let unit = units[0];
            if is_surrogate(u32::from(unit)) {
                return Err(TranscodeError::InvalidSurrogate { offset: 0 });
            }
            Ok(u32::from(unit))
        }
        2 => {
            let (high, low) = (units[0], units[1]);
            if !is_high_surrogate(high) {
                return Err(TranscodeError::InvalidSurrogate { offset: 0 });
            }
            if !is_low_surrogate(low) {
                return Err(TranscodeError::InvalidSurrogate { offset: 1 });
            }
            Ok(((u32::from(high) - SURROGATE_START) << 10)
                + (u32::from(low) - LOW_SURROGATE_START)
                + 0x1_0000)
        }
        _ => Err(TranscodeError::TruncatedSequence {
            offset: 0,
            expected: 2,
            available: len,
        }),
    }
}

/// Encode a code point as 1 to 4 UTF-8 bytes.
///
/// Returns the number of bytes written into the array.
pub fn codepoint_to_utf8(cp: u32) -> Result<(usize, [u8; 4])> {
    if is_surrogate(cp) {
        return Err(TranscodeError::InvalidSurrogate { offset: 0 });
    }
    let mut out = [0u8; 4];
    let len = if cp < 0x80 {
        out[0] = cp as u8;
        1
    } else if cp < 0x800 {
        out[0] = 0xC0 | ((cp >> 6) & 0x1F) as u8;
        out[1] = 0x80 | (cp & 0x3F) as u8;
        2
    } else if cp < 0x1_0000 {
        out[0] = 0xE0 | ((cp >> 12) & 0x0F) as u8;
        out[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        out[2] = 0x80 | (cp & 0x3F) as u8;
        3
    } else if cp < CODEPOINT_LIMIT {
        out[0] = 0xF0 | ((cp >> 18) & 0x07) as u8;
        out[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
        out[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        out[3] = 0x80 | (cp & 0x3F) as u8;
        4
    } else {
        return Err(TranscodeError::CodepointOutOfRange { codepoint: cp });
    };
    Ok((len, out))
}

/// Decode the first `len` bytes of `bytes` into a code point.
///
/// The lead byte must announce `len`. Continuation bytes are checked next,
/// then the overlong minimum for the length, then the upper bound, then the
/// surrogate range.
pub fn codepoint_from_utf8(len: usize, bytes: &[u8; 4]) -> Result<u32> {
    if utf8_sequence_len(bytes[0]) != Some(len) {
        return Err(TranscodeError::InvalidLeadByte {
            offset: 0,
            byte: bytes[0],
        });
    }

    for (i, &byte) in bytes.iter().enumerate().take(len).skip(1) {
        if !is_continuation(byte) {
            return Err(TranscodeError::InvalidContinuationByte { offset: i, byte });
        }
    }

    let tail = |i: usize| u32::from(bytes[i] & 0x3F);
    let (cp, minimum) = match len {
        1 => (u32::from(bytes[0]), 0),
        2 => ((u32::from(bytes[0] & 0x1F) << 6) | tail(1), 0x80),
        3 => (
            (u32::from(bytes[0] & 0x0F) << 12) | (tail(1) << 6) | tail(2),
            0x800,
        ),
        _ => (
            (u32::from(bytes[0] & 0x07) << 18) | (tail(1) << 12) | (tail(2) << 6) | tail(3),
            0x1_0000,
        ),
    };

    if cp < minimum {
        return Err(TranscodeError::OverlongEncoding {
            offset: 0,
            codepoint: cp,
        });
    }
    if cp >= CODEPOINT_LIMIT {
        return Err(TranscodeError::CodepointOutOfRange { codepoint: cp });
    }
    if is_surrogate(cp) {
        return Err(TranscodeError::InvalidSurrogate { offset: 0 });
    }
    Ok(cp)
}
