//! Base converters: one native algorithm per directly connected encoding pair.
//!
//! Every converter comes in two shapes:
//! - a borrowed-input function (`utf8_to_utf16(&[u8])`) that allocates its output;
//! - an owned-input function (`utf8_to_utf16_owned(Vec<u8>)`) that takes the
//!   buffer by value. The URL converters rewrite that buffer in place.
//!
//! Both shapes return identical output and identical errors for the same input.
//! [`BaseConverter`] ties the functions to their (source, destination) pair
//! and lossless flag so the graph can dispatch on them.

use crate::codepoint::{
    codepoint_from_utf16, codepoint_from_utf8, codepoint_to_utf16, codepoint_to_utf8,
    is_surrogate, utf8_sequence_len,
};
use crate::encoding::{Encoding, Text};
use crate::error::{Result, TranscodeError};

/// Byte substituted for every UTF-16 unit that has no ASCII equivalent.
pub const ASCII_SUBSTITUTE: u8 = 128;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

// ========== UTF-8 -> UTF-16 ==========

pub fn utf8_to_utf16(input: &[u8]) -> Result<Vec<u16>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        let lead = input[pos];
        let len = utf8_sequence_len(lead)
            .ok_or(TranscodeError::InvalidLeadByte { offset: pos, byte: lead })?;

        let available = input.len() - pos;
        if available < len {
            return Err(TranscodeError::TruncatedSequence {
                offset: pos,
                expected: len,
                available,
            });
        }

        let mut seq = [0u8; 4];
        seq[..len].copy_from_slice(&input[pos..pos + len]);

        let cp = codepoint_from_utf8(len, &seq).map_err(|e| e.at_offset(pos))?;
        let (n, units) = codepoint_to_utf16(cp).map_err(|e| e.at_offset(pos))?;
        out.extend_from_slice(&units[..n]);

        pos += len;
    }

    Ok(out)
}

/// Same result as the borrowed form; the unit width changes, so no buffer is reused.
pub fn utf8_to_utf16_owned(input: Vec<u8>) -> Result<Vec<u16>> {
    utf8_to_utf16(&input)
}

// ========== UTF-16 -> UTF-8 ==========

pub fn utf16_to_utf8(input: &[u16]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 3);
    let mut pos = 0;

    while pos < input.len() {
        let first = input[pos];
        let len = if is_surrogate(u32::from(first)) { 2 } else { 1 };

        let available = input.len() - pos;
        if available < len {
            return Err(TranscodeError::TruncatedSequence {
                offset: pos,
                expected: len,
                available,
            });
        }

        let mut seq = [0u16; 2];
        seq[..len].copy_from_slice(&input[pos..pos + len]);

        let cp = codepoint_from_utf16(len, &seq).map_err(|e| e.at_offset(pos))?;
        let (n, bytes) = codepoint_to_utf8(cp).map_err(|e| e.at_offset(pos))?;
        out.extend_from_slice(&bytes[..n]);

        pos += len;
    }

    Ok(out)
}

/// Same result as the borrowed form; the unit width changes, so no buffer is reused.
pub fn utf16_to_utf8_owned(input: Vec<u16>) -> Result<Vec<u8>> {
    utf16_to_utf8(&input)
}

// ========== UTF-16 -> ASCII (lossy) ==========

/// Map UTF-16 to ASCII, replacing anything outside 0..128 with
/// [`ASCII_SUBSTITUTE`].
///
/// A well-formed surrogate pair collapses to a single substitute byte. An
/// unpaired surrogate is one unit and likewise becomes one substitute byte.
pub fn utf16_to_ascii(input: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        let unit = input[pos];
        if (0xD800..=0xDBFF).contains(&unit)
            && input
                .get(pos + 1)
                .is_some_and(|next| (0xDC00..=0xDFFF).contains(next))
        {
            out.push(ASCII_SUBSTITUTE);
            pos += 2;
            continue;
        }

        out.push(if unit < 128 { unit as u8 } else { ASCII_SUBSTITUTE });
        pos += 1;
    }

    out
}

/// Same result as the borrowed form; the unit width changes, so no buffer is reused.
pub fn utf16_to_ascii_owned(input: Vec<u16>) -> Vec<u8> {
    utf16_to_ascii(&input)
}

// ========== ASCII -> UTF-16 ==========

pub fn ascii_to_utf16(input: &[u8]) -> Result<Vec<u16>> {
    input
        .iter()
        .enumerate()
        .map(|(offset, &byte)| {
            if byte < 128 {
                Ok(u16::from(byte))
            } else {
                Err(TranscodeError::InvalidAsciiByte { offset, byte })
            }
        })
        .collect()
}

/// Same result as the borrowed form; the unit width changes, so no buffer is reused.
pub fn ascii_to_utf16_owned(input: Vec<u8>) -> Result<Vec<u16>> {
    ascii_to_utf16(&input)
}

// ========== URL-encoding -> UTF-8 ==========

#[inline]
fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Decode the two hex digits after the `%` at `pos`.
#[inline]
fn percent_byte(input: &[u8], pos: usize) -> Result<u8> {
    let invalid = TranscodeError::InvalidPercentSequence { offset: pos };
    match (input.get(pos + 1), input.get(pos + 2)) {
        (Some(&hi), Some(&lo)) => match (hex_value(hi), hex_value(lo)) {
            (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
            _ => Err(invalid),
        },
        _ => Err(invalid),
    }
}

/// Check a URL-encoded buffer without decoding it.
///
/// Returns the decoded length on success.
fn validate_url_encoded(input: &[u8]) -> Result<usize> {
    let mut pos = 0;
    let mut decoded = 0;
    while pos < input.len() {
        match input[pos] {
            b' ' => return Err(TranscodeError::InvalidPercentSequence { offset: pos }),
            b'%' => {
                percent_byte(input, pos)?;
                pos += 3;
            }
            _ => pos += 1,
        }
        decoded += 1;
    }
    Ok(decoded)
}

pub fn url_decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        match input[pos] {
            b'+' => {
                out.push(b' ');
                pos += 1;
            }
            b' ' => return Err(TranscodeError::InvalidPercentSequence { offset: pos }),
            b'%' => {
                out.push(percent_byte(input, pos)?);
                pos += 3;
            }
            other => {
                out.push(other);
                pos += 1;
            }
        }
    }

    Ok(out)
}

/// Decode a URL-encoded buffer in place.
///
/// The buffer is validated before it is touched, so on error it is left
/// exactly as it was.
pub fn url_decode_in_place(buf: &mut Vec<u8>) -> Result<()> {
    let decoded_len = validate_url_encoded(buf)?;

    // The write cursor never overtakes the read cursor.
    let mut read = 0;
    let mut write = 0;
    while read < buf.len() {
        let byte = match buf[read] {
            b'+' => {
                read += 1;
                b' '
            }
            b'%' => {
                let byte = percent_byte(buf, read)?;
                read += 3;
                byte
            }
            other => {
                read += 1;
                other
            }
        };
        buf[write] = byte;
        write += 1;
    }

    debug_assert_eq!(write, decoded_len);
    buf.truncate(write);
    Ok(())
}

pub fn url_decode_owned(mut input: Vec<u8>) -> Result<Vec<u8>> {
    url_decode_in_place(&mut input)?;
    Ok(input)
}

// ========== UTF-8 -> URL-encoding ==========

pub fn url_encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    for &byte in input {
        if byte.is_ascii_alphanumeric() {
            out.push(byte);
        } else {
            out.extend_from_slice(&[
                b'%',
                HEX_UPPER[usize::from(byte >> 4)],
                HEX_UPPER[usize::from(byte & 0x0F)],
            ]);
        }
    }
    out
}

/// Percent-encode a buffer in place.
///
/// Grows the buffer once to its final size and fills it from the back.
pub fn url_encode_in_place(buf: &mut Vec<u8>) {
    let escaped = buf.iter().filter(|b| !b.is_ascii_alphanumeric()).count();
    if escaped == 0 {
        return;
    }

    let old_len = buf.len();
    let new_len = old_len + 2 * escaped;
    buf.resize(new_len, 0);

    let mut write = new_len;
    for read in (0..old_len).rev() {
        let byte = buf[read];
        if byte.is_ascii_alphanumeric() {
            write -= 1;
            buf[write] = byte;
        } else {
            write -= 3;
            buf[write] = b'%';
            buf[write + 1] = HEX_UPPER[usize::from(byte >> 4)];
            buf[write + 2] = HEX_UPPER[usize::from(byte & 0x0F)];
        }
    }
    debug_assert_eq!(write, 0);
}

pub fn url_encode_owned(mut input: Vec<u8>) -> Vec<u8> {
    url_encode_in_place(&mut input);
    input
}

// ========== Dispatch ==========

/// Walk `input` one sequence at a time and return the start of the sequence
/// whose output covers `output_offset`. `step` gives the (input, output)
/// widths of the sequence at a position. Offsets past the end map to
/// `input.len()`.
fn source_position<T>(
    input: &[T],
    output_offset: usize,
    step: impl Fn(&[T], usize) -> (usize, usize),
) -> usize {
    let mut pos = 0;
    let mut produced = 0;
    while pos < input.len() {
        let (consumed, written) = step(input, pos);
        if output_offset < produced + written {
            return pos;
        }
        produced += written;
        pos += consumed.clamp(1, input.len() - pos);
    }
    input.len()
}

#[inline]
fn utf16_step(input: &[u16], pos: usize) -> (usize, usize) {
    let unit = input[pos];
    if (0xD800..=0xDBFF).contains(&unit)
        && input
            .get(pos + 1)
            .is_some_and(|next| (0xDC00..=0xDFFF).contains(next))
    {
        (2, 4)
    } else if unit < 0x80 {
        (1, 1)
    } else if unit < 0x800 {
        (1, 2)
    } else {
        (1, 3)
    }
}

/// A primitive converter between two directly connected encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseConverter {
    Utf8ToUtf16,
    Utf16ToUtf8,
    UrlDecode,
    UrlEncode,
    Utf16ToAscii,
    AsciiToUtf16,
}

impl BaseConverter {
    pub const ALL: [BaseConverter; 6] = [
        BaseConverter::Utf8ToUtf16,
        BaseConverter::Utf16ToUtf8,
        BaseConverter::UrlDecode,
        BaseConverter::UrlEncode,
        BaseConverter::Utf16ToAscii,
        BaseConverter::AsciiToUtf16,
    ];

    pub const fn source(self) -> Encoding {
        match self {
            BaseConverter::Utf8ToUtf16 | BaseConverter::UrlEncode => Encoding::Utf8,
            BaseConverter::Utf16ToUtf8 | BaseConverter::Utf16ToAscii => Encoding::Utf16,
            BaseConverter::UrlDecode => Encoding::UrlEncode,
            BaseConverter::AsciiToUtf16 => Encoding::Ascii,
        }
    }

    pub const fn destination(self) -> Encoding {
        match self {
            BaseConverter::Utf8ToUtf16 | BaseConverter::AsciiToUtf16 => Encoding::Utf16,
            BaseConverter::Utf16ToUtf8 | BaseConverter::UrlDecode => Encoding::Utf8,
            BaseConverter::UrlEncode => Encoding::UrlEncode,
            BaseConverter::Utf16ToAscii => Encoding::Ascii,
        }
    }

    /// Whether the conversion can be undone without losing information.
    pub const fn is_lossless(self) -> bool {
        !matches!(self, BaseConverter::Utf16ToAscii)
    }

    /// The converter for `from -> to`, if one is defined.
    pub fn for_pair(from: Encoding, to: Encoding) -> Option<BaseConverter> {
        Self::ALL
            .into_iter()
            .find(|c| c.source() == from && c.destination() == to)
    }

    fn mismatch(self, input: &Text) -> TranscodeError {
        let encoding = self.source();
        TranscodeError::UnitMismatch {
            encoding,
            expected: encoding.unit_kind(),
            found: input.kind(),
        }
    }

    /// Map an offset in this converter's output back to the start of the
    /// input sequence that produced it.
    ///
    /// `input` must be a buffer this converter accepted. A buffer of the wrong
    /// unit kind leaves the offset unchanged.
    pub fn source_offset(self, input: &Text, output_offset: usize) -> usize {
        match (self, input) {
            (BaseConverter::Utf8ToUtf16, Text::Bytes(b)) => {
                source_position(b, output_offset, |b, pos| {
                    match utf8_sequence_len(b[pos]).unwrap_or(1) {
                        4 => (4, 2),
                        len => (len, 1),
                    }
                })
            }
            (BaseConverter::Utf16ToUtf8, Text::Units(u)) => {
                source_position(u, output_offset, utf16_step)
            }
            (BaseConverter::Utf16ToAscii, Text::Units(u)) => {
                source_position(u, output_offset, |u, pos| (utf16_step(u, pos).0, 1))
            }
            (BaseConverter::UrlDecode, Text::Bytes(b)) => {
                source_position(b, output_offset, |b, pos| match b[pos] {
                    b'%' => (3, 1),
                    _ => (1, 1),
                })
            }
            (BaseConverter::UrlEncode, Text::Bytes(b)) => {
                source_position(b, output_offset, |b, pos| {
                    if b[pos].is_ascii_alphanumeric() {
                        (1, 1)
                    } else {
                        (1, 3)
                    }
                })
            }
            (BaseConverter::AsciiToUtf16, Text::Bytes(b)) => output_offset.min(b.len()),
            _ => output_offset,
        }
    }

    /// Apply to a borrowed buffer, producing a new one.
    pub fn apply(self, input: &Text) -> Result<Text> {
        match (self, input) {
            (BaseConverter::Utf8ToUtf16, Text::Bytes(b)) => utf8_to_utf16(b).map(Text::Units),
            (BaseConverter::Utf16ToUtf8, Text::Units(u)) => utf16_to_utf8(u).map(Text::Bytes),
            (BaseConverter::UrlDecode, Text::Bytes(b)) => url_decode(b).map(Text::Bytes),
            (BaseConverter::UrlEncode, Text::Bytes(b)) => Ok(Text::Bytes(url_encode(b))),
            (BaseConverter::Utf16ToAscii, Text::Units(u)) => Ok(Text::Bytes(utf16_to_ascii(u))),
            (BaseConverter::AsciiToUtf16, Text::Bytes(b)) => ascii_to_utf16(b).map(Text::Units),
            _ => Err(self.mismatch(input)),
        }
    }

    /// Apply to an owned buffer, reusing it where the unit width allows.
    pub fn apply_owned(self, input: Text) -> Result<Text> {
        match (self, input) {
            (BaseConverter::Utf8ToUtf16, Text::Bytes(b)) => {
                utf8_to_utf16_owned(b).map(Text::Units)
            }
            (BaseConverter::Utf16ToUtf8, Text::Units(u)) => {
                utf16_to_utf8_owned(u).map(Text::Bytes)
            }
            (BaseConverter::UrlDecode, Text::Bytes(b)) => url_decode_owned(b).map(Text::Bytes),
            (BaseConverter::UrlEncode, Text::Bytes(b)) => Ok(Text::Bytes(url_encode_owned(b))),
            (BaseConverter::Utf16ToAscii, Text::Units(u)) => {
                Ok(Text::Bytes(utf16_to_ascii_owned(u)))
            }
            (BaseConverter::AsciiToUtf16, Text::Bytes(b)) => {
                ascii_to_utf16_owned(b).map(Text::Units)
            }
            (converter, input) => Err(converter.mismatch(&input)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_to_utf8_demo_sequence() {
        let units = [0x0024, 0x00A2, 0x0939, 0x20AC, 0xD800, 0xDF48];
        let bytes = utf16_to_utf8(&units).unwrap();
        assert_eq!(
            bytes,
            vec![0x24, 0xC2, 0xA2, 0xE0, 0xA4, 0xB9, 0xE2, 0x82, 0xAC, 0xF0, 0x90, 0x8D, 0x88]
        );
        assert_eq!(utf8_to_utf16(&bytes).unwrap(), units.to_vec());
    }

    #[test]
    fn test_utf8_lead_byte_classification() {
        assert_eq!(
            utf8_to_utf16(&[0x41, 0x80]),
            Err(TranscodeError::InvalidLeadByte { offset: 1, byte: 0x80 })
        );
        assert_eq!(
            utf8_to_utf16(&[0xF8, 0x80, 0x80, 0x80, 0x80]),
            Err(TranscodeError::InvalidLeadByte { offset: 0, byte: 0xF8 })
        );
        assert_eq!(
            utf8_to_utf16(&[0xFF]),
            Err(TranscodeError::InvalidLeadByte { offset: 0, byte: 0xFF })
        );
    }

    #[test]
    fn test_utf8_truncated_before_continuation_check() {
        assert_eq!(
            utf8_to_utf16(&[0x61, 0xE2, 0x41]),
            Err(TranscodeError::TruncatedSequence { offset: 1, expected: 3, available: 2 })
        );
    }

    #[test]
    fn test_utf8_errors_report_sequence_offset() {
        assert_eq!(
            utf8_to_utf16(&[0x61, 0x62, 0xE2, 0x82, 0x41]),
            Err(TranscodeError::InvalidContinuationByte { offset: 4, byte: 0x41 })
        );
        assert_eq!(
            utf8_to_utf16(&[0x61, 0xC0, 0x80]),
            Err(TranscodeError::OverlongEncoding { offset: 1, codepoint: 0 })
        );
        assert_eq!(
            utf8_to_utf16(&[0xF5, 0x80, 0x80, 0x80]),
            Err(TranscodeError::CodepointOutOfRange { codepoint: 0x140000 })
        );
    }

    #[test]
    fn test_utf16_to_utf8_surrogate_errors() {
        assert_eq!(
            utf16_to_utf8(&[0x41, 0xD800]),
            Err(TranscodeError::TruncatedSequence { offset: 1, expected: 2, available: 1 })
        );
        assert_eq!(
            utf16_to_utf8(&[0xDC00, 0x41]),
            Err(TranscodeError::InvalidSurrogate { offset: 0 })
        );
        assert_eq!(
            utf16_to_utf8(&[0x41, 0xD800, 0x42]),
            Err(TranscodeError::InvalidSurrogate { offset: 2 })
        );
    }

    #[test]
    fn test_utf16_to_ascii_substitutes() {
        let units = [0x61, 0xE9, 0xD83D, 0xDE00, 0x62, 0xD800, 0x63, 0xDC00];
        assert_eq!(
            utf16_to_ascii(&units),
            vec![b'a', 128, 128, b'b', 128, b'c', 128]
        );
        assert!(utf16_to_ascii(&[]).is_empty());
    }

    #[test]
    fn test_ascii_to_utf16_strict() {
        assert_eq!(ascii_to_utf16(b"ala").unwrap(), vec![0x61, 0x6C, 0x61]);
        assert_eq!(
            ascii_to_utf16(&[0x61, 0x80]),
            Err(TranscodeError::InvalidAsciiByte { offset: 1, byte: 0x80 })
        );
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode(b"a+b%20c").unwrap(), b"a b c".to_vec());
        assert_eq!(url_decode(b"%e2%82%AC").unwrap(), vec![0xE2, 0x82, 0xAC]);
        assert_eq!(url_decode(b"%00%ff").unwrap(), vec![0x00, 0xFF]);
        assert_eq!(
            url_decode(b"a b"),
            Err(TranscodeError::InvalidPercentSequence { offset: 1 })
        );
        assert_eq!(
            url_decode(b"ab%2"),
            Err(TranscodeError::InvalidPercentSequence { offset: 2 })
        );
        assert_eq!(
            url_decode(b"%G0"),
            Err(TranscodeError::InvalidPercentSequence { offset: 0 })
        );
        assert_eq!(
            url_decode(b"%+1"),
            Err(TranscodeError::InvalidPercentSequence { offset: 0 })
        );
    }

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode(b"ala"), b"ala".to_vec());
        assert_eq!(url_encode(b"a b+c"), b"a%20b%2Bc".to_vec());
        assert_eq!(url_encode(&[0xE2, 0x82, 0xAC]), b"%E2%82%AC".to_vec());
        assert_eq!(url_encode(&[0x0A]), b"%0A".to_vec());
    }

    #[test]
    fn test_in_place_matches_borrowed() {
        let inputs: [&[u8]; 6] = [b"", b"abc", b"a+b%20c", b"%7e%7E", b"a b", b"x%4"];
        for input in inputs {
            assert_eq!(url_decode_owned(input.to_vec()), url_decode(input));

            let mut buf = input.to_vec();
            url_encode_in_place(&mut buf);
            assert_eq!(buf, url_encode(input));
        }
    }

    #[test]
    fn test_url_decode_in_place_leaves_buffer_on_error() {
        let mut buf = b"a+b%zz".to_vec();
        assert!(url_decode_in_place(&mut buf).is_err());
        assert_eq!(buf, b"a+b%zz".to_vec());
    }

    #[test]
    fn test_base_converter_table() {
        for conv in BaseConverter::ALL {
            assert_eq!(
                BaseConverter::for_pair(conv.source(), conv.destination()),
                Some(conv)
            );
        }
        assert_eq!(BaseConverter::for_pair(Encoding::Ascii, Encoding::Utf8), None);
        assert!(!BaseConverter::Utf16ToAscii.is_lossless());
        assert!(BaseConverter::AsciiToUtf16.is_lossless());
    }

    #[test]
    fn test_source_offset_points_at_producing_sequence() {
        let encoded = Text::Bytes(b"a%20b+c".to_vec());
        let decode = BaseConverter::UrlDecode;
        assert_eq!(decode.source_offset(&encoded, 0), 0);
        assert_eq!(decode.source_offset(&encoded, 1), 1);
        assert_eq!(decode.source_offset(&encoded, 2), 4);
        assert_eq!(decode.source_offset(&encoded, 3), 5);
        assert_eq!(decode.source_offset(&encoded, 5), 7);

        // "$€𐍈" -> units [0024, 20AC, D800, DF48]
        let utf8 = Text::Bytes(vec![0x24, 0xE2, 0x82, 0xAC, 0xF0, 0x90, 0x8D, 0x88]);
        let to_units = BaseConverter::Utf8ToUtf16;
        assert_eq!(to_units.source_offset(&utf8, 1), 1);
        assert_eq!(to_units.source_offset(&utf8, 2), 4);
        assert_eq!(to_units.source_offset(&utf8, 3), 4);

        let units = Text::Units(vec![0x24, 0x20AC, 0xD800, 0xDF48]);
        let to_bytes = BaseConverter::Utf16ToUtf8;
        assert_eq!(to_bytes.source_offset(&units, 3), 1);
        assert_eq!(to_bytes.source_offset(&units, 7), 2);
        assert_eq!(BaseConverter::Utf16ToAscii.source_offset(&units, 2), 2);

        let plain = Text::Bytes(b"a b".to_vec());
        assert_eq!(BaseConverter::UrlEncode.source_offset(&plain, 3), 1);
        assert_eq!(BaseConverter::UrlEncode.source_offset(&plain, 4), 2);
    }

    #[test]
    fn test_apply_rejects_wrong_unit_kind() {
        let err = BaseConverter::Utf16ToUtf8
            .apply(&Text::Bytes(b"a".to_vec()))
            .unwrap_err();
        assert!(err.is_structural());
        assert_eq!(
            BaseConverter::Utf16ToUtf8.apply_owned(Text::Bytes(b"a".to_vec())),
            Err(err)
        );
    }
}
