//! Hex text <-> code unit helpers for the command line.
//!
//! Input is whitespace or comma separated groups, each with an optional `0x`
//! prefix: `"24 C2 A2"`, `"0x0024,0xD800"`. Output is uppercase without prefix.

use anyhow::{Context, Result, bail};

fn groups(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|g| !g.is_empty())
        .map(|g| g.strip_prefix("0x").or_else(|| g.strip_prefix("0X")).unwrap_or(g))
}

/// Decode one group left-padded to `width` hex digits.
fn decode_group(group: &str, width: usize) -> Result<Vec<u8>> {
    if group.is_empty() || group.len() > width {
        bail!("group '{group}' must have 1 to {width} hex digits");
    }
    hex::decode(format!("{group:0>width$}")).with_context(|| format!("invalid hex group '{group}'"))
}

/// Parse groups of 1-2 hex digits into bytes.
pub fn parse_bytes(input: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for group in groups(input) {
        bytes.extend(decode_group(group, 2)?);
    }
    Ok(bytes)
}

/// Parse groups of 1-4 hex digits into 16-bit units.
pub fn parse_units(input: &str) -> Result<Vec<u16>> {
    let mut units = Vec::new();
    for group in groups(input) {
        let bytes = decode_group(group, 4)?;
        units.push(u16::from_be_bytes([bytes[0], bytes[1]]));
    }
    Ok(units)
}

pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_units(units: &[u16]) -> String {
    units
        .iter()
        .map(|u| hex::encode_upper(u.to_be_bytes()))
        .collect::<Vec<_>>()
        .join(" ")
}
