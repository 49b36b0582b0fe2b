// tools/src/commands.rs
//
// Subcommand bodies. Each one builds what it needs from libtranscode-core and
// prints to stdout; diagnostics go through tracing to stderr.

use anyhow::{Result, bail};
use libtranscode_core::{
    Config, Encoding, EncodingGraph, Text, Transcoder, UnitKind, find_route, list_encodings,
};
use serde::Serialize;

use crate::hex;
use crate::{OutputFormat, RouteArgs};

#[derive(Serialize)]
struct EdgeInfo {
    to: Encoding,
    lossless: bool,
}

#[derive(Serialize)]
struct EncodingInfo {
    index: usize,
    name: Encoding,
    unit_bits: u8,
    edges: Vec<EdgeInfo>,
}

#[derive(Serialize)]
struct RouteInfo<'a> {
    encodings: &'a [Encoding],
    edges: usize,
    lossless: bool,
}

fn unit_bits(kind: UnitKind) -> u8 {
    match kind {
        UnitKind::Byte => 8,
        UnitKind::Wide => 16,
    }
}

/// Resolve the endpoints and constraint from arguments plus config defaults.
fn endpoints(config: &Config, args: &RouteArgs) -> (Encoding, Encoding, bool) {
    (
        args.from.unwrap_or(config.default_source),
        args.to.unwrap_or(config.default_destination),
        config.lossless_only && !args.lossy,
    )
}

pub fn list(json: bool) -> Result<()> {
    let graph = EncodingGraph::global();
    let infos: Vec<EncodingInfo> = list_encodings()
        .iter()
        .map(|&enc| EncodingInfo {
            index: enc.index(),
            name: enc,
            unit_bits: unit_bits(enc.unit_kind()),
            edges: graph
                .neighbours(enc)
                .map(|e| EdgeInfo {
                    to: e.to,
                    lossless: e.lossless,
                })
                .collect(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in &infos {
        let edges = info
            .edges
            .iter()
            .map(|e| {
                if e.lossless {
                    e.to.to_string()
                } else {
                    format!("{} (lossy)", e.to)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}  {:<12} {:>2}-bit  -> {}",
            info.index, info.name, info.unit_bits, edges
        );
    }
    Ok(())
}

pub fn route(config: &Config, args: &RouteArgs, json: bool) -> Result<()> {
    let (from, to, lossless_only) = endpoints(config, args);
    let route = find_route(EncodingGraph::global(), from, to, lossless_only)?;

    if json {
        let info = RouteInfo {
            encodings: route.encodings(),
            edges: route.edge_count(),
            lossless: route.is_lossless(),
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let kind = if route.is_lossless() { "lossless" } else { "lossy" };
        println!("{route}  ({} edges, {kind})", route.edge_count());
    }
    Ok(())
}

pub fn check(config: &Config, args: &RouteArgs) -> bool {
    let (from, to, lossless_only) = endpoints(config, args);
    let ok = Transcoder::new(config.clone()).can_convert(from, to, lossless_only);
    println!("{}", if ok { "yes" } else { "no" });
    ok
}

fn read_input(source: Encoding, text: Option<&str>, hex_input: Option<&str>) -> Result<Text> {
    let kind = source.unit_kind();
    match (text, hex_input) {
        (Some(text), _) => Ok(match kind {
            UnitKind::Byte => Text::from_str_utf8(text),
            UnitKind::Wide => Text::from_utf16_str(text),
        }),
        (None, Some(h)) => Ok(match kind {
            UnitKind::Byte => Text::Bytes(hex::parse_bytes(h)?),
            UnitKind::Wide => Text::Units(hex::parse_units(h)?),
        }),
        (None, None) => bail!("no input given: pass --text or --hex"),
    }
}

fn render(output: &Text, format: OutputFormat) -> String {
    match (output, format) {
        (Text::Bytes(b), OutputFormat::Hex) => hex::format_bytes(b),
        (Text::Units(u), OutputFormat::Hex) => hex::format_units(u),
        (Text::Bytes(b), OutputFormat::Text) => String::from_utf8_lossy(b).into_owned(),
        (Text::Units(u), OutputFormat::Text) => String::from_utf16_lossy(u),
    }
}

pub fn convert(
    config: Config,
    args: &RouteArgs,
    text: Option<&str>,
    hex_input: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let (from, to, lossless_only) = endpoints(&config, args);
    let transcoder = Transcoder::new(config);

    // Resolve the route before parsing the input.
    let converter = transcoder.converter(from, to, lossless_only)?;
    tracing::debug!(route = %converter.route(), "converting");

    let input = read_input(from, text, hex_input)?;
    let output = converter.convert_owned(input)?;
    println!("{}", render(&output, format));
    Ok(())
}

/// UTF-16 -> UTF-8 byte dump, then URL-encoding -> ASCII over a lossy route.
pub fn demo() -> Result<()> {
    let transcoder = Transcoder::default();

    let units = Text::Units(vec![0x0024, 0x00A2, 0x0939, 0x20AC, 0xD800, 0xDF48]);
    let utf8 = transcoder.convert(Encoding::Utf16, Encoding::Utf8, true, &units)?;
    for byte in utf8.as_bytes().unwrap_or_default() {
        println!("{byte:X}");
    }

    let url = Text::Bytes(b"ala".to_vec());
    let ascii = transcoder.convert(Encoding::UrlEncode, Encoding::Ascii, false, &url)?;
    println!("{}", render(&ascii, OutputFormat::Text));
    Ok(())
}
