// core/tests/routing.rs
//
// Route search over the full encoding graph.
//
// Tests cover:
// - identity routes for every encoding
// - shortest routes and their tie-breaking
// - lossless-only search excluding the UTF-16 -> ASCII edge
// - agreement between `can_convert`, `find_route` and `Transcoder`

use libtranscode_core::{
    can_convert, find_route, list_encodings, Encoding, EncodingGraph, Transcoder,
};
use Encoding::*;

fn expected_route(from: Encoding, to: Encoding, lossless_only: bool) -> Option<Vec<Encoding>> {
    let route = match (from, to) {
        (a, b) if a == b => vec![a],
        (Utf8, Utf16) => vec![Utf8, Utf16],
        (Utf8, UrlEncode) => vec![Utf8, UrlEncode],
        (Utf8, Ascii) => vec![Utf8, Utf16, Ascii],
        (Utf16, Utf8) => vec![Utf16, Utf8],
        (Utf16, UrlEncode) => vec![Utf16, Utf8, UrlEncode],
        (Utf16, Ascii) => vec![Utf16, Ascii],
        (UrlEncode, Utf8) => vec![UrlEncode, Utf8],
        (UrlEncode, Utf16) => vec![UrlEncode, Utf8, Utf16],
        (UrlEncode, Ascii) => vec![UrlEncode, Utf8, Utf16, Ascii],
        (Ascii, Utf16) => vec![Ascii, Utf16],
        (Ascii, Utf8) => vec![Ascii, Utf16, Utf8],
        (Ascii, UrlEncode) => vec![Ascii, Utf16, Utf8, UrlEncode],
        _ => unreachable!(),
    };
    if lossless_only && to == Ascii && from != Ascii {
        None
    } else {
        Some(route)
    }
}

#[test]
fn test_list_encodings() {
    assert_eq!(list_encodings(), &[Utf8, Utf16, UrlEncode, Ascii]);
}

#[test]
fn test_every_pair_matches_expected_route() {
    let graph = EncodingGraph::global();
    for &from in list_encodings() {
        for &to in list_encodings() {
            for lossless_only in [true, false] {
                let found = find_route(graph, from, to, lossless_only)
                    .ok()
                    .map(|r| r.encodings().to_vec());
                assert_eq!(
                    found,
                    expected_route(from, to, lossless_only),
                    "{from} -> {to}, lossless_only={lossless_only}"
                );
                assert_eq!(can_convert(from, to, lossless_only), found.is_some());
            }
        }
    }
}

#[test]
fn test_identity_is_always_convertible() {
    for &enc in list_encodings() {
        assert!(can_convert(enc, enc, true));
        assert!(can_convert(enc, enc, false));
    }
}

#[test]
fn test_lossless_search_only_returns_lossless_routes() {
    let graph = EncodingGraph::global();
    for &from in list_encodings() {
        for &to in list_encodings() {
            if let Ok(route) = find_route(graph, from, to, true) {
                assert!(route.is_lossless());
                for (a, b) in route.hops() {
                    assert_eq!(graph.is_lossless(a, b), Some(true));
                }
            }
        }
    }
}

#[test]
fn test_route_length_bounded_by_encoding_count() {
    let graph = EncodingGraph::global();
    for &from in list_encodings() {
        for &to in list_encodings() {
            if let Ok(route) = find_route(graph, from, to, false) {
                assert!(route.encodings().len() <= list_encodings().len());
            }
        }
    }
}

#[test]
fn test_transcoder_converter_matches_route() {
    let t = Transcoder::default();
    let c = t.converter(Utf8, Ascii, false).unwrap();
    assert_eq!(c.route().encodings(), &[Utf8, Utf16, Ascii]);
    assert!(!c.is_lossless());
    assert_eq!(c.source(), Utf8);
    assert_eq!(c.destination(), Ascii);

    // second lookup is served from cache and yields the same converter
    let again = t.converter(Utf8, Ascii, false).unwrap();
    assert!(std::sync::Arc::ptr_eq(&c, &again));
    assert_eq!(t.cache_stats(), (1, 1));
}
