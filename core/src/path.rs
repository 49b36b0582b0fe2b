//! Path finder: shortest conversion route between two encodings.
//!
//! Plain breadth-first search over the encoding graph. When `lossless_only`
//! is set, lossy edges are not traversable at all. Neighbours are visited in
//! ascending encoding index, so among equally short routes the one through
//! the lowest-indexed encodings wins.

use std::collections::VecDeque;
use std::fmt;

use crate::encoding::{Encoding, ENCODING_COUNT};
use crate::error::{Result, TranscodeError};
use crate::graph::{Edge, EncodingGraph};

/// A discovered path through the encoding graph.
///
/// Always non-empty, starts at the source, ends at the destination and never
/// repeats an encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    encodings: Vec<Encoding>,
    lossless: bool,
}

impl Route {
    /// Zero-edge route from an encoding to itself.
    pub fn identity(encoding: Encoding) -> Self {
        Self {
            encodings: vec![encoding],
            lossless: true,
        }
    }

    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    pub fn source(&self) -> Encoding {
        self.encodings[0]
    }

    pub fn destination(&self) -> Encoding {
        self.encodings[self.encodings.len() - 1]
    }

    pub fn edge_count(&self) -> usize {
        self.encodings.len() - 1
    }

    pub fn is_identity(&self) -> bool {
        self.encodings.len() == 1
    }

    /// AND of the lossless flags of every edge on the route.
    pub fn is_lossless(&self) -> bool {
        self.lossless
    }

    /// Consecutive (from, to) pairs along the route.
    pub fn hops(&self) -> impl Iterator<Item = (Encoding, Encoding)> + '_ {
        self.encodings.windows(2).map(|w| (w[0], w[1]))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, enc) in self.encodings.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{enc}")?;
        }
        Ok(())
    }
}

/// Whether BFS may follow `edge` under the constraint.
#[inline]
fn traversable(edge: &Edge, lossless_only: bool) -> bool {
    !lossless_only || edge.lossless
}

/// Find the shortest route from `from` to `to`.
///
/// Fails with [`TranscodeError::NoConversionPath`] when `to` is unreachable
/// under the constraint.
pub fn find_route(
    graph: &EncodingGraph,
    from: Encoding,
    to: Encoding,
    lossless_only: bool,
) -> Result<Route> {
    if from == to {
        return Ok(Route::identity(from));
    }

    let mut parent: [Option<Encoding>; ENCODING_COUNT] = [None; ENCODING_COUNT];
    let mut visited = [false; ENCODING_COUNT];
    let mut queue = VecDeque::with_capacity(ENCODING_COUNT);

    visited[from.index()] = true;
    queue.push_back(from);

    'search: while let Some(current) = queue.pop_front() {
        for edge in graph.neighbours(current) {
            if visited[edge.to.index()] || !traversable(edge, lossless_only) {
                continue;
            }
            visited[edge.to.index()] = true;
            parent[edge.to.index()] = Some(current);
            if edge.to == to {
                break 'search;
            }
            queue.push_back(edge.to);
        }
    }

    if !visited[to.index()] {
        return Err(TranscodeError::NoConversionPath {
            from,
            to,
            lossless_only,
        });
    }

    let mut encodings = vec![to];
    let mut cursor = to;
    while let Some(prev) = parent[cursor.index()] {
        encodings.push(prev);
        cursor = prev;
    }
    encodings.reverse();

    let lossless = encodings
        .windows(2)
        .all(|w| graph.is_lossless(w[0], w[1]).unwrap_or(false));

    Ok(Route {
        encodings,
        lossless,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::BaseConverter;
    use Encoding::*;

    fn route(from: Encoding, to: Encoding, lossless_only: bool) -> Result<Route> {
        find_route(EncodingGraph::global(), from, to, lossless_only)
    }

    #[test]
    fn test_identity_route() {
        for enc in Encoding::ALL {
            for lossless in [true, false] {
                let r = route(enc, enc, lossless).unwrap();
                assert!(r.is_identity());
                assert_eq!(r.edge_count(), 0);
                assert!(r.is_lossless());
            }
        }
    }

    #[test]
    fn test_direct_edge() {
        let r = route(Utf16, Utf8, true).unwrap();
        assert_eq!(r.encodings(), &[Utf16, Utf8]);
        assert_eq!(r.edge_count(), 1);
    }

    #[test]
    fn test_ascii_to_url_goes_through_utf16_and_utf8() {
        let r = route(Ascii, UrlEncode, true).unwrap();
        assert_eq!(r.encodings(), &[Ascii, Utf16, Utf8, UrlEncode]);
        assert!(r.is_lossless());
        assert_eq!(r.to_string(), "ASCII -> UTF-16 -> UTF-8 -> URL-encoding");
    }

    #[test]
    fn test_url_to_ascii_needs_lossy_edge() {
        assert_eq!(
            route(UrlEncode, Ascii, true),
            Err(TranscodeError::NoConversionPath {
                from: UrlEncode,
                to: Ascii,
                lossless_only: true
            })
        );
        let r = route(UrlEncode, Ascii, false).unwrap();
        assert_eq!(r.encodings(), &[UrlEncode, Utf8, Utf16, Ascii]);
        assert!(!r.is_lossless());
    }

    #[test]
    fn test_route_never_repeats_an_encoding() {
        for from in Encoding::ALL {
            for to in Encoding::ALL {
                if let Ok(r) = route(from, to, false) {
                    let mut seen = r.encodings().to_vec();
                    seen.sort();
                    seen.dedup();
                    assert_eq!(seen.len(), r.encodings().len());
                    assert_eq!(r.source(), from);
                    assert_eq!(r.destination(), to);
                }
            }
        }
    }

    #[test]
    fn test_hops() {
        let r = route(Utf8, Ascii, false).unwrap();
        let hops: Vec<_> = r.hops().collect();
        assert_eq!(hops, vec![(Utf8, Utf16), (Utf16, Ascii)]);
    }

    #[test]
    fn test_restricted_graph_has_no_route() {
        let g = EncodingGraph::from_converters(&[BaseConverter::Utf8ToUtf16]);
        assert!(find_route(&g, Utf8, Utf16, true).is_ok());
        assert!(find_route(&g, Utf16, Utf8, false).is_err());
    }
}
