// core/src/graph.rs
//
// Static directed graph of encodings. Nodes are encodings, edges are base
// converters tagged with their lossless flag.
//
// The graph is a dense ENCODING_COUNT x ENCODING_COUNT table indexed by
// (source, destination). It is built once from `BaseConverter::ALL` and
// never mutated; the shared instance lives in a `Lazy` so every thread sees
// the same fully constructed table.

use once_cell::sync::Lazy;

use crate::convert::BaseConverter;
use crate::encoding::{Encoding, ENCODING_COUNT};

/// A directed edge: one base converter between two encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: Encoding,
    pub to: Encoding,
    pub lossless: bool,
    pub converter: BaseConverter,
}

impl Edge {
    fn from_converter(converter: BaseConverter) -> Self {
        Self {
            from: converter.source(),
            to: converter.destination(),
            lossless: converter.is_lossless(),
            converter,
        }
    }
}

/// Immutable encoding graph with (source, destination) dispatch.
#[derive(Debug, Clone)]
pub struct EncodingGraph {
    table: [[Option<Edge>; ENCODING_COUNT]; ENCODING_COUNT],
}

static GLOBAL_GRAPH: Lazy<EncodingGraph> = Lazy::new(EncodingGraph::build);

impl EncodingGraph {
    /// Build the graph from every defined base converter.
    pub fn build() -> Self {
        Self::from_converters(&BaseConverter::ALL)
    }

    /// Build a graph from a subset of converters.
    ///
    /// Mostly useful for exercising route search on restricted topologies.
    pub fn from_converters(converters: &[BaseConverter]) -> Self {
        let mut table = [[None; ENCODING_COUNT]; ENCODING_COUNT];
        for &converter in converters {
            let edge = Edge::from_converter(converter);
            table[edge.from.index()][edge.to.index()] = Some(edge);
        }
        tracing::debug!(edges = converters.len(), "built encoding graph");
        Self { table }
    }

    /// The process-wide graph, built on first access.
    pub fn global() -> &'static EncodingGraph {
        &GLOBAL_GRAPH
    }

    pub fn edge(&self, from: Encoding, to: Encoding) -> Option<&Edge> {
        self.table[from.index()][to.index()].as_ref()
    }

    pub fn has_edge(&self, from: Encoding, to: Encoding) -> bool {
        self.edge(from, to).is_some()
    }

    /// Lossless flag of the edge `from -> to`; `None` when there is no edge.
    pub fn is_lossless(&self, from: Encoding, to: Encoding) -> Option<bool> {
        self.edge(from, to).map(|e| e.lossless)
    }

    /// Outgoing edges of `from`, in ascending destination index.
    pub fn neighbours(&self, from: Encoding) -> impl Iterator<Item = &Edge> + '_ {
        self.table[from.index()].iter().flatten()
    }

    /// All edges, ordered by source then destination index.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.table.iter().flat_map(|row| row.iter().flatten())
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }
}

impl Default for EncodingGraph {
    fn default() -> Self {
        Self::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Encoding::*;

    #[test]
    fn test_edges_match_base_converters() {
        let g = EncodingGraph::build();
        assert_eq!(g.edge_count(), 6);

        for from in Encoding::ALL {
            for to in Encoding::ALL {
                assert_eq!(
                    g.has_edge(from, to),
                    BaseConverter::for_pair(from, to).is_some(),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_graph_is_not_symmetric_in_losslessness() {
        let g = EncodingGraph::global();
        assert_eq!(g.is_lossless(Ascii, Utf16), Some(true));
        assert_eq!(g.is_lossless(Utf16, Ascii), Some(false));
        assert_eq!(g.is_lossless(Ascii, Utf8), None);
        assert!(!g.has_edge(Utf8, Utf8));
    }

    #[test]
    fn test_neighbours_in_index_order() {
        let g = EncodingGraph::global();
        let from_utf16: Vec<Encoding> = g.neighbours(Utf16).map(|e| e.to).collect();
        assert_eq!(from_utf16, vec![Utf8, Ascii]);
        let from_utf8: Vec<Encoding> = g.neighbours(Utf8).map(|e| e.to).collect();
        assert_eq!(from_utf8, vec![Utf16, UrlEncode]);
    }

    #[test]
    fn test_subset_graph() {
        let g = EncodingGraph::from_converters(&[BaseConverter::AsciiToUtf16]);
        assert_eq!(g.edge_count(), 1);
        assert!(g.has_edge(Ascii, Utf16));
        assert!(!g.has_edge(Utf16, Ascii));
    }
}
