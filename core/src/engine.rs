// core/src/engine.rs
//
// Converter composition and the caching front end.
//
// `Converter` chains base converters along a route. `Transcoder` resolves
// routes on demand, keeps the composed converters in an LRU cache keyed by
// (source, destination, lossless_only), and tracks cache statistics.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;

use crate::convert::BaseConverter;
use crate::encoding::{Encoding, Text};
use crate::error::{Result, TranscodeError};
use crate::graph::EncodingGraph;
use crate::path::{find_route, Route};
use crate::Config;

/// An end-to-end conversion built by chaining base converters.
///
/// A route of k edges applies `stage_1` first and `stage_k` last. A zero-edge
/// route returns its input unchanged; a one-edge route is just the base
/// converter. The first failing stage aborts the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    route: Route,
    stages: Vec<BaseConverter>,
}

impl Converter {
    /// Compose the base converters along `route`.
    pub fn from_route(graph: &EncodingGraph, route: Route) -> Result<Self> {
        let stages = route
            .hops()
            .map(|(from, to)| {
                graph
                    .edge(from, to)
                    .map(|edge| edge.converter)
                    .ok_or(TranscodeError::NoConversionPath {
                        from,
                        to,
                        lossless_only: false,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { route, stages })
    }

    /// Find the shortest route and compose it.
    pub fn resolve(
        graph: &EncodingGraph,
        from: Encoding,
        to: Encoding,
        lossless_only: bool,
    ) -> Result<Self> {
        let route = find_route(graph, from, to, lossless_only)?;
        Self::from_route(graph, route)
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn source(&self) -> Encoding {
        self.route.source()
    }

    pub fn destination(&self) -> Encoding {
        self.route.destination()
    }

    pub fn is_lossless(&self) -> bool {
        self.stages.iter().all(|s| s.is_lossless())
    }

    pub fn stages(&self) -> &[BaseConverter] {
        &self.stages
    }

    fn check_input(&self, input: &Text) -> Result<()> {
        let encoding = self.source();
        let expected = encoding.unit_kind();
        if input.kind() != expected {
            return Err(TranscodeError::UnitMismatch {
                encoding,
                expected,
                found: input.kind(),
            });
        }
        Ok(())
    }

    /// Convert a borrowed buffer.
    ///
    /// Only the first stage reads the caller's buffer; every later stage owns
    /// the intermediate result and may rewrite it in place. Error offsets
    /// always index the caller's buffer, whichever stage failed.
    pub fn convert(&self, input: &Text) -> Result<Text> {
        self.check_input(input)?;

        let Some((first, rest)) = self.stages.split_first() else {
            return Ok(input.clone());
        };

        tracing::trace!(stage = ?first, units = input.len(), "applying stage");
        let mut text = first.apply(input)?;
        for (index, stage) in rest.iter().enumerate() {
            tracing::trace!(stage = ?stage, units = text.len(), "applying stage");
            text = stage
                .apply_owned(text)
                .map_err(|err| self.locate_error(input, index + 1, err))?;
        }
        Ok(text)
    }

    /// Convert an owned buffer.
    ///
    /// A single-stage route rewrites the buffer in place where the unit width
    /// allows. Longer routes keep it so errors can be reported against it.
    pub fn convert_owned(&self, input: Text) -> Result<Text> {
        self.check_input(&input)?;

        match self.stages.as_slice() {
            [] => Ok(input),
            [stage] => {
                tracing::trace!(stage = ?stage, units = input.len(), "applying stage");
                stage.apply_owned(input)
            }
            _ => self.convert(&input),
        }
    }

    /// Rebase an error raised by stage `failed` onto the caller's input.
    ///
    /// Replays the stages before it to recover their inputs, then maps the
    /// offset back through each one.
    fn locate_error(&self, input: &Text, failed: usize, err: TranscodeError) -> TranscodeError {
        if failed == 0 || err.offset().is_none() {
            return err;
        }

        let mut intermediates: Vec<Text> = Vec::with_capacity(failed);
        for (index, stage) in self.stages[..failed].iter().enumerate() {
            let stage_input = if index == 0 { input } else { &intermediates[index - 1] };
            match stage.apply(stage_input) {
                Ok(next) => intermediates.push(next),
                Err(_) => return err,
            }
        }

        err.map_offset(|mut offset| {
            for index in (0..failed).rev() {
                let stage_input = if index == 0 { input } else { &intermediates[index - 1] };
                offset = self.stages[index].source_offset(stage_input, offset);
            }
            offset
        })
    }
}

type RouteKey = (Encoding, Encoding, bool);

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(Config::DEFAULT_CACHE_SIZE) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Caching conversion front end.
///
/// Route search runs once per (source, destination, lossless_only) key; the
/// outcome, including a missing route, is cached. Safe to share between
/// threads.
pub struct Transcoder {
    graph: &'static EncodingGraph,
    config: Config,
    cache: Mutex<LruCache<RouteKey, Result<Arc<Converter>>>>,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
}

impl Transcoder {
    /// Create a transcoder over the global encoding graph.
    pub fn new(config: Config) -> Self {
        let capacity = NonZeroUsize::new(config.max_cache_size).unwrap_or(DEFAULT_CAPACITY);

        Self {
            graph: EncodingGraph::global(),
            config,
            cache: Mutex::new(LruCache::new(capacity)),
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &EncodingGraph {
        self.graph
    }

    fn lock_cache(&self) -> MutexGuard<'_, LruCache<RouteKey, Result<Arc<Converter>>>> {
        // The cache only holds finished lookups, so a poisoned lock is still usable.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolve (or fetch from cache) the converter for `from -> to`.
    pub fn converter(
        &self,
        from: Encoding,
        to: Encoding,
        lossless_only: bool,
    ) -> Result<Arc<Converter>> {
        let key = (from, to, lossless_only);

        // One guard across lookup and insert, so concurrent misses on a key
        // resolve it once and share the same converter.
        let mut cache = self.lock_cache();
        if let Some(cached) = cache.get(&key) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }
        self.cache_misses.fetch_add(1, Ordering::Relaxed);

        let resolved = Converter::resolve(self.graph, from, to, lossless_only).map(Arc::new);
        match &resolved {
            Ok(converter) => {
                tracing::debug!(route = %converter.route(), lossless_only, "resolved conversion route");
                if !converter.is_lossless() {
                    tracing::warn!(route = %converter.route(), "conversion route contains a lossy edge");
                }
            }
            Err(err) => tracing::debug!(%from, %to, lossless_only, error = %err, "no conversion route"),
        }

        cache.put(key, resolved.clone());
        resolved
    }

    /// True iff a route satisfying the constraint exists.
    pub fn can_convert(&self, from: Encoding, to: Encoding, lossless_only: bool) -> bool {
        self.converter(from, to, lossless_only).is_ok()
    }

    /// Resolve the route first, then convert `input`.
    pub fn convert(
        &self,
        from: Encoding,
        to: Encoding,
        lossless_only: bool,
        input: &Text,
    ) -> Result<Text> {
        self.converter(from, to, lossless_only)?.convert(input)
    }

    /// Like [`Transcoder::convert`], but consumes the input buffer.
    pub fn convert_owned(
        &self,
        from: Encoding,
        to: Encoding,
        lossless_only: bool,
        input: Text,
    ) -> Result<Text> {
        self.converter(from, to, lossless_only)?.convert_owned(input)
    }

    /// Convert using the configured `lossless_only` default.
    pub fn convert_default(&self, from: Encoding, to: Encoding, input: &Text) -> Result<Text> {
        self.convert(from, to, self.config.lossless_only, input)
    }

    /// Get cache statistics as (hits, misses).
    pub fn cache_stats(&self) -> (usize, usize) {
        (
            self.cache_hits.load(Ordering::Relaxed),
            self.cache_misses.load(Ordering::Relaxed),
        )
    }

    /// Cache hit rate as a percentage, or None before the first lookup.
    pub fn cache_hit_rate(&self) -> Option<f32> {
        let (hits, misses) = self.cache_stats();
        let total = hits + misses;
        if total == 0 {
            None
        } else {
            Some((hits as f32 / total as f32) * 100.0)
        }
    }

    pub fn cache_size(&self) -> usize {
        self.lock_cache().len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.lock_cache().cap().get()
    }

    /// Drop every cached route and reset the statistics.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcoder")
            .field("config", &self.config)
            .field("cache_stats", &self.cache_stats())
            .finish()
    }
}
