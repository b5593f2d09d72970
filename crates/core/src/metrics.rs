//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Phrase resolution (matches by entity type, misses)
//! - Playback dispatch (RPC failures)
//! - Catalog cache and source loading

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Resolved queries by entity type and resolution path.
pub static QUERIES_RESOLVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("squeezer_queries_resolved_total", "Total resolved phrases"),
        &["entity_type", "path"], // path: "continuation", "specific", "generic"
    )
    .unwrap()
});

/// Phrases that resolved to nothing.
pub static QUERIES_UNMATCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "squeezer_queries_unmatched_total",
        "Total phrases with no match",
    )
    .unwrap()
});

/// Final confidence of resolved queries.
pub static MATCH_CONFIDENCE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "squeezer_match_confidence",
            "Distribution of resolved query confidence",
        )
        .buckets(vec![0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 1.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Dispatch Metrics
// =============================================================================

/// Playback starts by entity type.
pub static PLAYBACK_STARTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("squeezer_playback_starts_total", "Total playback dispatches"),
        &["entity_type", "result"], // result: "started", "failed"
    )
    .unwrap()
});

/// RPC calls that failed during best-effort sequences.
pub static RPC_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "squeezer_rpc_failures_total",
            "Total failed media server calls",
        ),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Cache and Source Metrics
// =============================================================================

/// Cache freshness checks by outcome.
pub static CACHE_REFRESHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("squeezer_cache_checks_total", "Total catalog cache checks"),
        &["outcome"], // "refreshed", "fresh", "failed"
    )
    .unwrap()
});

/// Entries skipped while loading sources.
pub static ENTRIES_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "squeezer_index_entries_skipped_total",
            "Total source entries that could not be indexed",
        ),
        &["source"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(QUERIES_RESOLVED.clone()),
        Box::new(QUERIES_UNMATCHED.clone()),
        Box::new(MATCH_CONFIDENCE.clone()),
        Box::new(PLAYBACK_STARTS.clone()),
        Box::new(RPC_FAILURES.clone()),
        Box::new(CACHE_REFRESHES.clone()),
        Box::new(ENTRIES_SKIPPED.clone()),
    ]
}
