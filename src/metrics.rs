// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application chooses the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `redis_repository_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `command`: Redis command name (FT.SEARCH, HSET, ...)
//! - `status`: success, error
//! - `result`: hit, miss

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a command round trip
pub fn record_command(command: &str, status: &str) {
    counter!(
        "redis_repository_commands_total",
        "command" => command.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record command latency
pub fn record_command_latency(command: &str, duration: Duration) {
    histogram!(
        "redis_repository_command_seconds",
        "command" => command.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a condition tree that failed to compile
pub fn record_compile_error() {
    counter!("redis_repository_compile_errors_total").increment(1);
}

/// Record number of documents returned by a search
pub fn record_search_results(count: usize) {
    histogram!("redis_repository_search_results").record(count as f64);
}

/// Record cache lookup outcome
pub fn record_cache_lookup(hit: bool) {
    counter!(
        "redis_repository_cache_lookups_total",
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}

/// A timing guard that records command latency on drop
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start a new command timer
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        record_command_latency(&self.command, self.start.elapsed());
    }
}
