// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Repository
//!
//! Runs [`QueryFactory`] output through a [`CommandExecutor`] and turns the
//! replies into typed results.
//!
//! ```text
//! find(spec)       → FT.SEARCH ...            → Vec<SearchHit>
//! count(spec)      → FT.SEARCH ... LIMIT 0 0  → u64
//! remove(spec)     → count, FT.SEARCH ... NOCONTENT LIMIT 0 n, DEL keys... → u64
//! aggregate(spec)  → FT.AGGREGATE ...         → rows
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;

use super::error::QueryError;
use super::query_factory::{QueryFactory, QuerySpec};
use super::reply::{parse_aggregate_reply, parse_count, parse_search_reply, SearchHit};
use crate::metrics;
use crate::storage::traits::{RepositoryError, SharedExecutor};

pub struct SearchRepository {
    executor: SharedExecutor,
    factory: QueryFactory,
}

fn compiled(result: Result<Vec<String>, QueryError>) -> Result<Vec<String>, RepositoryError> {
    result.map_err(|e| {
        metrics::record_compile_error();
        e.into()
    })
}

impl SearchRepository {
    pub fn new(executor: SharedExecutor, factory: QueryFactory) -> Self {
        Self { executor, factory }
    }

    pub fn factory(&self) -> &QueryFactory {
        &self.factory
    }

    /// Documents matching `spec`, sorted and paged as requested.
    ///
    /// Without a limit RediSearch applies its own default page size (10).
    pub async fn find(&self, spec: &QuerySpec) -> Result<Vec<SearchHit>, RepositoryError> {
        let start = Instant::now();
        let tokens = compiled(self.factory.build_find_query(spec))?;
        let reply = parse_search_reply(&self.executor.execute(&tokens).await?)?;

        metrics::record_search_results(reply.hits.len());
        debug!(
            index = %self.factory.index_name(),
            total = reply.total,
            returned = reply.hits.len(),
            elapsed = ?start.elapsed(),
            "Search completed"
        );
        Ok(reply.hits)
    }

    /// Number of documents matching `spec.where_clause`.
    pub async fn count(&self, spec: &QuerySpec) -> Result<u64, RepositoryError> {
        let tokens = compiled(self.factory.build_count_query(spec))?;
        let reply = parse_search_reply(&self.executor.execute(&tokens).await?)?;
        Ok(reply.total)
    }

    /// Delete every document matching `spec.where_clause`; returns how many
    /// keys Redis removed. Sort and paging on `spec` are ignored.
    ///
    /// Keys are fetched in one NOCONTENT page sized to the match count. The
    /// server still caps that page at its `MAXSEARCHRESULTS` setting (10000
    /// by default), so larger match sets need repeated calls.
    pub async fn remove(&self, spec: &QuerySpec) -> Result<u64, RepositoryError> {
        let total = self.count(spec).await?;
        if total == 0 {
            return Ok(0);
        }

        let tokens = compiled(self.factory.build_keys_query(spec, total))?;
        let keys: Vec<String> = parse_search_reply(&self.executor.execute(&tokens).await?)?
            .hits
            .into_iter()
            .map(|hit| hit.key)
            .collect();
        if keys.is_empty() {
            return Ok(0);
        }

        let tokens = self.factory.build_remove_query(&keys);
        let removed = parse_count(&self.executor.execute(&tokens).await?)?;
        debug!(index = %self.factory.index_name(), matched = total, removed, "Removed matching documents");
        Ok(removed)
    }

    /// Grouped / reduced rows for `spec`.
    pub async fn aggregate(&self, spec: &QuerySpec) -> Result<Vec<BTreeMap<String, String>>, RepositoryError> {
        let tokens = compiled(self.factory.build_aggregation_query(spec))?;
        parse_aggregate_reply(&self.executor.execute(&tokens).await?)
    }
}
