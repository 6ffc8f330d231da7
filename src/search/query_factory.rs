// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Factory
//!
//! Assembles complete command token lists for search, count, delete and
//! aggregation. Nothing here talks to Redis; the caller sends the tokens.
//!
//! ```text
//! FT.SEARCH    <index> <query> [SORTBY f ASC|DESC]... [LIMIT offset num]
//! FT.SEARCH    <index> <query> LIMIT 0 0
//! FT.SEARCH    <index> <query> NOCONTENT LIMIT 0 n
//! DEL          <key>...
//! FT.AGGREGATE <index> <query> [GROUPBY n f... [REDUCE OP nargs [f] AS alias]...]
//!                              [SORTBY 1 f ASC|DESC]...
//! ```

use serde::Deserialize;
use tracing::trace;

use super::compiler::ConditionCompiler;
use super::condition::WhereClause;
use super::error::QueryError;

pub const FIND_COMMAND: &str = "FT.SEARCH";
pub const DELETE_COMMAND: &str = "DEL";
pub const AGGREGATE_COMMAND: &str = "FT.AGGREGATE";

const SORTBY: &str = "SORTBY";
const LIMIT: &str = "LIMIT";
const NOCONTENT: &str = "NOCONTENT";
const GROUPBY: &str = "GROUPBY";
const REDUCE: &str = "REDUCE";
const AS: &str = "AS";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// `-1` is descending, any other number ascending.
impl From<i64> for SortOrder {
    fn from(direction: i64) -> Self {
        if direction == -1 {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

impl From<i32> for SortOrder {
    fn from(direction: i32) -> Self {
        SortOrder::from(i64::from(direction))
    }
}

/// Reduction functions, declared in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl Reducer {
    pub fn keyword(&self) -> &'static str {
        match self {
            Reducer::Sum => "SUM",
            Reducer::Count => "COUNT",
            Reducer::Avg => "AVG",
            Reducer::Min => "MIN",
            Reducer::Max => "MAX",
        }
    }
}

/// Output names of the REDUCE clauses
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReducerAliases {
    #[serde(default = "default_sum_alias")]
    pub sum: String,
    #[serde(default = "default_count_alias")]
    pub count: String,
    #[serde(default = "default_average_alias")]
    pub average: String,
    #[serde(default = "default_min_alias")]
    pub min: String,
    #[serde(default = "default_max_alias")]
    pub max: String,
}

fn default_sum_alias() -> String { "totalSum".into() }
fn default_count_alias() -> String { "count".into() }
fn default_average_alias() -> String { "average".into() }
fn default_min_alias() -> String { "min".into() }
fn default_max_alias() -> String { "max".into() }

impl Default for ReducerAliases {
    fn default() -> Self {
        Self {
            sum: default_sum_alias(),
            count: default_count_alias(),
            average: default_average_alias(),
            min: default_min_alias(),
            max: default_max_alias(),
        }
    }
}

impl ReducerAliases {
    pub fn alias(&self, reducer: Reducer) -> &str {
        match reducer {
            Reducer::Sum => &self.sum,
            Reducer::Count => &self.count,
            Reducer::Avg => &self.average,
            Reducer::Min => &self.min,
            Reducer::Max => &self.max,
        }
    }
}

/// Settings for [`QueryFactory`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryFactoryConfig {
    /// Search index every query targets (default: "idx:default")
    #[serde(default = "default_index_name")]
    pub index_name: String,

    #[serde(default)]
    pub aliases: ReducerAliases,
}

fn default_index_name() -> String { "idx:default".into() }

impl Default for QueryFactoryConfig {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            aliases: ReducerAliases::default(),
        }
    }
}

/// Parameters of one search or aggregation call.
///
/// `sort` keeps insertion order; each entry becomes its own SORTBY clause.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    pub where_clause: Option<WhereClause>,
    pub sort: Vec<(String, SortOrder)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub group_by: Vec<String>,
    pub count: Option<String>,
    pub sum: Option<String>,
    pub average: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, clause: impl Into<WhereClause>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: impl Into<SortOrder>) -> Self {
        self.sort.push((field.into(), order.into()));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn count(mut self, field: impl Into<String>) -> Self {
        self.count = Some(field.into());
        self
    }

    pub fn sum(mut self, field: impl Into<String>) -> Self {
        self.sum = Some(field.into());
        self
    }

    pub fn average(mut self, field: impl Into<String>) -> Self {
        self.average = Some(field.into());
        self
    }

    pub fn min(mut self, field: impl Into<String>) -> Self {
        self.min = Some(field.into());
        self
    }

    pub fn max(mut self, field: impl Into<String>) -> Self {
        self.max = Some(field.into());
        self
    }

    /// Populated reductions in emission order, regardless of how they were set.
    fn reductions(&self) -> impl Iterator<Item = (Reducer, &str)> {
        [
            (Reducer::Sum, &self.sum),
            (Reducer::Count, &self.count),
            (Reducer::Avg, &self.average),
            (Reducer::Min, &self.min),
            (Reducer::Max, &self.max),
        ]
        .into_iter()
        .filter_map(|(reducer, field)| field.as_deref().map(|f| (reducer, f)))
    }
}

/// Builds RediSearch command tokens from a [`QuerySpec`]
#[derive(Debug, Clone, Default)]
pub struct QueryFactory {
    config: QueryFactoryConfig,
}

impl QueryFactory {
    pub fn new(config: QueryFactoryConfig) -> Self {
        Self { config }
    }

    /// Factory for `index_name` with the default reducer aliases
    pub fn for_index(index_name: impl Into<String>) -> Self {
        Self::new(QueryFactoryConfig {
            index_name: index_name.into(),
            ..Default::default()
        })
    }

    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    fn search_prefix(&self, command: &str, spec: &QuerySpec) -> Result<Vec<String>, QueryError> {
        Ok(vec![
            command.to_string(),
            self.config.index_name.clone(),
            ConditionCompiler::compile(spec.where_clause.as_ref())?,
        ])
    }

    /// `FT.SEARCH index query [SORTBY f dir]... [LIMIT offset limit]`
    ///
    /// LIMIT is only emitted when `limit` is set; a zero limit still counts.
    pub fn build_find_query(&self, spec: &QuerySpec) -> Result<Vec<String>, QueryError> {
        let mut tokens = self.search_prefix(FIND_COMMAND, spec)?;

        for (field, order) in &spec.sort {
            tokens.extend([SORTBY.to_string(), field.clone(), order.keyword().to_string()]);
        }

        if let Some(limit) = spec.limit {
            tokens.extend([
                LIMIT.to_string(),
                spec.offset.unwrap_or(0).to_string(),
                limit.to_string(),
            ]);
        }

        trace!(?tokens, "Built find query");
        Ok(tokens)
    }

    /// `FT.SEARCH index query LIMIT 0 0` - sort and paging are ignored.
    pub fn build_count_query(&self, spec: &QuerySpec) -> Result<Vec<String>, QueryError> {
        let mut tokens = self.search_prefix(FIND_COMMAND, spec)?;
        tokens.extend([LIMIT.to_string(), "0".to_string(), "0".to_string()]);
        trace!(?tokens, "Built count query");
        Ok(tokens)
    }

    /// `FT.SEARCH index query NOCONTENT LIMIT 0 limit` - keys only, no fields.
    ///
    /// Sort and paging on `spec` are ignored.
    pub fn build_keys_query(&self, spec: &QuerySpec, limit: u64) -> Result<Vec<String>, QueryError> {
        let mut tokens = self.search_prefix(FIND_COMMAND, spec)?;
        tokens.extend([
            NOCONTENT.to_string(),
            LIMIT.to_string(),
            "0".to_string(),
            limit.to_string(),
        ]);
        trace!(?tokens, "Built keys query");
        Ok(tokens)
    }

    /// `DEL key...` - turning a condition into keys is the caller's job.
    pub fn build_remove_query<S: AsRef<str>>(&self, keys: &[S]) -> Vec<String> {
        std::iter::once(DELETE_COMMAND.to_string())
            .chain(keys.iter().map(|k| k.as_ref().to_string()))
            .collect()
    }

    /// `FT.AGGREGATE index query [GROUPBY ...] [REDUCE ...]... [SORTBY 1 f dir]...`
    ///
    /// Reductions need a GROUPBY clause and are dropped without one.
    pub fn build_aggregation_query(&self, spec: &QuerySpec) -> Result<Vec<String>, QueryError> {
        let mut tokens = self.search_prefix(AGGREGATE_COMMAND, spec)?;

        if !spec.group_by.is_empty() {
            tokens.push(GROUPBY.to_string());
            tokens.push(spec.group_by.len().to_string());
            tokens.extend(spec.group_by.iter().cloned());

            for (reducer, field) in spec.reductions() {
                tokens.push(REDUCE.to_string());
                tokens.push(reducer.keyword().to_string());
                if reducer == Reducer::Count {
                    tokens.push("0".to_string());
                } else {
                    tokens.push("1".to_string());
                    tokens.push(field.to_string());
                }
                tokens.push(AS.to_string());
                tokens.push(self.config.aliases.alias(reducer).to_string());
            }
        }

        for (field, order) in &spec.sort {
            tokens.extend([
                SORTBY.to_string(),
                "1".to_string(),
                field.clone(),
                order.keyword().to_string(),
            ]);
        }

        trace!(?tokens, "Built aggregation query");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::condition::{Combinator, Condition, ConditionGroup};

    fn factory() -> QueryFactory {
        QueryFactory::for_index("idx:users")
    }

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_find_empty_spec() {
        let query = factory().build_find_query(&QuerySpec::new()).unwrap();
        assert_eq!(query, tokens(&["FT.SEARCH", "idx:users", "*"]));
    }

    #[test]
    fn test_find_with_where() {
        let spec = QuerySpec::new().filter(Condition::eq("name", "Alice"));
        let query = factory().build_find_query(&spec).unwrap();
        assert_eq!(query, tokens(&["FT.SEARCH", "idx:users", "@name:{Alice}"]));
    }

    #[test]
    fn test_find_zero_limit_is_emitted() {
        let query = factory().build_find_query(&QuerySpec::new().limit(0)).unwrap();
        assert_eq!(query, tokens(&["FT.SEARCH", "idx:users", "*", "LIMIT", "0", "0"]));
    }

    #[test]
    fn test_find_limit_with_offset() {
        let spec = QuerySpec::new().offset(20).limit(10);
        let query = factory().build_find_query(&spec).unwrap();
        assert_eq!(query, tokens(&["FT.SEARCH", "idx:users", "*", "LIMIT", "20", "10"]));
    }

    #[test]
    fn test_find_offset_without_limit_is_ignored() {
        let query = factory().build_find_query(&QuerySpec::new().offset(5)).unwrap();
        assert_eq!(query, tokens(&["FT.SEARCH", "idx:users", "*"]));
    }

    #[test]
    fn test_find_sort_one_clause_per_field() {
        let spec = QuerySpec::new().sort_by("a", 1).sort_by("b", -1);
        let query = factory().build_find_query(&spec).unwrap();
        assert_eq!(
            query,
            tokens(&["FT.SEARCH", "idx:users", "*", "SORTBY", "a", "ASC", "SORTBY", "b", "DESC"])
        );
    }

    #[test]
    fn test_find_propagates_compile_errors() {
        let bad = Condition::new(
            "a",
            crate::search::Operator::In,
            crate::search::ConditionValue::scalar(1),
        );
        let err = factory().build_find_query(&QuerySpec::new().filter(bad)).unwrap_err();
        assert!(matches!(err, QueryError::InvalidConditionFormat(_)));
    }

    #[test]
    fn test_count_ignores_paging_and_sort() {
        let spec = QuerySpec::new()
            .filter(Condition::gt("age", 30))
            .sort_by("age", -1)
            .offset(3)
            .limit(7);
        let query = factory().build_count_query(&spec).unwrap();
        assert_eq!(
            query,
            tokens(&["FT.SEARCH", "idx:users", "@age:[(30 +inf]", "LIMIT", "0", "0"])
        );
    }

    #[test]
    fn test_keys_query_is_nocontent() {
        let spec = QuerySpec::new()
            .filter(Condition::eq("status", "stale"))
            .sort_by("name", 1)
            .offset(4)
            .limit(2);
        assert_eq!(
            factory().build_keys_query(&spec, 40).unwrap(),
            tokens(&["FT.SEARCH", "idx:users", "@status:{stale}", "NOCONTENT", "LIMIT", "0", "40"])
        );
    }

    #[test]
    fn test_remove_query() {
        assert_eq!(
            factory().build_remove_query(&["user:1", "user:2"]),
            tokens(&["DEL", "user:1", "user:2"])
        );
        assert_eq!(factory().build_remove_query::<&str>(&[]), tokens(&["DEL"]));
    }

    #[test]
    fn test_aggregate_without_groupby_drops_reducers() {
        let spec = QuerySpec::new().group_by(Vec::<String>::new()).count("id").sum("price");
        let query = factory().build_aggregation_query(&spec).unwrap();
        assert_eq!(query, tokens(&["FT.AGGREGATE", "idx:users", "*"]));
    }

    #[test]
    fn test_aggregate_reducers_fixed_order() {
        let spec = QuerySpec::new().group_by(["@x"]).count("f").sum("@p");
        let query = factory().build_aggregation_query(&spec).unwrap();
        assert_eq!(
            query,
            tokens(&[
                "FT.AGGREGATE", "idx:users", "*",
                "GROUPBY", "1", "@x",
                "REDUCE", "SUM", "1", "@p", "AS", "totalSum",
                "REDUCE", "COUNT", "0", "AS", "count",
            ])
        );
    }

    #[test]
    fn test_aggregate_all_reducers_and_sort() {
        let spec = QuerySpec::new()
            .filter(ConditionGroup::new(
                Combinator::Or,
                vec![Condition::eq("a", 1).into(), Condition::eq("b", 2).into()],
            ))
            .group_by(["@city", "@country"])
            .max("@age")
            .min("@age")
            .average("@age")
            .count("@id")
            .sum("@salary")
            .sort_by("@city", -1);
        let query = factory().build_aggregation_query(&spec).unwrap();
        assert_eq!(
            query,
            tokens(&[
                "FT.AGGREGATE", "idx:users", "(@a:{1} OR @b:{2})",
                "GROUPBY", "2", "@city", "@country",
                "REDUCE", "SUM", "1", "@salary", "AS", "totalSum",
                "REDUCE", "COUNT", "0", "AS", "count",
                "REDUCE", "AVG", "1", "@age", "AS", "average",
                "REDUCE", "MIN", "1", "@age", "AS", "min",
                "REDUCE", "MAX", "1", "@age", "AS", "max",
                "SORTBY", "1", "@city", "DESC",
            ])
        );
    }

    #[test]
    fn test_custom_aliases() {
        let factory = QueryFactory::new(QueryFactoryConfig {
            index_name: "idx:orders".into(),
            aliases: ReducerAliases {
                sum: "revenue".into(),
                ..Default::default()
            },
        });
        let spec = QuerySpec::new().group_by(["@sku"]).sum("@price");
        let query = factory.build_aggregation_query(&spec).unwrap();
        assert_eq!(&query[query.len() - 2..], &tokens(&["AS", "revenue"])[..]);
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: QueryFactoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, QueryFactoryConfig::default());
        assert_eq!(config.index_name, "idx:default");
        assert_eq!(config.aliases.alias(Reducer::Sum), "totalSum");
    }
}
