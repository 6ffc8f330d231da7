// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Parsing of RediSearch replies (RESP2 shape).
//!
//! ```text
//! FT.SEARCH     → [total, key1, [f1, v1, ...], key2, [...], ...]
//!                 (no field arrays when NOCONTENT is used)
//! FT.AGGREGATE  → [rows, [f1, v1, ...], [f1, v1, ...], ...]
//! ```

use std::collections::BTreeMap;

use redis::{from_redis_value, FromRedisValue, Value};

use crate::storage::traits::RepositoryError;

/// One document returned by `FT.SEARCH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub key: String,
    pub fields: BTreeMap<String, String>,
}

/// Parsed `FT.SEARCH` reply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchReply {
    /// Total matches in the index, not just the returned page
    pub total: u64,
    pub hits: Vec<SearchHit>,
}

fn unexpected(what: &str, value: &Value) -> RepositoryError {
    RepositoryError::UnexpectedReply(format!("{}: {:?}", what, value))
}

fn convert<T: FromRedisValue>(what: &str, value: &Value) -> Result<T, RepositoryError> {
    from_redis_value(value).map_err(|_| unexpected(what, value))
}

fn as_items<'a>(what: &str, value: &'a Value) -> Result<&'a [Value], RepositoryError> {
    match value {
        Value::Array(items) | Value::Set(items) => Ok(items),
        other => Err(unexpected(what, other)),
    }
}

/// Flat `[k, v, k, v, ...]` array into a map. Nil values are skipped.
pub(crate) fn parse_pairs(value: &Value) -> Result<BTreeMap<String, String>, RepositoryError> {
    let mut map = BTreeMap::new();

    if let Value::Map(entries) = value {
        for (k, v) in entries {
            if let Some(v) = convert::<Option<String>>("field value", v)? {
                map.insert(convert("field name", k)?, v);
            }
        }
        return Ok(map);
    }

    let items = as_items("field list", value)?;
    if items.len() % 2 != 0 {
        return Err(unexpected("odd-length field list", value));
    }
    for pair in items.chunks(2) {
        if let Some(v) = convert::<Option<String>>("field value", &pair[1])? {
            map.insert(convert("field name", &pair[0])?, v);
        }
    }
    Ok(map)
}

/// Parse an `FT.SEARCH` reply, with or without document contents.
pub fn parse_search_reply(value: &Value) -> Result<SearchReply, RepositoryError> {
    let items = as_items("search reply", value)?;
    let (total, rest) = items
        .split_first()
        .ok_or_else(|| unexpected("empty search reply", value))?;

    let mut reply = SearchReply {
        total: convert("search total", total)?,
        hits: Vec::new(),
    };

    let mut iter = rest.iter().peekable();
    while let Some(key) = iter.next() {
        let key: String = convert("document key", key)?;
        let fields = match iter.peek() {
            Some(next @ (Value::Array(_) | Value::Map(_))) => {
                let fields = parse_pairs(next)?;
                iter.next();
                fields
            }
            _ => BTreeMap::new(),
        };
        reply.hits.push(SearchHit { key, fields });
    }

    Ok(reply)
}

/// Parse an `FT.AGGREGATE` reply into one map per row.
pub fn parse_aggregate_reply(value: &Value) -> Result<Vec<BTreeMap<String, String>>, RepositoryError> {
    let items = as_items("aggregate reply", value)?;
    match items.split_first() {
        None => Err(unexpected("empty aggregate reply", value)),
        Some((_, rows)) => rows.iter().map(parse_pairs).collect(),
    }
}

/// Integer reply, e.g. from DEL / HLEN / SCARD
pub(crate) fn parse_count(value: &Value) -> Result<u64, RepositoryError> {
    convert("integer reply", value)
}
