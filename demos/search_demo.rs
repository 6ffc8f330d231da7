// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search repository walkthrough.
//!
//! Demonstrates:
//! 1. Compiling condition trees (no server needed)
//! 2. Creating a RediSearch index and loading a few hashes
//! 3. find / count / aggregate / remove
//! 4. Collections and the JSON cache
//! 5. Displaying captured metrics
//!
//! # Prerequisites
//!
//! A Redis server with the search module, e.g.:
//! ```bash
//! docker run -p 6379:6379 redis/redis-stack-server
//! ```
//!
//! Connection settings come from `REDIS_*` variables or a `.env` file.
//!
//! # Run
//!
//! ```bash
//! cargo run --example search_demo
//! ```

use std::sync::Arc;
use std::time::Duration;

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use redis_repository::{
    CacheManager, CollectionRepository, CommandExecutor, Condition, ConditionBuilder,
    ConditionCompiler, ConditionNode, KeyPrefix, QueryFactory, QuerySpec, RedisConfig,
    RedisConnection, ScoredMember, SearchRepository, SortedSetRepository, WhereClause,
};
use serde_json::json;

fn tokens(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           redis-repository: Search Demo                       ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Compile condition trees locally
    // ─────────────────────────────────────────────────────────────────────────
    println!("🧩 Compiling conditions...");

    let working_age = ConditionNode::from(Condition::gte("age", 18)).and(Condition::lt("age", 65));
    let compiled = ConditionCompiler::compile_node(&working_age)?;
    println!("   └─ typed tree      → {}", compiled);

    let from_json = ConditionNode::from_json(&json!({
        "combinator": "or",
        "operands": [
            { "field": "city", "operator": "in", "value": ["Leeds", "York"] },
            { "field": "name", "operator": "like", "value": "Ali" }
        ]
    }))?;
    println!("   └─ decoded JSON    → {}", ConditionCompiler::compile_node(&from_json)?);

    let lazy = WhereClause::builder(ConditionBuilder::new().eq("role", "admin").ne("status", "locked"));
    println!("   └─ lazy builder    → {}", ConditionCompiler::compile(Some(&lazy))?);
    println!("   └─ no condition    → {}", ConditionCompiler::compile(None)?);

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Connect and load data
    // ─────────────────────────────────────────────────────────────────────────
    let config = RedisConfig {
        search_index: "idx:demo_users".into(),
        ..RedisConfig::from_env()?
    };
    println!("\n🚀 Connecting to {}:{}...", config.host, config.port);
    let connection = Arc::new(RedisConnection::connect(&config).await?);

    // Ignore "Unknown index" on a fresh server
    let _ = connection.execute(&tokens(&["FT.DROPINDEX", "idx:demo_users", "DD"])).await;
    connection
        .execute(&tokens(&[
            "FT.CREATE", "idx:demo_users", "ON", "HASH", "PREFIX", "1", "demo:user:",
            "SCHEMA", "name", "TAG", "city", "TAG", "age", "NUMERIC", "SORTABLE",
        ]))
        .await?;

    let people = [
        ("1", "Alice", "Leeds", "34"),
        ("2", "Bob", "York", "17"),
        ("3", "Carol", "Leeds", "71"),
        ("4", "Dan", "Leeds", "45"),
    ];
    for (id, name, city, age) in people {
        let key = format!("demo:user:{}", id);
        connection
            .execute(&tokens(&["HSET", &key, "name", name, "city", city, "age", age]))
            .await?;
        println!("   └─ Loaded {} ({}, {}, {})", key, name, city, age);
    }
    // Indexing is asynchronous
    tokio::time::sleep(Duration::from_millis(200)).await;

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Search
    // ─────────────────────────────────────────────────────────────────────────
    let repo = SearchRepository::new(connection.clone(), QueryFactory::new(config.query_factory_config()));

    println!("\n🔍 Working-age users, oldest first:");
    let spec = QuerySpec::new().filter(working_age).sort_by("age", -1).limit(10);
    for hit in repo.find(&spec).await? {
        println!("   └─ {} → {:?}", hit.key, hit.fields);
    }
    println!("   └─ count: {}", repo.count(&spec).await?);

    println!("\n📊 Users per city:");
    let per_city = QuerySpec::new().group_by(["@city"]).count("@name").average("@age");
    for row in repo.aggregate(&per_city).await? {
        println!("   └─ {:?}", row);
    }

    println!("\n🧹 Removing minors...");
    let minors = QuerySpec::new().filter(Condition::lt("age", 18));
    println!("   └─ removed: {}", repo.remove(&minors).await?);

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Collections and cache
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🏆 Leaderboard (sorted set):");
    let board = SortedSetRepository::new(connection.clone(), KeyPrefix::new("demo:"));
    board.clear("board").await?;
    board.add("board", ScoredMember::new("alice", 120.0)).await?;
    board.add("board", ScoredMember::new("carol", 95.5)).await?;
    for entry in board.members("board").await? {
        println!("   └─ {} = {}", entry.member, entry.score);
    }

    println!("\n💾 Cache round trip:");
    let cache = CacheManager::from_config(connection.clone(), &config);
    cache
        .set("profile:alice", &json!({"name": "Alice", "theme": "dark"}), Some(Duration::from_secs(60)))
        .await?;
    let cached: Option<serde_json::Value> = cache.get("profile:alice").await?;
    println!("   └─ profile:alice → {:?}", cached);
    println!("   └─ cleared {} cache keys", cache.clear().await?);

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Metrics
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📈 Metrics:");
    dump_metrics(&snapshotter);

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Demo complete!                             ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    Ok(())
}

fn dump_metrics(snapshotter: &Snapshotter) {
    let mut lines = Vec::new();

    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let (_, key) = composite_key.into_parts();
        let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
        let label_str = if labels.is_empty() { String::new() } else { format!("{{{}}}", labels.join(",")) };

        let rendered = match value {
            DebugValue::Counter(v) => format!("{}", v),
            DebugValue::Gauge(v) => format!("{:.2}", v.into_inner()),
            DebugValue::Histogram(samples) => format!("{} samples", samples.len()),
        };
        lines.push(format!("{}{} = {}", key.name(), label_str, rendered));
    }

    lines.sort();
    for line in lines {
        println!("   └─ {}", line);
    }
}
