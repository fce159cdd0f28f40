//! Store contract tests
//!
//! Exercises the `AgentStore` contract through the public provider API,
//! including properties the registry relies on: snapshot ordering,
//! filter satisfaction of search results, and create-race resolution.

mod common;

use chrono::{DateTime, Utc};
use common::mocks::card_with_skills;
use hermes::db::{AgentStore, MemoryStore, StoreProvider};
use hermes::types::{AgentFilter, AppError, RegisteredAgent};
use std::sync::Arc;

fn agent(id: &str, created_secs: i64, tags: &[&str], embedding: Vec<f32>) -> RegisteredAgent {
    let ts = DateTime::<Utc>::from_timestamp(created_secs, 0).unwrap();
    RegisteredAgent {
        id: id.to_string(),
        card: card_with_skills(id, "", &[("echo", "Echo")]),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        embedding,
        created_at: ts,
        updated_at: ts,
    }
}

#[tokio::test]
async fn test_memory_provider_creates_working_store() {
    let store = StoreProvider::Memory.create_store().await.unwrap();

    store.ping().await.unwrap();
    store.create_agent(&agent("a", 1000, &[], vec![])).await.unwrap();
    assert_eq!(store.get_agent("a").await.unwrap().id, "a");
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_list_pagination_window_newest_first() {
    let store = MemoryStore::new();
    for (i, id) in ["a1", "a2", "a3", "a4", "a5"].iter().enumerate() {
        store
            .create_agent(&agent(id, 1000 + i as i64, &[], vec![]))
            .await
            .unwrap();
    }

    let page = store
        .list_agents(&AgentFilter {
            offset: 1,
            limit: 2,
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<&str> = page.agents.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a4", "a3"]);
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn test_search_results_satisfy_filter() {
    let store = MemoryStore::new();
    store
        .create_agent(&agent("p1", 1000, &["prod"], vec![1.0, 0.0]))
        .await
        .unwrap();
    store
        .create_agent(&agent("p2", 1001, &["prod", "beta"], vec![0.5, 0.5]))
        .await
        .unwrap();
    store
        .create_agent(&agent("d1", 1002, &["dev"], vec![0.9, 0.1]))
        .await
        .unwrap();

    let filter = AgentFilter {
        tags: vec!["prod".to_string()],
        ..Default::default()
    };
    let results = store.search_agents(&[1.0, 0.0], 10, &filter).await.unwrap();

    assert_eq!(results.len(), 2);
    for scored in &results {
        assert!(scored.agent.tags.contains(&"prod".to_string()));
    }
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_search_equal_scores_break_ties_by_id() {
    let store = MemoryStore::new();
    // Parallel vectors score identically against the query.
    store
        .create_agent(&agent("zed", 1000, &[], vec![2.0, 0.0]))
        .await
        .unwrap();
    store
        .create_agent(&agent("abe", 1001, &[], vec![1.0, 0.0]))
        .await
        .unwrap();

    let results = store
        .search_agents(&[1.0, 0.0], 10, &AgentFilter::default())
        .await
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|s| s.agent.id.as_str()).collect();
    assert_eq!(ids, vec!["abe", "zed"]);
}

#[tokio::test]
async fn test_list_limit_zero_returns_empty_page_with_total() {
    let store = MemoryStore::new();
    store.create_agent(&agent("a", 1000, &[], vec![])).await.unwrap();
    store.create_agent(&agent("b", 1001, &[], vec![])).await.unwrap();

    let page = store.list_agents(&AgentFilter::default()).await.unwrap();
    assert!(page.agents.is_empty());
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_concurrent_creates_resolve_to_one_winner() {
    let store: Arc<dyn AgentStore> = Arc::new(MemoryStore::new());

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .create_agent(&agent("contested", 1000 + i, &[], vec![]))
                .await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(AppError::AlreadyExists(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 15);
    assert!(store.get_agent("contested").await.is_ok());
}

#[tokio::test]
async fn test_reads_see_writes_immediately() {
    let store = MemoryStore::new();
    store.create_agent(&agent("a", 1000, &[], vec![])).await.unwrap();

    let mut updated = agent("a", 1000, &["retagged"], vec![]);
    updated.updated_at = DateTime::<Utc>::from_timestamp(2000, 0).unwrap();
    store.update_agent(&updated).await.unwrap();

    let fetched = store.get_agent("a").await.unwrap();
    assert_eq!(fetched.tags, vec!["retagged".to_string()]);
    assert_eq!(fetched.created_at.timestamp(), 1000);
    assert_eq!(fetched.updated_at.timestamp(), 2000);
}
