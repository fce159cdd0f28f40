//! Embedding client tests
//!
//! Verifies the HTTP wire contract of `HttpEmbedder` against a mock
//! server: request shape, response validation, and failure surfacing.

use hermes::embedding::{Embedder, HttpEmbedder};
use hermes::types::AppError;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_embed_posts_texts_and_returns_vectors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .and(body_json(json!({"texts": ["alpha", "beta"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0, 0.0, 0.0], [0.7, 0.7, 0.0, 0.0]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(server.uri(), 4);
    let vectors = embedder
        .embed(&["alpha".to_string(), "beta".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0], vec![1.0, 0.0, 0.0, 0.0]);
    assert_eq!(vectors[1], vec![0.7, 0.7, 0.0, 0.0]);
}

#[tokio::test]
async fn test_error_status_surfaces_as_embedding_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(server.uri(), 4);
    let result = embedder.embed(&["alpha".to_string()]).await;

    match result {
        Err(AppError::Embedding(msg)) => assert!(msg.contains("500")),
        other => panic!("expected embedding error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_embedding_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(server.uri(), 4);
    assert!(matches!(
        embedder.embed(&["alpha".to_string()]).await,
        Err(AppError::Embedding(_))
    ));
}

#[tokio::test]
async fn test_vector_count_mismatch_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0, 0.0, 0.0]]
        })))
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(server.uri(), 4);
    let result = embedder
        .embed(&["alpha".to_string(), "beta".to_string()])
        .await;

    match result {
        Err(AppError::Embedding(msg)) => assert!(msg.contains("count mismatch")),
        other => panic!("expected embedding error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_vector_dimension_mismatch_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0]]
        })))
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(server.uri(), 4);
    let result = embedder.embed(&["alpha".to_string()]).await;

    match result {
        Err(AppError::Embedding(msg)) => assert!(msg.contains("dimension mismatch")),
        other => panic!("expected embedding error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_order_preserved_across_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]]
        })))
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(server.uri(), 2);
    let vectors = embedder
        .embed(&["first".to_string(), "second".to_string(), "third".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors[0], vec![1.0, 0.0]);
    assert_eq!(vectors[1], vec![0.0, 1.0]);
    assert_eq!(vectors[2], vec![0.5, 0.5]);
}
