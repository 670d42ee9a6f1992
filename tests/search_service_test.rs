//! Integration tests for the similarity search service.

mod common;

use std::sync::Arc;

use common::MockEmbeddingProvider;
use fooddb::adapters::sqlite::{SqliteFoodSource, SqliteVectorStore};
use fooddb::domain::errors::DomainError;
use fooddb::domain::models::RecordEmbedding;
use fooddb::domain::ports::VectorIndex;
use fooddb::services::SearchService;

const MODEL: &str = "mock-embedding-model";

struct Fixture {
    _dir: tempfile::TempDir,
    records: Arc<SqliteFoodSource>,
    index: Arc<SqliteVectorStore>,
}

/// Store with three foods whose cosine distances to the query vector
/// `[1, 0, 0, 0]` are 0.1 (id 42), 0.3 (id 7), and 1.0 (id 99).
async fn setup_ranked_store() -> Fixture {
    let (dir, pool) = common::setup_pool().await;
    common::create_food_table(&pool).await;
    common::insert_food(&pool, 42, "Butter, salted").await;
    common::insert_food(&pool, 7, "Bread, whole wheat").await;
    common::insert_food(&pool, 99, "Gravel, decorative").await;

    let index = Arc::new(SqliteVectorStore::new(pool.clone()).await);
    index.ensure_schema(4).await.unwrap();
    index
        .bulk_insert(&[
            RecordEmbedding::new(42, vec![0.9, (1.0f32 - 0.81).sqrt(), 0.0, 0.0], MODEL),
            RecordEmbedding::new(7, vec![0.7, (1.0f32 - 0.49).sqrt(), 0.0, 0.0], MODEL),
            RecordEmbedding::new(99, vec![0.0, 1.0, 0.0, 0.0], MODEL),
        ])
        .await
        .unwrap();

    Fixture {
        _dir: dir,
        records: Arc::new(SqliteFoodSource::new(pool)),
        index,
    }
}

fn query_provider() -> Arc<MockEmbeddingProvider> {
    Arc::new(MockEmbeddingProvider::new(4).with_fixed_vector(vec![1.0, 0.0, 0.0, 0.0]))
}

#[tokio::test]
async fn test_results_ranked_by_descending_similarity() {
    let fixture = setup_ranked_store().await;
    let service = SearchService::new(query_provider(), fixture.index.clone(), fixture.records.clone());

    let hits = service.search("creamy butter", 2).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].fdc_id, 42);
    assert_eq!(hits[1].fdc_id, 7);
    assert_eq!(hits[0].description, "Butter, salted");
    assert!(hits[0].similarity > hits[1].similarity);
    assert!((hits[0].similarity - 0.95).abs() < 1e-2);
    assert!((hits[1].similarity - 0.85).abs() < 1e-2);
    for hit in &hits {
        assert!((0.0..=1.0).contains(&hit.similarity));
    }
}

#[tokio::test]
async fn test_empty_query_rejected() {
    let fixture = setup_ranked_store().await;
    let service = SearchService::new(query_provider(), fixture.index.clone(), fixture.records.clone());

    assert!(matches!(
        service.search("", 5).await,
        Err(DomainError::InvalidQuery)
    ));
    assert!(matches!(
        service.search("   \t", 5).await,
        Err(DomainError::InvalidQuery)
    ));
}

#[tokio::test]
async fn test_unconfigured_provider_fails_before_round_trip() {
    let fixture = setup_ranked_store().await;
    let provider = Arc::new(
        MockEmbeddingProvider::new(4)
            .with_fixed_vector(vec![1.0, 0.0, 0.0, 0.0])
            .unconfigured(),
    );
    let service = SearchService::new(provider.clone(), fixture.index.clone(), fixture.records.clone());

    let result = service.search("butter", 5).await;
    assert!(matches!(result, Err(DomainError::ServiceUnavailable(_))));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_zero_k_returns_empty_without_embedding() {
    let fixture = setup_ranked_store().await;
    let provider = query_provider();
    let service = SearchService::new(provider.clone(), fixture.index.clone(), fixture.records.clone());

    let hits = service.search("butter", 0).await.unwrap();
    assert!(hits.is_empty());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_orphan_embedding_skipped_in_results() {
    let fixture = setup_ranked_store().await;

    // An embedding with no backing food row, closer than everything else.
    fixture
        .index
        .bulk_insert(&[RecordEmbedding::new(
            500,
            vec![1.0, 0.0, 0.0, 0.0],
            MODEL,
        )])
        .await
        .unwrap();

    let service = SearchService::new(query_provider(), fixture.index.clone(), fixture.records.clone());
    let hits = service.search("butter", 3).await.unwrap();

    assert!(hits.iter().all(|h| h.fdc_id != 500));
    assert_eq!(hits[0].fdc_id, 42);
}

#[tokio::test]
async fn test_search_on_empty_index() {
    let (_dir, pool) = common::setup_pool().await;
    common::create_food_table(&pool).await;
    let index = Arc::new(SqliteVectorStore::new(pool.clone()).await);
    index.ensure_schema(4).await.unwrap();

    let service = SearchService::new(
        query_provider(),
        index,
        Arc::new(SqliteFoodSource::new(pool)),
    );

    let hits = service.search("anything", 5).await.unwrap();
    assert!(hits.is_empty());
}
