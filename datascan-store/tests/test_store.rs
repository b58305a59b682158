//! Integration tests for the store adapter
//!
//! These run against a live PostgreSQL instance and are skipped when
//! `DATASCAN_TEST_DATABASE_URL` is not set.

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use datascan_core::domain::{JobProgress, JobStatus, NewFinding, ObjectStatus};
use datascan_store::{FindingsQuery, ScanStore, StoreError, run_migrations};

async fn test_store() -> Option<ScanStore> {
    let url = match std::env::var("DATASCAN_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: DATASCAN_TEST_DATABASE_URL not set");
            return None;
        }
    };

    let pool: PgPool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("failed to connect to test database");

    run_migrations(&pool).await.expect("migrations failed");
    Some(ScanStore::new(pool))
}

fn finding(job_id: Uuid, bucket: &str, detector: &str, offset: i64) -> NewFinding {
    NewFinding {
        job_id,
        bucket: bucket.to_string(),
        key: "data/records.csv".to_string(),
        etag: "etag-1".to_string(),
        detector: detector.to_string(),
        masked_match: "***-**-6789".to_string(),
        context: "Employee SSN: ***".to_string(),
        byte_offset: offset,
    }
}

/// Fresh bucket name per test so runs never interfere through the global
/// uniqueness index on findings.
fn unique_bucket() -> String {
    format!("bucket-{}", Uuid::new_v4())
}

#[tokio::test]
async fn create_and_get_job_round_trips() {
    let Some(store) = test_store().await else { return };

    let job_id = Uuid::new_v4();
    let bucket = unique_bucket();
    store
        .create_job(job_id, &bucket, "logs/", Utc::now())
        .await
        .unwrap();

    let job = store.get_job(job_id).await.unwrap();
    assert_eq!(job.job_id, job_id);
    assert_eq!(job.bucket, bucket);
    assert_eq!(job.prefix, "logs/");

    // Duplicate id must be rejected
    assert!(store.create_job(job_id, &bucket, "", Utc::now()).await.is_err());
}

#[tokio::test]
async fn get_missing_job_is_not_found() {
    let Some(store) = test_store().await else { return };

    match store.get_job(Uuid::new_v4()).await {
        Err(StoreError::JobNotFound(_)) => {}
        other => panic!("expected JobNotFound, got {:?}", other.map(|j| j.job_id)),
    }
}

#[tokio::test]
async fn upsert_object_is_idempotent_on_natural_key() {
    let Some(store) = test_store().await else { return };

    let job_id = Uuid::new_v4();
    let bucket = unique_bucket();
    store.create_job(job_id, &bucket, "", Utc::now()).await.unwrap();

    for _ in 0..3 {
        store
            .upsert_object(job_id, &bucket, "a.txt", "etag-1", Utc::now())
            .await
            .unwrap();
    }

    let counts = store.count_objects_by_status(job_id).await.unwrap();
    assert_eq!(counts.queued, 1);
    assert_eq!(counts.total(), 1);
}

#[tokio::test]
async fn status_sequence_converges_to_last_terminal_write() {
    let Some(store) = test_store().await else { return };

    let job_id = Uuid::new_v4();
    let bucket = unique_bucket();
    store.create_job(job_id, &bucket, "", Utc::now()).await.unwrap();
    store
        .upsert_object(job_id, &bucket, "a.txt", "etag-1", Utc::now())
        .await
        .unwrap();

    for (status, error) in [
        (ObjectStatus::Processing, None),
        (ObjectStatus::Failed, Some("connection reset")),
        (ObjectStatus::Processing, None),
        (ObjectStatus::Succeeded, None),
    ] {
        store
            .set_object_status(job_id, &bucket, "a.txt", "etag-1", status, error)
            .await
            .unwrap();
    }

    let counts = store.count_objects_by_status(job_id).await.unwrap();
    assert_eq!(counts.succeeded, 1);
    assert_eq!(counts.failed, 0);
}

#[tokio::test]
async fn insert_findings_deduplicates_on_identity_tuple() {
    let Some(store) = test_store().await else { return };

    let job_id = Uuid::new_v4();
    let bucket = unique_bucket();
    store.create_job(job_id, &bucket, "", Utc::now()).await.unwrap();

    let batch = vec![
        finding(job_id, &bucket, "SSN", 14),
        finding(job_id, &bucket, "SSN", 90),
        finding(job_id, &bucket, "EMAIL", 14),
    ];

    let first = store.insert_findings(&batch).await.unwrap();
    assert_eq!(first, 3);

    // Re-delivery of the same object version inserts nothing new
    let second = store.insert_findings(&batch).await.unwrap();
    assert_eq!(second, 0);

    assert_eq!(store.count_findings(job_id).await.unwrap(), 3);
}

#[tokio::test]
async fn insert_findings_dedup_is_order_independent() {
    let Some(store) = test_store().await else { return };

    let job_id = Uuid::new_v4();
    let bucket = unique_bucket();
    store.create_job(job_id, &bucket, "", Utc::now()).await.unwrap();

    let a = finding(job_id, &bucket, "SSN", 14);
    let b = finding(job_id, &bucket, "SSN", 90);

    // Overlapping batches in different orders: the row set is the dedup of
    // the multiset regardless
    let inserted = store
        .insert_findings(&[a.clone(), b.clone(), a.clone()])
        .await
        .unwrap();
    assert_eq!(inserted, 2);
    let inserted = store.insert_findings(&[b, a]).await.unwrap();
    assert_eq!(inserted, 0);

    assert_eq!(store.count_findings(job_id).await.unwrap(), 2);
}

#[tokio::test]
async fn completed_job_reports_full_progress() {
    let Some(store) = test_store().await else { return };

    let job_id = Uuid::new_v4();
    let bucket = unique_bucket();
    store.create_job(job_id, &bucket, "", Utc::now()).await.unwrap();

    for key in ["a.txt", "b.txt", "c.txt"] {
        store
            .upsert_object(job_id, &bucket, key, "etag-1", Utc::now())
            .await
            .unwrap();
        store
            .set_object_status(job_id, &bucket, key, "etag-1", ObjectStatus::Succeeded, None)
            .await
            .unwrap();
    }

    let counts = store.count_objects_by_status(job_id).await.unwrap();
    assert_eq!(
        (counts.queued, counts.processing, counts.succeeded, counts.failed),
        (0, 0, 3, 0)
    );
    assert_eq!(JobStatus::from_counts(&counts), JobStatus::Completed);
    assert_eq!(JobProgress::from_counts(&counts).percentage, 100);
}

#[tokio::test]
async fn pagination_yields_strictly_ascending_ids() {
    let Some(store) = test_store().await else { return };

    let job_id = Uuid::new_v4();
    let bucket = unique_bucket();
    store.create_job(job_id, &bucket, "", Utc::now()).await.unwrap();

    let batch: Vec<NewFinding> = (0..25)
        .map(|i| finding(job_id, &bucket, "SSN", i * 10))
        .collect();
    assert_eq!(store.insert_findings(&batch).await.unwrap(), 25);

    let mut seen: Vec<i64> = Vec::new();
    let mut cursor = None;
    loop {
        let page = store
            .list_findings(&FindingsQuery {
                bucket: Some(bucket.clone()),
                prefix: None,
                limit: 10,
                cursor,
            })
            .await
            .unwrap();
        if page.is_empty() {
            break;
        }
        seen.extend(page.iter().map(|f| f.id));
        cursor = page.last().map(|f| f.id);
    }

    assert_eq!(seen.len(), 25);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn list_findings_filters_by_bucket_and_prefix() {
    let Some(store) = test_store().await else { return };

    let job_id = Uuid::new_v4();
    let bucket = unique_bucket();
    store.create_job(job_id, &bucket, "", Utc::now()).await.unwrap();

    let mut batch = vec![finding(job_id, &bucket, "SSN", 0)];
    batch.push(NewFinding {
        key: "other/place.txt".to_string(),
        ..finding(job_id, &bucket, "SSN", 7)
    });
    store.insert_findings(&batch).await.unwrap();

    let page = store
        .list_findings(&FindingsQuery {
            bucket: Some(bucket.clone()),
            prefix: Some("data/".to_string()),
            limit: 100,
            cursor: None,
        })
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].key, "data/records.csv");

    // An unrelated bucket sees nothing
    let page = store
        .list_findings(&FindingsQuery {
            bucket: Some(unique_bucket()),
            prefix: None,
            limit: 100,
            cursor: None,
        })
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn list_findings_rejects_out_of_range_limits() {
    let Some(store) = test_store().await else { return };

    for limit in [0, 1001, -5] {
        let result = store
            .list_findings(&FindingsQuery {
                limit,
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(StoreError::InvalidLimit(_))));
    }
}

#[tokio::test]
async fn delete_job_cascades() {
    let Some(store) = test_store().await else { return };

    let job_id = Uuid::new_v4();
    let bucket = unique_bucket();
    store.create_job(job_id, &bucket, "", Utc::now()).await.unwrap();
    store
        .upsert_object(job_id, &bucket, "a.txt", "etag-1", Utc::now())
        .await
        .unwrap();
    store
        .insert_findings(&[finding(job_id, &bucket, "SSN", 14)])
        .await
        .unwrap();

    store.delete_job(job_id).await.unwrap();

    assert!(matches!(
        store.get_job(job_id).await,
        Err(StoreError::JobNotFound(_))
    ));
    assert_eq!(store.count_findings(job_id).await.unwrap(), 0);
    assert_eq!(store.count_objects_by_status(job_id).await.unwrap().total(), 0);

    // Deleting again reports not-found
    assert!(matches!(
        store.delete_job(job_id).await,
        Err(StoreError::JobNotFound(_))
    ));
}
