/// Live test against a real S3 bucket.
///
/// Skipped unless a bucket is configured. Run with:
///   BUCKETDROP_TEST_BUCKET=my-test-bucket \
///   AWS_REGION=us-east-1 \
///   cargo test -p bucketdrop-storage --test s3_live -- --nocapture
#[cfg(feature = "s3")]
mod s3_tests {
    use std::io::{Seek, SeekFrom, Write};

    use bucketdrop_storage::ObjectStore;
    use bucketdrop_storage::s3::S3ObjectStore;

    async fn get_store() -> Option<S3ObjectStore> {
        let bucket = std::env::var("BUCKETDROP_TEST_BUCKET").ok()?;
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        S3ObjectStore::new(&bucket, &region).await.ok()
    }

    #[tokio::test]
    async fn s3_put_then_list() {
        let Some(store) = get_store().await else {
            eprintln!("SKIP: BUCKETDROP_TEST_BUCKET not set");
            return;
        };

        store.test_connection().await.expect("connection failed");
        println!("OK: S3 connection");

        let mut f = tempfile::tempfile().unwrap();
        f.write_all(b"Hello from bucketdrop integration test").unwrap();
        f.seek(SeekFrom::Start(0)).unwrap();

        let key = "bucketdrop-test/integration.txt";
        store
            .put(key, tokio::fs::File::from_std(f))
            .await
            .expect("put failed");
        println!("OK: S3 put");

        let keys = store.list("bucketdrop-test/").await.expect("list failed");
        assert!(keys.iter().any(|k| k == key));
        println!("OK: S3 list contains {key}");
    }
}
