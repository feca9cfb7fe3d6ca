#[cfg(feature = "s3")]
mod inner {
    use async_trait::async_trait;
    use aws_sdk_s3::Client;
    use aws_sdk_s3::error::DisplayErrorContext;
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::ObjectCannedAcl;
    use tokio::fs::File;

    use crate::error::StoreError;
    use crate::provider::ObjectStore;

    /// AWS S3 backend.
    ///
    /// Credentials come from the SDK's default chain: environment variables,
    /// shared config/credentials files, web identity, then container and
    /// instance metadata.
    pub struct S3ObjectStore {
        client: Client,
        bucket: String,
    }

    impl S3ObjectStore {
        /// Build the client once for the whole process. Credentials are only
        /// resolved on the first request; see `test_connection`.
        pub async fn new(bucket: &str, region: &str) -> anyhow::Result<Self> {
            let sdk_config = aws_config::from_env()
                .region(aws_config::Region::new(region.to_string()))
                .load()
                .await;

            tracing::debug!(bucket, region, "S3 client configured");

            Ok(Self::from_client(Client::new(&sdk_config), bucket))
        }

        pub fn from_client(client: Client, bucket: &str) -> Self {
            Self {
                client,
                bucket: bucket.to_string(),
            }
        }

        pub fn bucket(&self) -> &str {
            &self.bucket
        }
    }

    #[async_trait]
    impl ObjectStore for S3ObjectStore {
        async fn put(&self, key: &str, body: File) -> Result<(), StoreError> {
            let body = ByteStream::read_from()
                .file(body)
                .build()
                .await
                .map_err(|e| StoreError::put(key, DisplayErrorContext(&e)))?;

            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(body)
                .acl(ObjectCannedAcl::Private)
                .send()
                .await
                .map_err(|e| StoreError::put(key, DisplayErrorContext(&e)))?;
            Ok(())
        }

        async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .send()
                .await
                .map_err(|e| StoreError::list(prefix, DisplayErrorContext(&e)))?;

            if resp.is_truncated().unwrap_or(false) {
                tracing::warn!(prefix, "listing truncated, returning first page only");
            }

            Ok(resp
                .contents()
                .iter()
                .filter_map(|o| o.key().map(str::to_string))
                .collect())
        }

        async fn test_connection(&self) -> Result<(), StoreError> {
            self.client
                .head_bucket()
                .bucket(&self.bucket)
                .send()
                .await
                .map_err(|e| StoreError::Connection {
                    bucket: self.bucket.clone(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;
            Ok(())
        }

        fn name(&self) -> &str {
            "s3"
        }
    }
}

#[cfg(feature = "s3")]
pub use inner::S3ObjectStore;
