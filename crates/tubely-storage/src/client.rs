//! S3 client implementation.

use std::path::Path;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Default region when `S3_REGION` is unset.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Signed query parameter that makes every presigned URL unique.
///
/// SigV4 timestamps have one-second resolution, so without it two URLs
/// issued within the same second are identical. S3 ignores the parameter.
pub const PRESIGN_NONCE_PARAM: &str = "tubely-nonce";

/// Configuration for the S3 client.
#[derive(Clone)]
pub struct S3Config {
    /// Bucket name
    pub bucket_name: String,
    /// Region
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    pub endpoint_url: Option<String>,
    /// Access key ID; the default AWS credential chain is used when unset
    pub access_key_id: Option<String>,
    /// Secret access key
    pub secret_access_key: Option<String>,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("static_credentials", &self.access_key_id.is_some())
            .finish()
    }
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            bucket_name: std::env::var("S3_BUCKET")
                .map_err(|_| StorageError::config_error("S3_BUCKET not set"))?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            endpoint_url: std::env::var("S3_ENDPOINT_URL").ok(),
            access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
        })
    }
}

/// S3 storage client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3Client {
    /// Create a new S3 client from configuration.
    ///
    /// Static keys are used when both are configured; otherwise credentials
    /// come from the default AWS provider chain.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        if config.bucket_name.is_empty() {
            return Err(StorageError::config_error("bucket name is empty"));
        }

        let builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let credentials =
                    Credentials::new(access_key_id, secret_access_key, None, None, "tubely");
                Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .credentials_provider(credentials)
            }
            (None, None) => {
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .load()
                    .await;
                Builder::from(&sdk_config)
            }
            _ => {
                return Err(StorageError::config_error(
                    "S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set together",
                ))
            }
        };

        let builder = match &config.endpoint_url {
            Some(endpoint) => builder.endpoint_url(endpoint).force_path_style(true),
            None => builder,
        };

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket_name,
            region: config.region,
            endpoint_url: config.endpoint_url,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    /// Bucket configured for this client.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Unsigned URL of an object, only readable if the bucket is public.
    ///
    /// Path style against a custom endpoint, virtual-hosted style on AWS.
    pub fn public_url(&self, key: &str) -> String {
        match &self.endpoint_url {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.bucket,
                key
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()> {
        debug!("Uploading {} to s3://{}/{}", path.display(), bucket, key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to s3://{}/{}", path.display(), bucket, key);
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
        issued_at: SystemTime,
    ) -> StorageResult<String> {
        let presign_config = PresigningConfig::builder()
            .start_time(issued_at)
            .expires_in(expires_in)
            .build()
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        let nonce = Uuid::new_v4().simple().to_string();

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .customize()
            .mutate_request(move |request| {
                let separator = if request.uri().contains('?') { '&' } else { '?' };
                let uri = format!(
                    "{}{}{}={}",
                    request.uri(),
                    separator,
                    PRESIGN_NONCE_PARAM,
                    nonce
                );
                if request.set_uri(uri).is_err() {
                    warn!("Failed to attach nonce to presigned request");
                }
            })
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(endpoint_url: Option<&str>) -> S3Config {
        S3Config {
            bucket_name: "tubely-videos".to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: endpoint_url.map(String::from),
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
        }
    }

    #[tokio::test]
    async fn test_public_url_virtual_hosted() {
        let client = S3Client::new(test_config(None)).await.unwrap();
        assert_eq!(
            client.public_url("landscape/vid1.mp4"),
            "https://tubely-videos.s3.us-east-1.amazonaws.com/landscape/vid1.mp4"
        );
    }

    #[tokio::test]
    async fn test_public_url_custom_endpoint() {
        let client = S3Client::new(test_config(Some("http://localhost:9000/")))
            .await
            .unwrap();
        assert_eq!(
            client.public_url("portrait/vid2.mp4"),
            "http://localhost:9000/tubely-videos/portrait/vid2.mp4"
        );
    }

    #[tokio::test]
    async fn test_rejects_partial_static_credentials() {
        let mut config = test_config(None);
        config.secret_access_key = None;
        assert!(matches!(
            S3Client::new(config).await,
            Err(StorageError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_presign_get_is_offline_and_embeds_key() {
        let client = S3Client::new(test_config(Some("http://localhost:9000")))
            .await
            .unwrap();

        let url = client
            .presign_get(
                "tubely-videos",
                "landscape/vid1.mp4",
                Duration::from_secs(300),
                SystemTime::now(),
            )
            .await
            .unwrap();

        let parsed = url::Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/tubely-videos/landscape/vid1.mp4");
        assert!(parsed
            .query_pairs()
            .any(|(k, v)| k == "X-Amz-Expires" && v == "300"));
        assert!(parsed.query_pairs().any(|(k, _)| k == "X-Amz-Signature"));
        assert!(parsed
            .query_pairs()
            .any(|(k, v)| k == PRESIGN_NONCE_PARAM && v.len() == 32));
    }

    #[tokio::test]
    async fn test_presign_get_same_instant_still_unique() {
        let client = S3Client::new(test_config(Some("http://localhost:9000")))
            .await
            .unwrap();
        let issued_at = SystemTime::now();

        let first = client
            .presign_get(
                "tubely-videos",
                "landscape/vid1.mp4",
                Duration::from_secs(300),
                issued_at,
            )
            .await
            .unwrap();
        let second = client
            .presign_get(
                "tubely-videos",
                "landscape/vid1.mp4",
                Duration::from_secs(300),
                issued_at,
            )
            .await
            .unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", test_config(None));
        assert!(!debug.contains("EXAMPLEKEY"));
        assert!(debug.contains("static_credentials: true"));
    }
}
