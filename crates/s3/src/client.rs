//! S3 bucket handle
//!
//! Wraps aws-sdk-s3 and implements the FolderStore trait from bfs-core for
//! a single bucket.

use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_types::retry::RetryConfig;

use bfs_core::{BucketEndpoint, Error, FolderStore, PrefixPage, Result};

/// Keys requested per listing page (the S3 maximum)
const MAX_KEYS: i32 = 1000;

/// S3 bucket handle: a configured client bound to one bucket
pub struct S3Bucket {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Bucket {
    /// Create a handle from one side's configuration.
    ///
    /// Credentials come from the named AWS CLI profile when one is set, and
    /// from the default provider chain otherwise. `max_attempts` is handed to
    /// the SDK's standard retry mode.
    pub async fn connect(endpoint: &BucketEndpoint, max_attempts: u32) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(max_attempts));

        if let Some(profile) = &endpoint.profile {
            loader = loader.profile_name(profile);
        }

        if let Some(region) = &endpoint.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some(url) = &endpoint.endpoint {
            loader = loader.endpoint_url(url);
        }

        let config = loader.load().await;

        if config.region().is_none() {
            return Err(Error::Config(format!(
                "no region configured for bucket '{}'; set a region or use a profile that has one",
                endpoint.bucket
            )));
        }

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(endpoint.path_style)
            .build();

        tracing::debug!(
            bucket = %endpoint.bucket,
            profile = endpoint.profile.as_deref().unwrap_or("default"),
            region = ?config.region(),
            "Created S3 client"
        );

        Ok(Self::from_client(
            aws_sdk_s3::Client::from_conf(s3_config),
            endpoint.bucket.clone(),
        ))
    }

    /// Bind an existing client to `bucket`
    pub fn from_client(inner: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            inner,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Format AWS SDK error into a detailed error message
fn format_sdk_error<E>(error: &SdkError<E, HttpResponse>) -> String
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    match error {
        SdkError::ServiceError(service_err) => {
            let err = service_err.err();
            let mut msg = format!("Service error: {err}");
            if let Some(code) = err.code() {
                msg.push_str(&format!(" (code: {code})"));
            }
            msg
        }
        SdkError::ConstructionFailure(err) => {
            format!("Request construction failed: {err:?}")
        }
        SdkError::TimeoutError(_) => "Request timeout".to_string(),
        SdkError::DispatchFailure(err) => {
            format!("Network dispatch error: {err:?}")
        }
        SdkError::ResponseError(err) => {
            format!("Response error: {err:?}")
        }
        _ => error.to_string(),
    }
}

/// Classify an SDK failure as a missing bucket, a permission problem, or a
/// network/service failure
fn map_sdk_error<E>(error: SdkError<E, HttpResponse>, bucket: &str) -> Error
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    let code = error
        .as_service_error()
        .and_then(|e| e.code())
        .map(str::to_string);
    let status = error.raw_response().map(|r| r.status().as_u16());
    let message = format_sdk_error(&error);

    match (code.as_deref(), status) {
        (Some("NoSuchBucket"), _) | (_, Some(404)) => {
            Error::NotFound(format!("Bucket not found: {bucket}"))
        }
        (
            Some(
                "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "ExpiredToken",
            ),
            _,
        )
        | (_, Some(401 | 403)) => Error::Auth(format!("{bucket}: {message}")),
        _ => Error::Network(format!("{bucket}: {message}")),
    }
}

/// Convert one ListObjectsV2 response into a listing page
fn page_from_output(output: &ListObjectsV2Output) -> PrefixPage {
    let prefixes: Vec<String> = output
        .common_prefixes()
        .iter()
        .filter_map(|p| p.prefix().map(str::to_string))
        .collect();

    let has_objects = output.key_count().unwrap_or(0) > 0
        || !output.contents().is_empty()
        || !prefixes.is_empty();

    // A truncated page without a token cannot be continued
    let continuation_token = if output.is_truncated().unwrap_or(false) {
        output.next_continuation_token().map(str::to_string)
    } else {
        None
    };

    PrefixPage {
        prefixes,
        has_objects,
        continuation_token,
    }
}

#[async_trait]
impl FolderStore for S3Bucket {
    async fn list_child_prefixes(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<PrefixPage> {
        let mut request = self
            .inner
            .list_objects_v2()
            .bucket(&self.bucket)
            .delimiter("/")
            .max_keys(MAX_KEYS);

        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }

        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.bucket))?;

        let page = page_from_output(&response);
        tracing::trace!(
            bucket = %self.bucket,
            prefix,
            children = page.prefixes.len(),
            more = !page.is_last(),
            "Listed child prefixes"
        );

        Ok(page)
    }

    async fn create_empty_object(&self, key: &str) -> Result<()> {
        self.inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(0)
            .body(ByteStream::from_static(b""))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.bucket))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Error;
    use aws_sdk_s3::types::{CommonPrefix, Object};
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;
    use aws_smithy_types::error::ErrorMetadata;

    fn service_error(code: &str, status: u16) -> SdkError<ListObjectsV2Error, HttpResponse> {
        let err = ListObjectsV2Error::generic(ErrorMetadata::builder().code(code).build());
        let raw = HttpResponse::new(
            StatusCode::try_from(status).expect("valid status"),
            SdkBody::empty(),
        );
        SdkError::service_error(err, raw)
    }

    #[test]
    fn test_page_from_output() {
        let output = ListObjectsV2Output::builder()
            .common_prefixes(CommonPrefix::builder().prefix("Test/a/").build())
            .common_prefixes(CommonPrefix::builder().prefix("Test/b/").build())
            .key_count(2)
            .is_truncated(true)
            .next_continuation_token("token-2")
            .build();

        let page = page_from_output(&output);
        assert_eq!(page.prefixes, vec!["Test/a/", "Test/b/"]);
        assert!(page.has_objects);
        assert_eq!(page.continuation_token.as_deref(), Some("token-2"));
    }

    #[test]
    fn test_page_with_only_files_has_objects() {
        let output = ListObjectsV2Output::builder()
            .contents(Object::builder().key("readme.txt").build())
            .is_truncated(false)
            .build();

        let page = page_from_output(&output);
        assert!(page.prefixes.is_empty());
        assert!(page.has_objects);
        assert!(page.is_last());
    }

    #[test]
    fn test_empty_page() {
        let output = ListObjectsV2Output::builder().key_count(0).build();
        let page = page_from_output(&output);
        assert!(!page.has_objects);
        assert!(page.is_last());
    }

    #[test]
    fn test_untruncated_page_ignores_token() {
        let output = ListObjectsV2Output::builder()
            .is_truncated(false)
            .next_continuation_token("stale")
            .build();
        assert!(page_from_output(&output).is_last());
    }

    #[test]
    fn test_map_no_such_bucket() {
        let err = map_sdk_error(service_error("NoSuchBucket", 404), "b1-ncloud-dev");
        assert!(matches!(err, Error::NotFound(ref m) if m.contains("b1-ncloud-dev")));
    }

    #[test]
    fn test_map_access_denied() {
        let err = map_sdk_error(service_error("AccessDenied", 403), "prod");
        assert!(matches!(err, Error::Auth(_)));

        let err = map_sdk_error(service_error("InvalidAccessKeyId", 400), "prod");
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_map_other_service_error() {
        let err = map_sdk_error(service_error("SlowDown", 503), "prod");
        assert!(matches!(err, Error::Network(ref m) if m.contains("SlowDown")));
        assert!(err.is_remote_access());
    }

    #[test]
    fn test_map_timeout() {
        let err: SdkError<ListObjectsV2Error, HttpResponse> =
            SdkError::timeout_error("deadline exceeded");
        let err = map_sdk_error(err, "prod");
        assert!(matches!(err, Error::Network(ref m) if m.contains("timeout")));
    }

    #[tokio::test]
    async fn test_connect_with_explicit_region() {
        let mut endpoint = BucketEndpoint::new("b1-ncloud-dev");
        endpoint.region = Some("eu-west-1".to_string());
        endpoint.endpoint = Some("http://localhost:9000".to_string());
        endpoint.path_style = true;

        let bucket = S3Bucket::connect(&endpoint, 2).await.unwrap();
        assert_eq!(bucket.bucket(), "b1-ncloud-dev");
        assert_eq!(
            bucket.inner.config().region().map(|r| r.as_ref()),
            Some("eu-west-1")
        );
    }
}
