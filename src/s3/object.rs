//! Whole-object uploads: one `put_object` per call, three ways to name the
//! input.

use std::path::Path;
use std::time::{Duration, Instant};

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::error::UploadError;

/// Uploads a file using its file name as the object key.
pub async fn upload_file(
    client: &Client,
    bucket: &str,
    path: impl AsRef<Path>,
) -> Result<Duration, UploadError> {
    let path = path.as_ref();
    let key = default_key(path)?;
    upload_file_with_key(client, bucket, key, path).await
}

/// Uploads a file under an explicit object key.
pub async fn upload_file_with_key(
    client: &Client,
    bucket: &str,
    key: &str,
    path: impl AsRef<Path>,
) -> Result<Duration, UploadError> {
    let body = ByteStream::from_path(path).await?;
    upload_stream(client, bucket, key, body).await
}

/// Uploads an already-open byte stream under an explicit object key. Returns
/// the elapsed wall time on success.
pub async fn upload_stream(
    client: &Client,
    bucket: &str,
    key: &str,
    body: ByteStream,
) -> Result<Duration, UploadError> {
    let start = Instant::now();
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body)
        .send()
        .await
        .map_err(UploadError::from_sdk)?;
    tracing::debug!(bucket, key, "put_object finished");
    Ok(start.elapsed())
}

fn default_key(path: &Path) -> Result<&str, UploadError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| UploadError::Network(format!("no file name in {}", path.display())))
}
