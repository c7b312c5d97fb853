//! Multipart transfer with per-part progress, plus the bucket-side helpers
//! that go with it (stale-upload cleanup, transfer acceleration).

use std::ops::Range;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

use aws_sdk_s3::primitives::{ByteStream, DateTime};
use aws_sdk_s3::types::{
    AccelerateConfiguration, BucketAccelerateStatus, CompletedMultipartUpload, CompletedPart,
    ObjectCannedAcl, StorageClass,
};
use aws_sdk_s3::Client;
use bytes::Bytes;
use thiserror::Error;

use super::error::UploadError;
use super::progress;

pub const PART_SIZE: u64 = 16_777_216;
const MIN_PART_SIZE: u64 = 5_242_880;
const MAX_PARTS: u64 = 10_000;

/// How long an in-progress multipart upload may linger before the failure
/// cleanup path aborts it.
pub const STALE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// Rejections from the part planner.
#[derive(Debug, PartialEq, Error)]
pub enum PartPlanError {
    #[error("part size {0} is below the {MIN_PART_SIZE}-byte minimum")]
    PartTooSmall(u64),
    #[error("{0} parts exceed the {MAX_PARTS}-part limit")]
    TooManyParts(u64),
}

impl From<PartPlanError> for UploadError {
    fn from(err: PartPlanError) -> Self {
        UploadError::Network(err.to_string())
    }
}

/// Splits `total_len` bytes into `part_size` ranges, any remainder becoming a
/// short final part. An empty input still plans one empty part so the upload
/// can complete; S3 waives the minimum for a sole part.
pub fn plan_parts(total_len: u64, part_size: u64) -> Result<Vec<Range<u64>>, PartPlanError> {
    if total_len <= part_size {
        return Ok(vec![0..total_len]);
    }
    if part_size < MIN_PART_SIZE {
        return Err(PartPlanError::PartTooSmall(part_size));
    }
    let count = total_len.div_ceil(part_size);
    if count > MAX_PARTS {
        return Err(PartPlanError::TooManyParts(count));
    }
    Ok((0..count)
        .map(|i| i * part_size..u64::min((i + 1) * part_size, total_len))
        .collect())
}

/// Runs a full multipart upload of `path`, invoking `hook` with
/// (transferred bytes, total bytes) after every part. Parts go up one at a
/// time. Returns the elapsed wall time.
pub async fn upload<F>(
    client: &Client,
    bucket: &str,
    key: &str,
    path: impl AsRef<Path>,
    hook: F,
) -> Result<Duration, UploadError>
where
    F: Fn(u64, u64),
{
    let start = Instant::now();

    let data: Bytes = ByteStream::from_path(path)
        .await?
        .collect()
        .await?
        .into_bytes();
    let total = data.len() as u64;
    let parts = plan_parts(total, PART_SIZE)?;

    let created = client
        .create_multipart_upload()
        .bucket(bucket)
        .key(key)
        .acl(ObjectCannedAcl::PublicRead)
        .storage_class(StorageClass::ReducedRedundancy)
        .send()
        .await
        .map_err(UploadError::from_sdk)?;
    let upload_id = created
        .upload_id()
        .ok_or_else(|| {
            UploadError::Network("create_multipart_upload returned no upload id".into())
        })?
        .to_owned();

    let mut completed_parts = Vec::with_capacity(parts.len());
    let mut transferred = 0u64;
    for (idx, range) in parts.iter().enumerate() {
        let part_number = idx as i32 + 1;
        let chunk = data.slice(range.start as usize..range.end as usize);
        let uploaded = client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(&upload_id)
            .part_number(part_number)
            .body(ByteStream::from(chunk))
            .send()
            .await
            .map_err(UploadError::from_sdk)?;

        completed_parts.push(
            CompletedPart::builder()
                .part_number(part_number)
                .set_e_tag(uploaded.e_tag().map(str::to_owned))
                .build(),
        );
        transferred += range.end - range.start;
        tracing::debug!(part_number, transferred, total, "part uploaded");
        hook(transferred, total);
    }

    client
        .complete_multipart_upload()
        .bucket(bucket)
        .key(key)
        .upload_id(&upload_id)
        .multipart_upload(
            CompletedMultipartUpload::builder()
                .set_parts(Some(completed_parts))
                .build(),
        )
        .send()
        .await
        .map_err(UploadError::from_sdk)?;

    Ok(start.elapsed())
}

/// Aborts every in-progress multipart upload in the bucket that was initiated
/// more than `older_than` ago. Returns how many were aborted.
pub async fn abort_stale_uploads(
    client: &Client,
    bucket: &str,
    older_than: Duration,
) -> Result<usize, UploadError> {
    let cutoff = DateTime::from(SystemTime::now() - older_than);
    let listing = client
        .list_multipart_uploads()
        .bucket(bucket)
        .send()
        .await
        .map_err(UploadError::from_sdk)?;

    let mut aborted = 0;
    for upload in listing.uploads() {
        let (Some(key), Some(upload_id)) = (upload.key(), upload.upload_id()) else {
            continue;
        };
        if upload.initiated().is_some_and(|initiated| *initiated < cutoff) {
            client
                .abort_multipart_upload()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .send()
                .await
                .map_err(UploadError::from_sdk)?;
            tracing::info!(key, upload_id, "aborted stale multipart upload");
            aborted += 1;
        }
    }
    Ok(aborted)
}

/// Switches the bucket's transfer-acceleration endpoint on.
pub async fn enable_transfer_acceleration(
    client: &Client,
    bucket: &str,
) -> Result<(), UploadError> {
    client
        .put_bucket_accelerate_configuration()
        .bucket(bucket)
        .accelerate_configuration(
            AccelerateConfiguration::builder()
                .status(BucketAccelerateStatus::Enabled)
                .build(),
        )
        .send()
        .await
        .map_err(UploadError::from_sdk)?;
    Ok(())
}

/// Uploads `path` as a tracked multipart transfer and reduces the outcome to
/// a status string: "OK" on success, otherwise the failure's prefixed
/// message. Either failure path also makes a best-effort sweep of stale
/// uploads left in the bucket.
pub async fn track_upload(
    client: &Client,
    bucket: &str,
    key: &str,
    path: impl AsRef<Path>,
    accelerate: bool,
) -> String {
    let result = async {
        if accelerate {
            enable_transfer_acceleration(client, bucket).await?;
        }
        upload(client, bucket, key, path, progress::report).await
    }
    .await;

    match result {
        Ok(elapsed) => {
            println!(
                "multipart upload of {key} completed in {:.3} seconds",
                elapsed.as_secs_f64()
            );
            "OK".to_owned()
        }
        Err(err) => {
            if let Err(cleanup) = abort_stale_uploads(client, bucket, STALE_AFTER).await {
                tracing::warn!(%cleanup, "stale upload cleanup failed");
            }
            err.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use aws_sdk_s3::config::BehaviorVersion;

    use super::*;

    #[test]
    fn plans_exact_division() {
        let parts = plan_parts(PART_SIZE * 3, PART_SIZE).unwrap();
        assert_eq!(
            parts,
            vec![0..PART_SIZE, PART_SIZE..PART_SIZE * 2, PART_SIZE * 2..PART_SIZE * 3]
        );
    }

    #[test]
    fn remainder_becomes_short_final_part() {
        let parts = plan_parts(PART_SIZE * 2 + 5, PART_SIZE).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2], PART_SIZE * 2..PART_SIZE * 2 + 5);
    }

    #[test]
    fn small_file_is_a_single_part() {
        assert_eq!(plan_parts(10, PART_SIZE).unwrap(), vec![0..10]);
    }

    #[test]
    fn empty_file_still_plans_one_part() {
        assert_eq!(plan_parts(0, PART_SIZE).unwrap(), vec![0..0]);
    }

    #[test]
    fn part_count_is_capped() {
        let total = PART_SIZE * (MAX_PARTS + 1);
        assert_eq!(
            plan_parts(total, PART_SIZE),
            Err(PartPlanError::TooManyParts(MAX_PARTS + 1))
        );
    }

    #[test]
    fn undersized_parts_are_rejected() {
        let part_size = MIN_PART_SIZE - 1;
        assert_eq!(
            plan_parts(part_size * 2, part_size),
            Err(PartPlanError::PartTooSmall(part_size))
        );
    }

    #[test]
    fn plans_from_on_disk_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 1024]).unwrap();
        let len = std::fs::metadata(file.path()).unwrap().len();
        assert_eq!(plan_parts(len, PART_SIZE).unwrap(), vec![0..1024]);
    }

    #[tokio::test]
    async fn missing_file_is_a_network_error() {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        let client = Client::from_conf(conf);
        let err = upload(&client, "bucket", "key", "/no/such/file", |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Network(_)));
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials and a writable bucket"]
    async fn multipart_roundtrip_against_real_bucket() {
        let bucket = std::env::var("AWSBUCKET").unwrap();
        let client = crate::s3::client_from_profile("basic_profile", "us-west-2").await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"multipart roundtrip").unwrap();
        let status = track_upload(&client, &bucket, "multipart-test.txt", file.path(), false).await;
        assert_eq!(status, "OK");
    }
}
