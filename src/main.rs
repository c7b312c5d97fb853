mod s3;

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use tracing_subscriber::EnvFilter;

use s3::UploadError;

const PROFILE_NAME: &str = "basic_profile";
const BUCKET_REGION: &str = "us-west-2";
const BUCKET_NAME: &str = "dev-upload-bucket";
const FILE_PATH: &str = "data/historical-2017.csv";
const KEY_NAME: &str = "test-upload";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = s3::client_from_profile(PROFILE_NAME, BUCKET_REGION).await;

    // Each variant reports its own outcome and the run moves on regardless.
    match s3::object::upload_file(&client, BUCKET_NAME, FILE_PATH).await {
        Ok(elapsed) => println!("upload completed in {:.3} seconds", elapsed.as_secs_f64()),
        Err(err) => eprintln!("{err}"),
    }

    match s3::object::upload_file_with_key(&client, BUCKET_NAME, KEY_NAME, FILE_PATH).await {
        Ok(elapsed) => println!(
            "upload with key name completed in {:.3} seconds",
            elapsed.as_secs_f64()
        ),
        Err(err) => eprintln!("{err}"),
    }

    let streamed = match open_stream(FILE_PATH).await {
        Ok(body) => s3::object::upload_stream(&client, BUCKET_NAME, KEY_NAME, body).await,
        Err(err) => Err(err),
    };
    match streamed {
        Ok(elapsed) => println!(
            "upload from stream completed in {:.3} seconds",
            elapsed.as_secs_f64()
        ),
        Err(err) => eprintln!("{err}"),
    }

    let status = s3::multipart::track_upload(&client, BUCKET_NAME, KEY_NAME, FILE_PATH, false).await;
    println!("{status}");

    let status = s3::multipart::track_upload(&client, BUCKET_NAME, KEY_NAME, FILE_PATH, true).await;
    println!("{status}");

    Ok(())
}

async fn open_stream(path: &str) -> Result<ByteStream, UploadError> {
    let file = tokio::fs::File::open(path).await?;
    Ok(ByteStream::read_from().file(file).build().await?)
}
