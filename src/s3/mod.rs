pub mod error;
pub mod multipart;
pub mod object;
pub mod progress;

pub use error::UploadError;

use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_types::region::Region;

/// Builds an S3 client with credentials resolved from a named profile in the
/// local credential chain. Region preference: the caller's region, then the
/// environment's default provider, then us-west-2.
pub async fn client_from_profile(profile: &str, region: &str) -> Client {
    let region_provider = RegionProviderChain::first_try(Region::new(region.to_owned()))
        .or_default_provider()
        .or_else(Region::new("us-west-2"));
    let config = aws_config::defaults(BehaviorVersion::latest())
        .profile_name(profile)
        .region(region_provider)
        .load()
        .await;
    Client::new(&config)
}
