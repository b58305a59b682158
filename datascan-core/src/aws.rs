//! Shared AWS SDK configuration

use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::config::AwsConfig;

/// Load the shared SDK configuration from the default provider chain,
/// applying the configured region hint when one is set.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}
