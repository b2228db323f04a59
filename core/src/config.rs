use std::{path::Path, time::Duration};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use autoschematic_core::util::RON;

use crate::client::sdk_config;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Per-call timeouts applied to every SDK client. Unset fields fall back to 30 seconds.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    #[serde(default)]
    pub connect_secs: Option<u64>,
    #[serde(default)]
    pub operation_secs: Option<u64>,
    #[serde(default)]
    pub operation_attempt_secs: Option<u64>,
    #[serde(default)]
    pub read_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn operation(&self) -> Duration {
        Duration::from_secs(self.operation_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn operation_attempt(&self) -> Duration {
        Duration::from_secs(self.operation_attempt_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AwsConnectorConfig {
    pub account_id:      Option<String>,
    pub endpoint_url:    Option<String>,
    pub timeout_config:  Option<TimeoutConfig>,
    pub sts_region:      String,
    pub enabled_regions: Vec<String>,
}

impl Default for AwsConnectorConfig {
    fn default() -> Self {
        Self {
            account_id:      Default::default(),
            endpoint_url:    Default::default(),
            timeout_config:  Default::default(),
            sts_region:      String::from("us-east-1"),
            enabled_regions: vec![
                // "ap-northeast-1",
                // "ap-southeast-1",
                // "ap-southeast-2",
                // "ca-central-1",
                // "eu-central-1",
                // "eu-north-1",
                "eu-west-1",
                "eu-west-2",
                // "eu-west-3",
                // "sa-east-1",
                "us-east-1",
                "us-east-2",
                "us-west-1",
                "us-west-2",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl AwsConnectorConfig {
    pub fn try_load(prefix: &Path) -> anyhow::Result<AwsConnectorConfig> {
        let config_path = prefix.join("aws/config.ron");
        if config_path.is_file() {
            tracing::info!("Loading AwsConnector config file at {:?}", config_path);
            let config: AwsConnectorConfig = RON.from_str(&std::fs::read_to_string(config_path)?)?;
            Ok(config)
        } else {
            tracing::info!("AwsConnector config file at {:?} not present, skipping.", config_path);
            Ok(AwsConnectorConfig::default())
        }
    }
}

pub async fn verify_sts_account_id(
    sts_region: String,
    account_id: Option<String>,
    endpoint_url: Option<String>,
    timeout_config: Option<TimeoutConfig>,
) -> anyhow::Result<String> {
    let sts_config = sdk_config(&sts_region, endpoint_url.as_deref(), timeout_config.as_ref()).await;

    let sts_client = aws_sdk_sts::Client::new(&sts_config);
    let caller_identity = sts_client.get_caller_identity().send().await;

    match caller_identity {
        Ok(caller_identity) => {
            let Some(caller_account_id) = caller_identity.account else {
                bail!("Failed to get current account ID!");
            };

            if let Some(account_id) = account_id
                && caller_account_id != account_id
            {
                bail!(
                    "AWS: Account ID mismatch. Configured to use account ID {account_id}, \nbut credentials provided are for account ID {caller_account_id}."
                )
            }
            Ok(caller_account_id)
        }
        Err(e) => {
            tracing::error!("Failed to call sts:GetCallerIdentity: {}", e);
            Err(e.into())
        }
    }
}

pub trait AwsServiceConfig: From<AwsConnectorConfig> {
    async fn try_load(prefix: &Path) -> anyhow::Result<Self>;
    async fn verify_sts(&self) -> anyhow::Result<String>;
}

/// Implements `From<AwsConnectorConfig>`, `Default` and `AwsServiceConfig` for a
/// service config struct with the same fields as `AwsConnectorConfig`.
/// `$path` is the service override file, relative to the connector prefix.
#[macro_export]
macro_rules! impl_aws_config {
    ($type:ty, $path:expr) => {
        impl From<$crate::config::AwsConnectorConfig> for $type {
            fn from(value: $crate::config::AwsConnectorConfig) -> Self {
                Self {
                    account_id:      value.account_id,
                    endpoint_url:    value.endpoint_url,
                    timeout_config:  value.timeout_config,
                    sts_region:      value.sts_region,
                    enabled_regions: value.enabled_regions,
                }
            }
        }

        impl Default for $type {
            fn default() -> Self {
                Self::from($crate::config::AwsConnectorConfig::default())
            }
        }

        impl $crate::config::AwsServiceConfig for $type {
            async fn try_load(prefix: &::std::path::Path) -> anyhow::Result<Self> {
                let config_path = prefix.join($path);
                if config_path.is_file() {
                    tracing::info!("Loading service config file at {:?}", config_path);
                    let config: $type = autoschematic_core::util::RON.from_str(&std::fs::read_to_string(config_path)?)?;
                    Ok(config)
                } else {
                    Ok(<$type>::from($crate::config::AwsConnectorConfig::try_load(prefix)?))
                }
            }

            async fn verify_sts(&self) -> anyhow::Result<String> {
                $crate::config::verify_sts_account_id(
                    self.sts_region.clone(),
                    self.account_id.clone(),
                    self.endpoint_url.clone(),
                    self.timeout_config.clone(),
                )
                .await
            }
        }
    };
}
