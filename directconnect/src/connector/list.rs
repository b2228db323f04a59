use std::path::{Path, PathBuf};

use autoschematic_core::connector::ResourceAddress;
use aws_sdk_directconnect::types::LagState;

use crate::addr::DirectConnectResourceAddress;

use super::DirectConnectConnector;

impl DirectConnectConnector {
    pub async fn do_list(&self, subpath: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
        let mut results = Vec::<PathBuf>::new();

        let path_components: Vec<&str> = subpath.components().filter_map(|s| s.as_os_str().to_str()).collect();

        let enabled_regions = self.config.lock().await.enabled_regions.clone();

        match &path_components[..] {
            ["aws", "directconnect", region, _rest @ ..] => {
                if enabled_regions.iter().any(|r| r.as_str() == *region) {
                    results.extend(self.list_region_lags(region).await?);
                }
            }
            _ => {
                for region in &enabled_regions {
                    results.extend(self.list_region_lags(region).await?);
                }
            }
        }

        Ok(results)
    }

    async fn list_region_lags(&self, region: &str) -> anyhow::Result<Vec<PathBuf>> {
        let mut results = Vec::new();
        let client = self.get_or_init_client(region).await?;

        // DescribeLags is not paginated.
        let output = client.describe_lags().send().await?;

        for lag in output.lags.unwrap_or_default() {
            if lag.lag_state == Some(LagState::Deleted) {
                continue;
            }

            if let Some(lag_id) = lag.lag_id {
                results.push(
                    DirectConnectResourceAddress::Lag {
                        region: region.to_string(),
                        lag_id,
                    }
                    .to_path_buf(),
                );
            }
        }

        tracing::debug!("Direct Connect list {}: {} LAGs", region, results.len());

        Ok(results)
    }
}
