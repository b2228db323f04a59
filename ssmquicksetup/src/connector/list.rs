use std::path::{Path, PathBuf};

use autoschematic_connector_aws_core::arn::Arn;
use autoschematic_core::connector::ResourceAddress;

use crate::addr::SsmQuickSetupResourceAddress;

use super::SsmQuickSetupConnector;

impl SsmQuickSetupConnector {
    pub async fn do_list(&self, subpath: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
        let mut results = Vec::<PathBuf>::new();

        let path_components: Vec<&str> = subpath.components().filter_map(|s| s.as_os_str().to_str()).collect();

        let enabled_regions = self.config.lock().await.enabled_regions.clone();

        match &path_components[..] {
            ["aws", "ssmquicksetup", region, _rest @ ..] => {
                if enabled_regions.iter().any(|r| r.as_str() == *region) {
                    self.list_region_managers(region, &mut results).await?;
                }
            }
            _ => {
                for region in &enabled_regions {
                    self.list_region_managers(region, &mut results).await?;
                }
            }
        }

        Ok(results)
    }

    async fn list_region_managers(&self, region: &str, results: &mut Vec<PathBuf>) -> anyhow::Result<()> {
        let client = self.get_or_init_client(region).await?;

        let mut pages = client.list_configuration_managers().into_paginator().send();

        while let Some(page) = pages.try_next().await? {
            for summary in page.configuration_managers_list.unwrap_or_default() {
                let arn: Arn = match summary.manager_arn.parse() {
                    Ok(arn) => arn,
                    Err(e) => {
                        tracing::warn!("Skipping configuration manager with malformed ARN {}: {}", summary.manager_arn, e);
                        continue;
                    }
                };

                results.push(
                    SsmQuickSetupResourceAddress::ConfigurationManager {
                        region: region.to_string(),
                        manager_id: arn.resource_id().to_string(),
                    }
                    .to_path_buf(),
                );
            }
        }

        Ok(())
    }
}
