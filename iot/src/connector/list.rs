use std::path::{Path, PathBuf};

use autoschematic_core::connector::ResourceAddress;

use crate::addr::IotResourceAddress;

use super::IotConnector;

impl IotConnector {
    pub async fn do_list(&self, subpath: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
        let path_components: Vec<&str> = subpath.components().filter_map(|s| s.as_os_str().to_str()).collect();

        let enabled_regions = self.config.lock().await.enabled_regions.clone();

        let regions: Vec<String> = match &path_components[..] {
            ["aws", "iot", region, _rest @ ..] => enabled_regions.into_iter().filter(|r| r.as_str() == *region).collect(),
            _ => enabled_regions,
        };

        Ok(regions
            .into_iter()
            .map(|region| IotResourceAddress::IndexingConfiguration { region }.to_path_buf())
            .collect())
    }
}
