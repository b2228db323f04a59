use std::path::{Path, PathBuf};

use autoschematic_core::{connector::ResourceAddress, error_util::invalid_addr_path};

#[derive(Debug, Clone, PartialEq)]
pub enum SsmQuickSetupResourceAddress {
    /// `manager_id` is the trailing id of the manager ARN.
    ConfigurationManager { region: String, manager_id: String },
}

impl ResourceAddress for SsmQuickSetupResourceAddress {
    fn to_path_buf(&self) -> PathBuf {
        match &self {
            SsmQuickSetupResourceAddress::ConfigurationManager { region, manager_id } => PathBuf::from(format!(
                "aws/ssmquicksetup/{}/configuration_managers/{}.ron",
                region, manager_id
            )),
        }
    }

    fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
        let path_components: Vec<&str> = path.components().filter_map(|s| s.as_os_str().to_str()).collect();

        match &path_components[..] {
            ["aws", "ssmquicksetup", region, "configuration_managers", manager_id] => match manager_id.strip_suffix(".ron") {
                Some(manager_id) if !manager_id.is_empty() => Ok(SsmQuickSetupResourceAddress::ConfigurationManager {
                    region: region.to_string(),
                    manager_id: manager_id.to_string(),
                }),
                _ => Err(invalid_addr_path(path)),
            },
            _ => Err(invalid_addr_path(path)),
        }
    }
}
