use std::path::{Path, PathBuf};

use autoschematic_core::{connector::ResourceAddress, error_util::invalid_addr_path};

#[derive(Debug, Clone, PartialEq)]
pub enum DirectConnectResourceAddress {
    Lag { region: String, lag_id: String },
}

impl ResourceAddress for DirectConnectResourceAddress {
    fn to_path_buf(&self) -> PathBuf {
        match &self {
            DirectConnectResourceAddress::Lag { region, lag_id } => {
                PathBuf::from(format!("aws/directconnect/{}/lags/{}.ron", region, lag_id))
            }
        }
    }

    fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
        let path_components: Vec<&str> = path.components().filter_map(|s| s.as_os_str().to_str()).collect();

        match &path_components[..] {
            ["aws", "directconnect", region, "lags", lag_id] => match lag_id.strip_suffix(".ron") {
                Some(lag_id) if !lag_id.is_empty() => Ok(DirectConnectResourceAddress::Lag {
                    region: region.to_string(),
                    lag_id: lag_id.to_string(),
                }),
                _ => Err(invalid_addr_path(path)),
            },
            _ => Err(invalid_addr_path(path)),
        }
    }
}
