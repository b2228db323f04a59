use std::path::{Path, PathBuf};

use autoschematic_core::{connector::ResourceAddress, error_util::invalid_addr_path};

#[derive(Debug, Clone, PartialEq)]
pub enum IotResourceAddress {
    /// The fleet indexing settings of a region. There is exactly one per region.
    IndexingConfiguration { region: String },
}

impl ResourceAddress for IotResourceAddress {
    fn to_path_buf(&self) -> PathBuf {
        match &self {
            IotResourceAddress::IndexingConfiguration { region } => {
                PathBuf::from(format!("aws/iot/{}/indexing_configuration.ron", region))
            }
        }
    }

    fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
        let path_components: Vec<&str> = path.components().filter_map(|s| s.as_os_str().to_str()).collect();

        match &path_components[..] {
            ["aws", "iot", region, "indexing_configuration.ron"] => Ok(IotResourceAddress::IndexingConfiguration {
                region: region.to_string(),
            }),
            _ => Err(invalid_addr_path(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_configuration_path() {
        let addr = IotResourceAddress::IndexingConfiguration {
            region: String::from("eu-west-1"),
        };
        assert_eq!(addr.to_path_buf(), PathBuf::from("aws/iot/eu-west-1/indexing_configuration.ron"));
        assert_eq!(IotResourceAddress::from_path(&addr.to_path_buf()).unwrap(), addr);
    }

    #[test]
    fn rejects_other_paths() {
        for path in [
            "aws/iot/eu-west-1/indexing_configuration",
            "aws/iot/eu-west-1/things/sensor.ron",
            "aws/iot/indexing_configuration.ron",
        ] {
            assert!(IotResourceAddress::from_path(Path::new(path)).is_err(), "{path}");
        }
    }
}
