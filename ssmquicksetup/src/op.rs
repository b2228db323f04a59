use autoschematic_core::{connector::ConnectorOp, util::RON};
use serde::{Deserialize, Serialize};

use super::{
    resource::{ConfigurationDefinition, ConfigurationManager},
    tags::Tags,
};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum SsmQuickSetupConnectorOp {
    CreateConfigurationManager(ConfigurationManager),
    UpdateConfigurationManager {
        name: String,
        description: Option<String>,
    },
    UpdateConfigurationDefinition {
        id: String,
        definition: ConfigurationDefinition,
    },
    UpdateTags(Tags, Tags),
    DeleteConfigurationManager,
}

impl ConnectorOp for SsmQuickSetupConnectorOp {
    fn to_string(&self) -> Result<String, anyhow::Error> {
        Ok(RON.to_string(self)?)
    }

    fn from_str(s: &str) -> Result<Self, anyhow::Error>
    where
        Self: Sized,
    {
        Ok(RON.from_str(s)?)
    }
}
