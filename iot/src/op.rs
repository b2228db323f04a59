use autoschematic_core::{connector::ConnectorOp, util::RON};
use serde::{Deserialize, Serialize};

use super::resource::IndexingConfiguration;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum IotConnectorOp {
    UpdateIndexingConfiguration(IndexingConfiguration),
}

impl ConnectorOp for IotConnectorOp {
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
