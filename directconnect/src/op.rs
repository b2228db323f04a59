use autoschematic_core::{connector::ConnectorOp, util::RON};
use serde::{Deserialize, Serialize};

use super::{resource::Lag, tags::Tags};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum DirectConnectConnectorOp {
    CreateLag(Lag),
    UpdateLagName(String),
    UpdateLagTags(Tags, Tags),
    /// Records the flag in the `force_destroy` output. No AWS call.
    SetForceDestroy(bool),
    DeleteLag { force_destroy: bool },
}

impl ConnectorOp for DirectConnectConnectorOp {
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
