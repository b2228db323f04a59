use std::path::Path;

use autoschematic_core::connector::{ConnectorOp, OpExecResponse, ResourceAddress};

use crate::{addr::IotResourceAddress, op::IotConnectorOp, op_impl};

use super::IotConnector;

impl IotConnector {
    pub async fn do_op_exec(&self, addr: &Path, op: &str) -> Result<OpExecResponse, anyhow::Error> {
        let addr = IotResourceAddress::from_path(addr)?;
        let op = IotConnectorOp::from_str(op)?;

        match addr {
            IotResourceAddress::IndexingConfiguration { region } => {
                let client = self.get_or_init_client(&region).await?;

                match op {
                    IotConnectorOp::UpdateIndexingConfiguration(config) => {
                        op_impl::update_indexing_configuration(&client, &region, &config).await
                    }
                }
            }
        }
    }
}
