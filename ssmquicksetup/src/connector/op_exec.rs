use std::path::Path;

use autoschematic_core::connector::{ConnectorOp, OpExecResponse, ResourceAddress};

use crate::{addr::SsmQuickSetupResourceAddress, op::SsmQuickSetupConnectorOp, op_impl};

use super::SsmQuickSetupConnector;

impl SsmQuickSetupConnector {
    /// The manager ARN behind `addr`: the `manager_arn` output when one was
    /// recorded, else rebuilt from the region, account and id.
    pub(super) async fn manager_arn(&self, addr: &SsmQuickSetupResourceAddress) -> anyhow::Result<String> {
        if let Some(arn) = addr.get_output(&self.prefix, "manager_arn")? {
            return Ok(arn);
        }

        match addr {
            SsmQuickSetupResourceAddress::ConfigurationManager { region, manager_id } => {
                let account_id = self.account_id.lock().await.clone();
                Ok(op_impl::manager_arn(region, &account_id, manager_id).to_string())
            }
        }
    }

    pub async fn do_op_exec(&self, addr: &Path, op: &str) -> Result<OpExecResponse, anyhow::Error> {
        let addr = SsmQuickSetupResourceAddress::from_path(addr)?;
        let op = SsmQuickSetupConnectorOp::from_str(op)?;

        match &addr {
            SsmQuickSetupResourceAddress::ConfigurationManager { region, .. } => {
                let client = self.get_or_init_client(region).await?;

                match op {
                    SsmQuickSetupConnectorOp::CreateConfigurationManager(manager) => {
                        op_impl::create_configuration_manager(&client, &manager).await
                    }
                    SsmQuickSetupConnectorOp::UpdateConfigurationManager { name, description } => {
                        let arn = self.manager_arn(&addr).await?;
                        op_impl::update_configuration_manager(&client, &arn, &name, description.as_deref()).await
                    }
                    SsmQuickSetupConnectorOp::UpdateConfigurationDefinition { id, definition } => {
                        let arn = self.manager_arn(&addr).await?;
                        op_impl::update_configuration_definition(&client, &arn, &id, &definition).await
                    }
                    SsmQuickSetupConnectorOp::UpdateTags(old_tags, new_tags) => {
                        let arn = self.manager_arn(&addr).await?;
                        op_impl::update_tags(&client, &arn, &old_tags, &new_tags).await
                    }
                    SsmQuickSetupConnectorOp::DeleteConfigurationManager => {
                        let arn = self.manager_arn(&addr).await?;
                        op_impl::delete_configuration_manager(&client, &arn).await
                    }
                }
            }
        }
    }
}
