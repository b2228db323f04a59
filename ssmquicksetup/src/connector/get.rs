use std::{collections::HashMap, path::Path};

use anyhow::Context;
use autoschematic_core::{
    connector::{GetResourceResponse, Resource, ResourceAddress},
    get_resource_response,
};

use crate::{
    addr::SsmQuickSetupResourceAddress,
    resource::{ConfigurationManager, SsmQuickSetupResource},
    status,
};

use super::SsmQuickSetupConnector;

impl SsmQuickSetupConnector {
    pub async fn do_get(&self, addr: &Path) -> Result<Option<GetResourceResponse>, anyhow::Error> {
        let addr = SsmQuickSetupResourceAddress::from_path(addr)?;

        match &addr {
            SsmQuickSetupResourceAddress::ConfigurationManager { region, manager_id } => {
                let client = self.get_or_init_client(region).await?;
                let arn = self.manager_arn(&addr).await?;

                let Some(output) = status::find_configuration_manager(&client, &arn).await? else {
                    tracing::debug!("Configuration manager {} not found in {}", manager_id, region);
                    return Ok(None);
                };

                get_resource_response!(
                    SsmQuickSetupResource::ConfigurationManager(ConfigurationManager::from_remote(&output)),
                    [(String::from("manager_arn"), output.manager_arn.clone())]
                )
            }
        }
    }
}
