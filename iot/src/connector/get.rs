use std::path::Path;

use anyhow::Context;
use autoschematic_core::connector::{GetResourceResponse, Resource, ResourceAddress};

use crate::{
    addr::IotResourceAddress,
    resource::{IndexingConfiguration, IotResource, ThingGroupIndexingConfiguration, ThingIndexingConfiguration},
};

use super::IotConnector;

impl IotConnector {
    pub async fn do_get(&self, addr: &Path) -> Result<Option<GetResourceResponse>, anyhow::Error> {
        let addr = IotResourceAddress::from_path(addr)?;

        match addr {
            IotResourceAddress::IndexingConfiguration { region } => {
                let client = self.get_or_init_client(&region).await?;

                let output = client
                    .get_indexing_configuration()
                    .send()
                    .await
                    .with_context(|| format!("Reading IoT indexing configuration in {region}"))?;

                let config = IndexingConfiguration {
                    thing_indexing_configuration: output
                        .thing_indexing_configuration
                        .as_ref()
                        .map(ThingIndexingConfiguration::from_remote),
                    thing_group_indexing_configuration: output
                        .thing_group_indexing_configuration
                        .as_ref()
                        .map(ThingGroupIndexingConfiguration::from_remote),
                };

                Ok(Some(GetResourceResponse {
                    resource_definition: IotResource::IndexingConfiguration(config).to_bytes()?,
                    outputs: None,
                }))
            }
        }
    }
}
