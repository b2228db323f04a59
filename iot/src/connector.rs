use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use autoschematic_connector_aws_core::{client::ClientCache, config::AwsServiceConfig};
use autoschematic_core::{
    connector::{
        Connector, ConnectorOutbox, FilterResponse, GetResourceResponse, OpExecResponse, PlanResponseElement, Resource,
        ResourceAddress, SkeletonResponse, VirtToPhyResponse,
    },
    diag::DiagnosticResponse,
    skeleton,
    util::{optional_string_from_utf8, ron_check_syntax},
};
use tokio::sync::Mutex;

use crate::{
    addr::IotResourceAddress,
    config::IotConnectorConfig,
    resource::{self, Field, IndexingConfiguration, IotResource, ThingGroupIndexingConfiguration, ThingIndexingConfiguration},
};

mod get;
mod list;
mod op_exec;
mod plan;

#[derive(Default)]
pub struct IotConnector {
    client_cache: ClientCache<aws_sdk_iot::Client>,
    config: Mutex<IotConnectorConfig>,
    prefix: PathBuf,
}

impl IotConnector {
    async fn get_or_init_client(&self, region: &str) -> anyhow::Result<Arc<aws_sdk_iot::Client>> {
        let (endpoint_url, timeout_config) = {
            let config = self.config.lock().await;
            (config.endpoint_url.clone(), config.timeout_config.clone())
        };

        self.client_cache
            .get_or_init(region, endpoint_url.as_deref(), timeout_config.as_ref(), aws_sdk_iot::Client::new)
            .await
    }
}

#[async_trait]
impl Connector for IotConnector {
    async fn filter(&self, addr: &Path) -> Result<FilterResponse, anyhow::Error> {
        if let Ok(_addr) = IotResourceAddress::from_path(addr) {
            Ok(FilterResponse::Resource)
        } else {
            Ok(FilterResponse::None)
        }
    }

    async fn new(_name: &str, prefix: &Path, _outbox: ConnectorOutbox) -> Result<Arc<dyn Connector>, anyhow::Error>
    where
        Self: Sized,
    {
        Ok(Arc::new(IotConnector {
            prefix: prefix.into(),
            ..Default::default()
        }))
    }

    async fn init(&self) -> Result<(), anyhow::Error> {
        let config = IotConnectorConfig::try_load(&self.prefix).await?;

        let account_id = config.verify_sts().await?;

        tracing::info!("IoT connector using account {}", account_id);

        self.client_cache.clear().await;
        *self.config.lock().await = config;

        Ok(())
    }

    async fn subpaths(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut res = Vec::new();

        for region in &self.config.lock().await.enabled_regions {
            res.push(PathBuf::from(format!("aws/iot/{}", region)));
        }

        Ok(res)
    }

    async fn list(&self, subpath: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
        self.do_list(subpath).await
    }

    async fn get(&self, addr: &Path) -> Result<Option<GetResourceResponse>, anyhow::Error> {
        self.do_get(addr).await
    }

    async fn plan(
        &self,
        addr: &Path,
        current: Option<Vec<u8>>,
        desired: Option<Vec<u8>>,
    ) -> Result<Vec<PlanResponseElement>, anyhow::Error> {
        self.do_plan(addr, optional_string_from_utf8(current)?, optional_string_from_utf8(desired)?)
            .await
    }

    async fn op_exec(&self, addr: &Path, op: &str) -> Result<OpExecResponse, anyhow::Error> {
        self.do_op_exec(addr, op).await
    }

    // The indexing configuration has no AWS-assigned id: its path is already physical.
    async fn addr_virt_to_phy(&self, addr: &Path) -> anyhow::Result<VirtToPhyResponse> {
        let Ok(addr) = IotResourceAddress::from_path(addr) else {
            return Ok(VirtToPhyResponse::NotPresent);
        };

        Ok(VirtToPhyResponse::Null(addr.to_path_buf()))
    }

    async fn addr_phy_to_virt(&self, addr: &Path) -> anyhow::Result<Option<PathBuf>> {
        let Ok(addr) = IotResourceAddress::from_path(addr) else {
            return Ok(None);
        };

        Ok(Some(addr.to_path_buf()))
    }

    async fn get_skeletons(&self) -> Result<Vec<SkeletonResponse>, anyhow::Error> {
        let mut res = Vec::new();

        res.push(skeleton!(
            IotResourceAddress::IndexingConfiguration {
                region: String::from("[region]"),
            },
            IotResource::IndexingConfiguration(IndexingConfiguration {
                thing_indexing_configuration: Some(ThingIndexingConfiguration {
                    thing_indexing_mode: String::from("REGISTRY_AND_SHADOW"),
                    thing_connectivity_indexing_mode: String::from("STATUS"),
                    device_defender_indexing_mode: String::from("OFF"),
                    named_shadow_indexing_mode: String::from("OFF"),
                    filter: None,
                    custom_fields: vec![Field {
                        name: String::from("attributes.[attribute_name]"),
                        r#type: String::from("String"),
                    }],
                    managed_fields: None,
                }),
                thing_group_indexing_configuration: Some(ThingGroupIndexingConfiguration {
                    thing_group_indexing_mode: String::from("ON"),
                    custom_fields: Vec::new(),
                    managed_fields: None,
                }),
            })
        ));

        Ok(res)
    }

    async fn eq(&self, addr: &Path, a: &[u8], b: &[u8]) -> anyhow::Result<bool> {
        let addr = IotResourceAddress::from_path(addr)?;

        match addr {
            IotResourceAddress::IndexingConfiguration { .. } => resource::indexing_configuration_eq(a, b),
        }
    }

    async fn diag(&self, addr: &Path, a: &[u8]) -> Result<Option<DiagnosticResponse>, anyhow::Error> {
        let addr = IotResourceAddress::from_path(addr)?;

        match addr {
            IotResourceAddress::IndexingConfiguration { .. } => ron_check_syntax::<IndexingConfiguration>(a),
        }
    }
}
