use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use autoschematic_connector_aws_core::{client::ClientCache, config::AwsServiceConfig};
use autoschematic_core::{
    connector::{
        Connector, ConnectorOutbox, FilterResponse, GetResourceResponse, OpExecResponse, PlanResponseElement, Resource, ResourceAddress,
        SkeletonResponse, VirtToPhyResponse,
    },
    diag::DiagnosticResponse,
    skeleton,
    util::{optional_string_from_utf8, ron_check_syntax},
};
use tokio::sync::Mutex;

use crate::{
    addr::DirectConnectResourceAddress,
    config::DirectConnectConnectorConfig,
    resource::{self, DirectConnectResource, Lag},
    tags::Tags,
};

mod get;
mod list;
mod op_exec;
mod plan;

#[derive(Default)]
pub struct DirectConnectConnector {
    client_cache: ClientCache<aws_sdk_directconnect::Client>,
    account_id: Mutex<String>,
    config: Mutex<DirectConnectConnectorConfig>,
    prefix: PathBuf,
}

impl DirectConnectConnector {
    async fn get_or_init_client(&self, region: &str) -> anyhow::Result<Arc<aws_sdk_directconnect::Client>> {
        let (endpoint_url, timeout_config) = {
            let config = self.config.lock().await;
            (config.endpoint_url.clone(), config.timeout_config.clone())
        };

        self.client_cache
            .get_or_init(
                region,
                endpoint_url.as_deref(),
                timeout_config.as_ref(),
                aws_sdk_directconnect::Client::new,
            )
            .await
    }
}

#[async_trait]
impl Connector for DirectConnectConnector {
    async fn filter(&self, addr: &Path) -> Result<FilterResponse, anyhow::Error> {
        if let Ok(_addr) = DirectConnectResourceAddress::from_path(addr) {
            Ok(FilterResponse::Resource)
        } else {
            Ok(FilterResponse::None)
        }
    }

    async fn new(_name: &str, prefix: &Path, _outbox: ConnectorOutbox) -> Result<Arc<dyn Connector>, anyhow::Error>
    where
        Self: Sized,
    {
        Ok(Arc::new(DirectConnectConnector {
            prefix: prefix.into(),
            ..Default::default()
        }))
    }

    async fn init(&self) -> Result<(), anyhow::Error> {
        let config = DirectConnectConnectorConfig::try_load(&self.prefix).await?;

        let account_id = config.verify_sts().await?;

        self.client_cache.clear().await;
        *self.config.lock().await = config;
        *self.account_id.lock().await = account_id;

        Ok(())
    }

    async fn subpaths(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut res = Vec::new();

        for region in &self.config.lock().await.enabled_regions {
            res.push(PathBuf::from(format!("aws/directconnect/{}", region)));
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

    async fn addr_virt_to_phy(&self, addr: &Path) -> anyhow::Result<VirtToPhyResponse> {
        let Ok(addr) = DirectConnectResourceAddress::from_path(addr) else {
            return Ok(VirtToPhyResponse::NotPresent);
        };

        match &addr {
            DirectConnectResourceAddress::Lag { region, .. } => {
                if let Some(lag_id) = addr.get_output(&self.prefix, "lag_id")? {
                    Ok(VirtToPhyResponse::Present(
                        DirectConnectResourceAddress::Lag {
                            region: region.into(),
                            lag_id,
                        }
                        .to_path_buf(),
                    ))
                } else {
                    Ok(VirtToPhyResponse::NotPresent)
                }
            }
        }
    }

    async fn addr_phy_to_virt(&self, addr: &Path) -> anyhow::Result<Option<PathBuf>> {
        let Ok(addr) = DirectConnectResourceAddress::from_path(addr) else {
            return Ok(None);
        };

        match &addr {
            DirectConnectResourceAddress::Lag { .. } => {
                if let Some(lag_addr) = addr.phy_to_virt(&self.prefix)? {
                    return Ok(Some(lag_addr.to_path_buf()));
                }
            }
        }
        Ok(Some(addr.to_path_buf()))
    }

    async fn get_skeletons(&self) -> Result<Vec<SkeletonResponse>, anyhow::Error> {
        let mut res = Vec::new();

        res.push(skeleton!(
            DirectConnectResourceAddress::Lag {
                region: String::from("[region]"),
                lag_id: String::from("[lag_name]"),
            },
            DirectConnectResource::Lag(Lag {
                name: String::from("[lag_name]"),
                connections_bandwidth: String::from("10Gbps"),
                location: String::from("[location_code]"),
                provider_name: None,
                connection_id: None,
                request_macsec: false,
                force_destroy: false,
                tags: Tags::default(),
            })
        ));

        Ok(res)
    }

    async fn eq(&self, addr: &Path, a: &[u8], b: &[u8]) -> anyhow::Result<bool> {
        let addr = DirectConnectResourceAddress::from_path(addr)?;

        match addr {
            DirectConnectResourceAddress::Lag { .. } => resource::lag_eq(a, b),
        }
    }

    async fn diag(&self, addr: &Path, a: &[u8]) -> Result<Option<DiagnosticResponse>, anyhow::Error> {
        let addr = DirectConnectResourceAddress::from_path(addr)?;

        match addr {
            DirectConnectResourceAddress::Lag { .. } => ron_check_syntax::<Lag>(a),
        }
    }
}
