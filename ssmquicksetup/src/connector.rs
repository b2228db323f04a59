use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use autoschematic_connector_aws_core::{arn::Arn, client::ClientCache, config::AwsServiceConfig};
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
    addr::SsmQuickSetupResourceAddress,
    config::SsmQuickSetupConnectorConfig,
    resource::{self, ConfigurationDefinition, ConfigurationManager, SsmQuickSetupResource},
    tags::Tags,
};

mod get;
mod list;
mod op_exec;
mod plan;

#[derive(Default)]
pub struct SsmQuickSetupConnector {
    client_cache: ClientCache<aws_sdk_ssmquicksetup::Client>,
    account_id: Mutex<String>,
    config: Mutex<SsmQuickSetupConnectorConfig>,
    prefix: PathBuf,
}

impl SsmQuickSetupConnector {
    async fn get_or_init_client(&self, region: &str) -> anyhow::Result<Arc<aws_sdk_ssmquicksetup::Client>> {
        let (endpoint_url, timeout_config) = {
            let config = self.config.lock().await;
            (config.endpoint_url.clone(), config.timeout_config.clone())
        };

        self.client_cache
            .get_or_init(
                region,
                endpoint_url.as_deref(),
                timeout_config.as_ref(),
                aws_sdk_ssmquicksetup::Client::new,
            )
            .await
    }
}

#[async_trait]
impl Connector for SsmQuickSetupConnector {
    async fn filter(&self, addr: &Path) -> Result<FilterResponse, anyhow::Error> {
        if let Ok(_addr) = SsmQuickSetupResourceAddress::from_path(addr) {
            Ok(FilterResponse::Resource)
        } else {
            Ok(FilterResponse::None)
        }
    }

    async fn new(_name: &str, prefix: &Path, _outbox: ConnectorOutbox) -> Result<Arc<dyn Connector>, anyhow::Error>
    where
        Self: Sized,
    {
        Ok(Arc::new(SsmQuickSetupConnector {
            prefix: prefix.into(),
            ..Default::default()
        }))
    }

    async fn init(&self) -> Result<(), anyhow::Error> {
        let config = SsmQuickSetupConnectorConfig::try_load(&self.prefix).await?;

        let account_id = config.verify_sts().await?;

        self.client_cache.clear().await;
        *self.config.lock().await = config;
        *self.account_id.lock().await = account_id;

        Ok(())
    }

    async fn subpaths(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut res = Vec::new();

        for region in &self.config.lock().await.enabled_regions {
            res.push(PathBuf::from(format!("aws/ssmquicksetup/{}", region)));
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
        let Ok(addr) = SsmQuickSetupResourceAddress::from_path(addr) else {
            return Ok(VirtToPhyResponse::NotPresent);
        };

        match &addr {
            SsmQuickSetupResourceAddress::ConfigurationManager { region, .. } => {
                if let Some(manager_arn) = addr.get_output(&self.prefix, "manager_arn")? {
                    let arn: Arn = manager_arn.parse()?;
                    Ok(VirtToPhyResponse::Present(
                        SsmQuickSetupResourceAddress::ConfigurationManager {
                            region: region.into(),
                            manager_id: arn.resource_id().to_string(),
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
        let Ok(addr) = SsmQuickSetupResourceAddress::from_path(addr) else {
            return Ok(None);
        };

        match &addr {
            SsmQuickSetupResourceAddress::ConfigurationManager { .. } => {
                if let Some(manager_addr) = addr.phy_to_virt(&self.prefix)? {
                    return Ok(Some(manager_addr.to_path_buf()));
                }
            }
        }
        Ok(Some(addr.to_path_buf()))
    }

    async fn get_skeletons(&self) -> Result<Vec<SkeletonResponse>, anyhow::Error> {
        let mut res = Vec::new();

        res.push(skeleton!(
            SsmQuickSetupResourceAddress::ConfigurationManager {
                region: String::from("[region]"),
                manager_id: String::from("[manager_name]"),
            },
            SsmQuickSetupResource::ConfigurationManager(ConfigurationManager {
                name: String::from("[manager_name]"),
                description: Some(String::from("Daily patch scanning")),
                configuration_definitions: vec![ConfigurationDefinition {
                    r#type: String::from("AWSQuickSetupType-PatchPolicy"),
                    parameters: [
                        ("ConfigurationOptionsPatchOperation", "Scan"),
                        ("ConfigurationOptionsScanValue", "cron(0 1 * * ? *)"),
                        ("ConfigurationOptionsScanNextInterval", "false"),
                        ("PatchBaselineRegion", "[region]"),
                        ("SelectedPatchBaselines", "[patch_baselines_json]"),
                        ("TargetAccounts", "[account_id]"),
                        ("TargetRegions", "[region]"),
                        ("TargetType", "*"),
                    ]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                    type_version: None,
                    local_deployment_administration_role_arn: None,
                    local_deployment_execution_role_name: None,
                    id: None,
                }],
                tags: Tags::default(),
            })
        ));

        Ok(res)
    }

    async fn eq(&self, addr: &Path, a: &[u8], b: &[u8]) -> anyhow::Result<bool> {
        let addr = SsmQuickSetupResourceAddress::from_path(addr)?;

        match addr {
            SsmQuickSetupResourceAddress::ConfigurationManager { .. } => resource::configuration_manager_eq(a, b),
        }
    }

    async fn diag(&self, addr: &Path, a: &[u8]) -> Result<Option<DiagnosticResponse>, anyhow::Error> {
        let addr = SsmQuickSetupResourceAddress::from_path(addr)?;

        match addr {
            SsmQuickSetupResourceAddress::ConfigurationManager { .. } => ron_check_syntax::<ConfigurationManager>(a),
        }
    }
}
