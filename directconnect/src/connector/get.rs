use std::{collections::HashMap, path::Path};

use anyhow::Context;
use autoschematic_core::{
    connector::{GetResourceResponse, Resource, ResourceAddress},
    get_resource_response,
};

use crate::{addr::DirectConnectResourceAddress, op_impl::lag_arn, resource::DirectConnectResource, resource::Lag, status};

use super::DirectConnectConnector;

impl DirectConnectConnector {
    pub async fn do_get(&self, addr: &Path) -> Result<Option<GetResourceResponse>, anyhow::Error> {
        let addr = DirectConnectResourceAddress::from_path(addr)?;

        match &addr {
            DirectConnectResourceAddress::Lag { region, lag_id } => {
                let client = self.get_or_init_client(region).await?;

                let Some(remote) = status::find_lag_by_id(&client, lag_id).await? else {
                    tracing::debug!("Direct Connect LAG {} not found in {}", lag_id, region);
                    return Ok(None);
                };

                let owner_account_id = remote.owner_account.clone().unwrap_or_default();
                let account_id = if owner_account_id.is_empty() {
                    self.account_id.lock().await.clone()
                } else {
                    owner_account_id.clone()
                };

                let has_logical_redundancy = remote
                    .has_logical_redundancy
                    .as_ref()
                    .map(|r| r.as_str().to_string())
                    .unwrap_or_default();
                let jumbo_frame_capable = remote.jumbo_frame_capable.unwrap_or(false);

                let force_destroy = addr
                    .get_output(&self.prefix, "force_destroy")?
                    .is_some_and(|v| v == "true");

                let lag = Lag {
                    force_destroy,
                    ..Lag::from_remote(&remote)
                };

                get_resource_response!(
                    DirectConnectResource::Lag(lag),
                    [
                        (String::from("lag_id"), lag_id.clone()),
                        (String::from("arn"), lag_arn(region, &account_id, lag_id).to_string()),
                        (String::from("owner_account_id"), owner_account_id),
                        (String::from("has_logical_redundancy"), has_logical_redundancy),
                        (String::from("jumbo_frame_capable"), jumbo_frame_capable.to_string()),
                        (String::from("force_destroy"), force_destroy.to_string())
                    ]
                )
            }
        }
    }
}
