use std::path::Path;

use autoschematic_core::connector::{ConnectorOp, OpExecResponse, ResourceAddress};

use crate::{
    addr::DirectConnectResourceAddress,
    op::DirectConnectConnectorOp,
    op_impl::{self, lag_arn},
};

use super::DirectConnectConnector;

impl DirectConnectConnector {
    pub async fn do_op_exec(&self, addr: &Path, op: &str) -> Result<OpExecResponse, anyhow::Error> {
        let addr = DirectConnectResourceAddress::from_path(addr)?;
        let op = DirectConnectConnectorOp::from_str(op)?;
        let account_id = self.account_id.lock().await.clone();

        match addr {
            DirectConnectResourceAddress::Lag { region, lag_id } => {
                let client = self.get_or_init_client(&region).await?;

                match op {
                    DirectConnectConnectorOp::CreateLag(lag) => op_impl::create_lag(&client, &region, &account_id, &lag).await,
                    DirectConnectConnectorOp::UpdateLagName(name) => op_impl::update_lag_name(&client, &lag_id, &name).await,
                    DirectConnectConnectorOp::UpdateLagTags(old_tags, new_tags) => {
                        op_impl::update_lag_tags(&client, &lag_arn(&region, &account_id, &lag_id), &old_tags, &new_tags).await
                    }
                    DirectConnectConnectorOp::SetForceDestroy(force_destroy) => op_impl::set_force_destroy(&lag_id, force_destroy),
                    DirectConnectConnectorOp::DeleteLag { force_destroy } => {
                        op_impl::delete_lag(&client, &lag_id, force_destroy).await
                    }
                }
            }
        }
    }
}
