//! Deployment status polling for configuration managers.
//!
//! A manager reports several status summaries. The one typed `Deployment`
//! tracks create, update and delete progress.

use std::time::Duration;

use autoschematic_connector_aws_core::wait::{Refreshed, StateChangeConf, wait_for_state};
use aws_sdk_ssmquicksetup::{
    operation::get_configuration_manager::{GetConfigurationManagerError, GetConfigurationManagerOutput},
    types::{Status, StatusSummary, StatusType},
};

pub const CONFIGURATION_MANAGER_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Status of the `Deployment` summary, or `NONE` when there is none yet.
pub fn deployment_status(summaries: &[StatusSummary]) -> String {
    summaries
        .iter()
        .find(|s| s.status_type == StatusType::Deployment)
        .and_then(|s| s.status.as_ref())
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| Status::None.as_str().to_string())
}

pub async fn find_configuration_manager(
    client: &aws_sdk_ssmquicksetup::Client,
    manager_arn: &str,
) -> anyhow::Result<Option<GetConfigurationManagerOutput>> {
    match client.get_configuration_manager().manager_arn(manager_arn).send().await {
        Ok(output) => Ok(Some(output)),
        Err(e) => {
            if let Some(GetConfigurationManagerError::ResourceNotFoundException(_)) = e.as_service_error() {
                return Ok(None);
            }
            Err(e.into())
        }
    }
}

pub async fn status_configuration_manager(
    client: &aws_sdk_ssmquicksetup::Client,
    manager_arn: &str,
) -> anyhow::Result<Refreshed<GetConfigurationManagerOutput>> {
    Ok(find_configuration_manager(client, manager_arn).await?.map(|output| {
        let status = deployment_status(output.status_summaries.as_deref().unwrap_or_default());
        (output, status)
    }))
}

async fn wait_deployed(client: &aws_sdk_ssmquicksetup::Client, manager_arn: &str) -> anyhow::Result<()> {
    let conf = StateChangeConf::new(
        &[Status::Initializing.as_str(), Status::Deploying.as_str()],
        &[Status::Succeeded.as_str()],
        CONFIGURATION_MANAGER_TIMEOUT,
    );

    wait_for_state(&conf, || status_configuration_manager(client, manager_arn)).await?;
    Ok(())
}

pub async fn wait_configuration_manager_created(
    client: &aws_sdk_ssmquicksetup::Client,
    manager_arn: &str,
) -> anyhow::Result<()> {
    wait_deployed(client, manager_arn).await
}

pub async fn wait_configuration_manager_updated(
    client: &aws_sdk_ssmquicksetup::Client,
    manager_arn: &str,
) -> anyhow::Result<()> {
    wait_deployed(client, manager_arn).await
}

pub async fn wait_configuration_manager_deleted(
    client: &aws_sdk_ssmquicksetup::Client,
    manager_arn: &str,
) -> anyhow::Result<()> {
    let conf = StateChangeConf::new(
        &[
            Status::Deleting.as_str(),
            Status::Stopping.as_str(),
            Status::Stopped.as_str(),
            Status::Deploying.as_str(),
            Status::Succeeded.as_str(),
        ],
        &[],
        CONFIGURATION_MANAGER_TIMEOUT,
    );

    wait_for_state(&conf, || status_configuration_manager(client, manager_arn)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use aws_sdk_ssmquicksetup::primitives::DateTime;

    use super::*;

    fn summary(status_type: StatusType, status: Status) -> StatusSummary {
        StatusSummary::builder()
            .status_type(status_type)
            .status(status)
            .last_updated_at(DateTime::from_secs(1_700_000_000))
            .build()
            .unwrap()
    }

    #[test]
    fn picks_the_deployment_summary() {
        let summaries = [
            summary(StatusType::AsyncExecutions, Status::Failed),
            summary(StatusType::Deployment, Status::Deploying),
        ];

        assert_eq!(deployment_status(&summaries), "DEPLOYING");
    }

    #[test]
    fn no_deployment_summary_is_none() {
        assert_eq!(deployment_status(&[]), "NONE");
        assert_eq!(
            deployment_status(&[summary(StatusType::AsyncExecutions, Status::Succeeded)]),
            "NONE"
        );
    }
}
