use std::collections::HashMap;

use anyhow::{Context, bail};
use autoschematic_connector_aws_core::arn::Arn;
use autoschematic_core::connector::OpExecResponse;
use aws_sdk_directconnect::operation::{delete_connection::DeleteConnectionError, delete_lag::DeleteLagError};

use super::{
    resource::Lag,
    status,
    tags::{Tags, tag_diff},
};

pub fn lag_arn(region: &str, account_id: &str, lag_id: &str) -> Arn {
    Arn::regional("directconnect", region, account_id, format!("dxlag/{lag_id}"))
}

/// Deletes a dedicated connection and waits for it to disappear.
/// A connection that is already gone is not an error.
pub async fn delete_connection(client: &aws_sdk_directconnect::Client, connection_id: &str) -> anyhow::Result<()> {
    tracing::info!("Deleting Direct Connect connection {}", connection_id);

    if let Err(e) = client.delete_connection().connection_id(connection_id).send().await {
        if let Some(DeleteConnectionError::DirectConnectClientException(ex)) = e.as_service_error()
            && status::connection_not_found(ex)
        {
            return Ok(());
        }
        return Err(e).with_context(|| format!("Deleting Direct Connect connection {connection_id}"));
    }

    status::wait_connection_deleted(client, connection_id)
        .await
        .with_context(|| format!("Waiting for Direct Connect connection {connection_id} to be deleted"))
}

pub async fn create_lag(
    client: &aws_sdk_directconnect::Client,
    region: &str,
    account_id: &str,
    lag: &Lag,
) -> Result<OpExecResponse, anyhow::Error> {
    lag.validate()?;

    let tags = if lag.tags.is_empty() { None } else { Some(lag.tags.to_vec()?) };

    let output = client
        .create_lag()
        .lag_name(&lag.name)
        .connections_bandwidth(&lag.connections_bandwidth)
        .location(&lag.location)
        .number_of_connections(1)
        .set_provider_name(lag.provider_name.clone())
        .set_connection_id(lag.connection_id.clone())
        .request_mac_sec(lag.request_macsec)
        .set_tags(tags)
        .send()
        .await?;

    let Some(lag_id) = output.lag_id else {
        bail!("Failed to create LAG: response did not contain a LAG ID");
    };

    // Without an explicit connection, CreateLag provisions one that nothing manages.
    if lag.connection_id.is_none() {
        for connection in output.connections.unwrap_or_default() {
            if let Some(connection_id) = connection.connection_id {
                delete_connection(client, &connection_id).await?;
            }
        }
    }

    let arn = lag_arn(region, account_id, &lag_id);

    let mut outputs = HashMap::new();
    outputs.insert(String::from("lag_id"), Some(lag_id.clone()));
    outputs.insert(String::from("arn"), Some(arn.to_string()));
    outputs.insert(String::from("force_destroy"), Some(lag.force_destroy.to_string()));

    Ok(OpExecResponse {
        outputs: Some(outputs),
        friendly_message: Some(format!("Created Direct Connect LAG {} ({})", lag.name, lag_id)),
    })
}

pub fn set_force_destroy(lag_id: &str, force_destroy: bool) -> Result<OpExecResponse, anyhow::Error> {
    let mut outputs = HashMap::new();
    outputs.insert(String::from("force_destroy"), Some(force_destroy.to_string()));

    Ok(OpExecResponse {
        outputs: Some(outputs),
        friendly_message: Some(format!("Set force_destroy = {force_destroy} for Direct Connect LAG {lag_id}")),
    })
}

pub async fn update_lag_name(
    client: &aws_sdk_directconnect::Client,
    lag_id: &str,
    name: &str,
) -> Result<OpExecResponse, anyhow::Error> {
    client.update_lag().lag_id(lag_id).lag_name(name).send().await?;

    Ok(OpExecResponse {
        outputs: None,
        friendly_message: Some(format!("Renamed Direct Connect LAG {lag_id} to {name}")),
    })
}

pub async fn update_lag_tags(
    client: &aws_sdk_directconnect::Client,
    arn: &Arn,
    old_tags: &Tags,
    new_tags: &Tags,
) -> Result<OpExecResponse, anyhow::Error> {
    let (untag_keys, new_tagset) = tag_diff(old_tags, new_tags)?;

    if !untag_keys.is_empty() {
        client
            .untag_resource()
            .resource_arn(arn.to_string())
            .set_tag_keys(Some(untag_keys))
            .send()
            .await?;
    }

    if !new_tagset.is_empty() {
        client
            .tag_resource()
            .resource_arn(arn.to_string())
            .set_tags(Some(new_tagset))
            .send()
            .await?;
    }

    Ok(OpExecResponse {
        outputs: None,
        friendly_message: Some(format!("Updated tags for Direct Connect LAG {}", arn.resource_id())),
    })
}

pub async fn delete_lag(
    client: &aws_sdk_directconnect::Client,
    lag_id: &str,
    force_destroy: bool,
) -> Result<OpExecResponse, anyhow::Error> {
    if force_destroy && let Some(lag) = status::find_lag_by_id(client, lag_id).await? {
        for connection in lag.connections.unwrap_or_default() {
            if let Some(connection_id) = connection.connection_id {
                delete_connection(client, &connection_id).await?;
            }
        }
    }

    tracing::info!("Deleting Direct Connect LAG {}", lag_id);

    if let Err(e) = client.delete_lag().lag_id(lag_id).send().await {
        if let Some(DeleteLagError::DirectConnectClientException(ex)) = e.as_service_error()
            && status::lag_not_found(ex)
        {
            return Ok(OpExecResponse {
                outputs: None,
                friendly_message: Some(format!("Direct Connect LAG {lag_id} was already deleted")),
            });
        }
        return Err(e).with_context(|| format!("Deleting Direct Connect LAG {lag_id}"));
    }

    status::wait_lag_deleted(client, lag_id)
        .await
        .with_context(|| format!("Waiting for Direct Connect LAG {lag_id} to be deleted"))?;

    Ok(OpExecResponse {
        outputs: None,
        friendly_message: Some(format!("Deleted Direct Connect LAG {lag_id}")),
    })
}
