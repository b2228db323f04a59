//! Point reads and state waiters for LAGs and their member connections.
//!
//! Direct Connect reports missing resources as a `DirectConnectClientException`
//! and keeps deleted ones visible for a while in the `deleted` state. Both are
//! treated as absent here.

use std::time::Duration;

use autoschematic_connector_aws_core::wait::{Refreshed, StateChangeConf, wait_for_state};
use aws_sdk_directconnect::{
    operation::{describe_connections::DescribeConnectionsError, describe_lags::DescribeLagsError},
    types::{Connection, ConnectionState, Lag, LagState, error::DirectConnectClientException},
};

pub const LAG_DELETED_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const CONNECTION_DELETED_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub fn lag_not_found(e: &DirectConnectClientException) -> bool {
    e.message().is_some_and(|m| m.contains("Could not find Lag"))
}

pub fn connection_not_found(e: &DirectConnectClientException) -> bool {
    e.message().is_some_and(|m| m.contains("Could not find Connection"))
}

fn live_lag(lag: Lag) -> Option<Lag> {
    match lag.lag_state {
        Some(LagState::Deleted) => None,
        _ => Some(lag),
    }
}

fn live_connection(connection: Connection) -> Option<Connection> {
    match connection.connection_state {
        Some(ConnectionState::Deleted) | Some(ConnectionState::Rejected) => None,
        _ => Some(connection),
    }
}

pub async fn find_lag_by_id(client: &aws_sdk_directconnect::Client, lag_id: &str) -> anyhow::Result<Option<Lag>> {
    let output = match client.describe_lags().lag_id(lag_id).send().await {
        Ok(output) => output,
        Err(e) => {
            if let Some(DescribeLagsError::DirectConnectClientException(ex)) = e.as_service_error()
                && lag_not_found(ex)
            {
                return Ok(None);
            }
            return Err(e.into());
        }
    };

    let lags = output.lags.unwrap_or_default();
    if lags.len() > 1 {
        anyhow::bail!("DescribeLags returned {} results for {}", lags.len(), lag_id);
    }

    Ok(lags.into_iter().next().and_then(live_lag))
}

pub async fn status_lag_state(client: &aws_sdk_directconnect::Client, lag_id: &str) -> anyhow::Result<Refreshed<Lag>> {
    Ok(find_lag_by_id(client, lag_id).await?.map(|lag| {
        let state = lag.lag_state.as_ref().map(|s| s.as_str().to_string()).unwrap_or_default();
        (lag, state)
    }))
}

pub async fn wait_lag_deleted(client: &aws_sdk_directconnect::Client, lag_id: &str) -> anyhow::Result<()> {
    let conf = StateChangeConf::new(
        &[
            LagState::Available.as_str(),
            LagState::Requested.as_str(),
            LagState::Pending.as_str(),
            LagState::Down.as_str(),
            LagState::Deleting.as_str(),
        ],
        &[],
        LAG_DELETED_TIMEOUT,
    );

    wait_for_state(&conf, || status_lag_state(client, lag_id)).await?;
    Ok(())
}

pub async fn find_connection_by_id(
    client: &aws_sdk_directconnect::Client,
    connection_id: &str,
) -> anyhow::Result<Option<Connection>> {
    let output = match client.describe_connections().connection_id(connection_id).send().await {
        Ok(output) => output,
        Err(e) => {
            if let Some(DescribeConnectionsError::DirectConnectClientException(ex)) = e.as_service_error()
                && connection_not_found(ex)
            {
                return Ok(None);
            }
            return Err(e.into());
        }
    };

    Ok(output.connections.unwrap_or_default().into_iter().next().and_then(live_connection))
}

pub async fn status_connection_state(
    client: &aws_sdk_directconnect::Client,
    connection_id: &str,
) -> anyhow::Result<Refreshed<Connection>> {
    Ok(find_connection_by_id(client, connection_id).await?.map(|connection| {
        let state = connection
            .connection_state
            .as_ref()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        (connection, state)
    }))
}

pub async fn wait_connection_deleted(client: &aws_sdk_directconnect::Client, connection_id: &str) -> anyhow::Result<()> {
    let conf = StateChangeConf::new(
        &[
            ConnectionState::Pending.as_str(),
            ConnectionState::Ordering.as_str(),
            ConnectionState::Available.as_str(),
            ConnectionState::Requested.as_str(),
            ConnectionState::Deleting.as_str(),
        ],
        &[],
        CONNECTION_DELETED_TIMEOUT,
    );

    wait_for_state(&conf, || status_connection_state(client, connection_id)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_matches_on_message() {
        let missing = DirectConnectClientException::builder()
            .message("Could not find Lag with ID dxlag-ffjhj9lx")
            .build();
        let throttled = DirectConnectClientException::builder().message("Rate exceeded").build();

        assert!(lag_not_found(&missing));
        assert!(!lag_not_found(&throttled));
        assert!(!connection_not_found(&missing));
    }

    #[test]
    fn deleted_lags_are_absent() {
        let lag = |state| Lag::builder().lag_id("dxlag-ffjhj9lx").lag_state(state).build();

        assert!(live_lag(lag(LagState::Deleted)).is_none());
        assert!(live_lag(lag(LagState::Deleting)).is_some());
        assert!(live_lag(lag(LagState::Available)).is_some());
    }

    #[test]
    fn deleted_connections_are_absent() {
        let connection = |state| {
            Connection::builder()
                .connection_id("dxcon-fg5678gh")
                .connection_state(state)
                .build()
        };

        assert!(live_connection(connection(ConnectionState::Deleted)).is_none());
        assert!(live_connection(connection(ConnectionState::Rejected)).is_none());
        assert!(live_connection(connection(ConnectionState::Down)).is_some());
    }

    #[test]
    fn state_names_match_api() {
        assert_eq!(LagState::Deleting.as_str(), "deleting");
        assert_eq!(ConnectionState::Ordering.as_str(), "ordering");
    }
}
