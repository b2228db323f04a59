use std::path::Path;

use autoschematic_core::{
    connector::{ConnectorOp, PlanResponseElement, ResourceAddress},
    connector_op,
    util::{RON, diff_ron_values},
};

use crate::{addr::DirectConnectResourceAddress, op::DirectConnectConnectorOp, resource::Lag};

use super::DirectConnectConnector;

/// Ops that move a LAG from `current` to `desired`, each with a human-readable summary.
pub fn plan_lag(
    region: &str,
    lag_id: &str,
    current: Option<Lag>,
    desired: Option<Lag>,
) -> anyhow::Result<Vec<(DirectConnectConnectorOp, String)>> {
    match (current, desired) {
        (None, None) => Ok(Vec::new()),
        (None, Some(new_lag)) => {
            new_lag.validate()?;
            let message = format!("Create Direct Connect LAG {} in region {}", new_lag.name, region);
            Ok(vec![(DirectConnectConnectorOp::CreateLag(new_lag), message)])
        }
        (Some(old_lag), None) => Ok(vec![(
            DirectConnectConnectorOp::DeleteLag {
                force_destroy: old_lag.force_destroy,
            },
            format!("Delete Direct Connect LAG {} in region {}", lag_id, region),
        )]),
        (Some(old_lag), Some(new_lag)) => {
            new_lag.validate()?;

            if old_lag.requires_replacement(&new_lag) {
                return Ok(vec![
                    (
                        DirectConnectConnectorOp::DeleteLag {
                            force_destroy: new_lag.force_destroy || old_lag.force_destroy,
                        },
                        format!("Delete Direct Connect LAG {} in region {} for replacement", lag_id, region),
                    ),
                    (
                        DirectConnectConnectorOp::CreateLag(new_lag.clone()),
                        format!("Recreate Direct Connect LAG {} in region {}", new_lag.name, region),
                    ),
                ]);
            }

            let mut ops = Vec::new();

            if old_lag.name != new_lag.name {
                ops.push((
                    DirectConnectConnectorOp::UpdateLagName(new_lag.name.clone()),
                    format!(
                        "Rename Direct Connect LAG {} in region {}: {} -> {}",
                        lag_id, region, old_lag.name, new_lag.name
                    ),
                ));
            }

            if old_lag.force_destroy != new_lag.force_destroy {
                ops.push((
                    DirectConnectConnectorOp::SetForceDestroy(new_lag.force_destroy),
                    format!(
                        "Set force_destroy = {} for Direct Connect LAG {} in region {}",
                        new_lag.force_destroy, lag_id, region
                    ),
                ));
            }

            if old_lag.tags != new_lag.tags {
                let diff = diff_ron_values(&old_lag.tags, &new_lag.tags).unwrap_or_default();
                ops.push((
                    DirectConnectConnectorOp::UpdateLagTags(old_lag.tags, new_lag.tags),
                    format!("Update tags for Direct Connect LAG {} in region {}\n{}", lag_id, region, diff),
                ));
            }

            Ok(ops)
        }
    }
}

impl DirectConnectConnector {
    pub async fn do_plan(
        &self,
        addr: &Path,
        current: Option<String>,
        desired: Option<String>,
    ) -> Result<Vec<PlanResponseElement>, anyhow::Error> {
        let addr = DirectConnectResourceAddress::from_path(addr)?;

        match addr {
            DirectConnectResourceAddress::Lag { region, lag_id } => {
                let current: Option<Lag> = current.map(|s| RON.from_str(&s)).transpose()?;
                let desired: Option<Lag> = desired.map(|s| RON.from_str(&s)).transpose()?;

                let mut res = Vec::new();
                for (op, message) in plan_lag(&region, &lag_id, current, desired)? {
                    res.push(connector_op!(op, message));
                }
                Ok(res)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::Tags;

    fn lag() -> Lag {
        Lag {
            name: String::from("core-lag"),
            connections_bandwidth: String::from("10Gbps"),
            location: String::from("EqDC2"),
            provider_name: None,
            connection_id: None,
            request_macsec: false,
            force_destroy: false,
            tags: Tags::default(),
        }
    }

    fn ops(current: Option<Lag>, desired: Option<Lag>) -> Vec<DirectConnectConnectorOp> {
        plan_lag("us-west-2", "dxlag-fgnsp5rq", current, desired)
            .unwrap()
            .into_iter()
            .map(|(op, _)| op)
            .collect()
    }

    #[test]
    fn nothing_to_nothing() {
        assert!(ops(None, None).is_empty());
    }

    #[test]
    fn creates_new_lag() {
        assert_eq!(ops(None, Some(lag())), vec![DirectConnectConnectorOp::CreateLag(lag())]);
    }

    #[test]
    fn rejects_invalid_bandwidth_on_create() {
        let bad = Lag {
            connections_bandwidth: String::from("7Gbps"),
            ..lag()
        };
        assert!(plan_lag("us-west-2", "x", None, Some(bad)).is_err());
    }

    #[test]
    fn delete_carries_force_destroy() {
        let current = Lag {
            force_destroy: true,
            ..lag()
        };
        assert_eq!(
            ops(Some(current), None),
            vec![DirectConnectConnectorOp::DeleteLag { force_destroy: true }]
        );
    }

    #[test]
    fn rename_and_retag_update_in_place() {
        let desired = Lag {
            name: String::from("edge-lag"),
            tags: [("env", "prod")].into_iter().collect(),
            ..lag()
        };

        assert_eq!(
            ops(Some(lag()), Some(desired.clone())),
            vec![
                DirectConnectConnectorOp::UpdateLagName(String::from("edge-lag")),
                DirectConnectConnectorOp::UpdateLagTags(Tags::default(), desired.tags.clone()),
            ]
        );
    }

    #[test]
    fn force_destroy_flip_records_output() {
        let desired = Lag {
            force_destroy: true,
            ..lag()
        };
        assert_eq!(
            ops(Some(lag()), Some(desired.clone())),
            vec![DirectConnectConnectorOp::SetForceDestroy(true)]
        );
        assert_eq!(
            ops(Some(desired), Some(lag())),
            vec![DirectConnectConnectorOp::SetForceDestroy(false)]
        );
    }

    #[test]
    fn delete_uses_recorded_force_destroy() {
        let remote = aws_sdk_directconnect::types::Lag::builder()
            .lag_id("dxlag-fgnsp5rq")
            .lag_name("core-lag")
            .connections_bandwidth("10Gbps")
            .location("EqDC2")
            .build();

        // What do_get returns once the force_destroy output holds "true".
        let current = Lag {
            force_destroy: true,
            ..Lag::from_remote(&remote)
        };

        assert_eq!(
            ops(Some(current), None),
            vec![DirectConnectConnectorOp::DeleteLag { force_destroy: true }]
        );
        assert_eq!(
            ops(Some(Lag::from_remote(&remote)), None),
            vec![DirectConnectConnectorOp::DeleteLag { force_destroy: false }]
        );
    }

    #[test]
    fn bandwidth_change_replaces() {
        let desired = Lag {
            connections_bandwidth: String::from("100Gbps"),
            force_destroy: true,
            ..lag()
        };

        assert_eq!(
            ops(Some(lag()), Some(desired.clone())),
            vec![
                DirectConnectConnectorOp::DeleteLag { force_destroy: true },
                DirectConnectConnectorOp::CreateLag(desired),
            ]
        );
    }
}
