use std::path::Path;

use autoschematic_core::{
    connector::{ConnectorOp, PlanResponseElement, ResourceAddress},
    connector_op,
    util::{RON, diff_ron_values},
};

use crate::{addr::IotResourceAddress, op::IotConnectorOp, resource::IndexingConfiguration};

use super::IotConnector;

pub fn plan_indexing_configuration(
    region: &str,
    current: Option<IndexingConfiguration>,
    desired: Option<IndexingConfiguration>,
) -> anyhow::Result<Vec<(IotConnectorOp, String)>> {
    match (current, desired) {
        // The configuration cannot be deleted. Dropping the file only stops managing it.
        (_, None) => Ok(Vec::new()),
        (None, Some(desired)) => {
            desired.validate()?;
            Ok(vec![(
                IotConnectorOp::UpdateIndexingConfiguration(desired),
                format!("Set IoT indexing configuration in region {}", region),
            )])
        }
        (Some(current), Some(desired)) => {
            desired.validate()?;

            if current.matches(&desired) {
                return Ok(Vec::new());
            }

            let diff = diff_ron_values(&current, &desired).unwrap_or_default();
            Ok(vec![(
                IotConnectorOp::UpdateIndexingConfiguration(desired),
                format!("Update IoT indexing configuration in region {}\n{}", region, diff),
            )])
        }
    }
}

impl IotConnector {
    pub async fn do_plan(
        &self,
        addr: &Path,
        current: Option<String>,
        desired: Option<String>,
    ) -> Result<Vec<PlanResponseElement>, anyhow::Error> {
        let addr = IotResourceAddress::from_path(addr)?;

        match addr {
            IotResourceAddress::IndexingConfiguration { region } => {
                let current: Option<IndexingConfiguration> = current.map(|s| RON.from_str(&s)).transpose()?;
                let desired: Option<IndexingConfiguration> = desired.map(|s| RON.from_str(&s)).transpose()?;

                let mut res = Vec::new();
                for (op, message) in plan_indexing_configuration(&region, current, desired)? {
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
    use crate::resource::{Field, ThingGroupIndexingConfiguration, ThingIndexingConfiguration};

    fn basic() -> IndexingConfiguration {
        IndexingConfiguration {
            thing_indexing_configuration: Some(ThingIndexingConfiguration {
                thing_indexing_mode: String::from("OFF"),
                thing_connectivity_indexing_mode: String::from("OFF"),
                device_defender_indexing_mode: String::from("OFF"),
                named_shadow_indexing_mode: String::from("OFF"),
                filter: None,
                custom_fields: Vec::new(),
                managed_fields: None,
            }),
            thing_group_indexing_configuration: Some(ThingGroupIndexingConfiguration {
                thing_group_indexing_mode: String::from("OFF"),
                custom_fields: Vec::new(),
                managed_fields: None,
            }),
        }
    }

    #[test]
    fn create_sets_configuration() {
        let ops = plan_indexing_configuration("us-east-1", None, Some(basic())).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].0, IotConnectorOp::UpdateIndexingConfiguration(basic()));
    }

    #[test]
    fn delete_is_a_no_op() {
        assert!(plan_indexing_configuration("us-east-1", Some(basic()), None).unwrap().is_empty());
    }

    #[test]
    fn remote_managed_fields_do_not_cause_updates() {
        let mut remote = basic();
        remote.thing_indexing_configuration.as_mut().unwrap().managed_fields = Some(vec![Field {
            name: String::from("thingName"),
            r#type: String::from("String"),
        }]);

        assert!(plan_indexing_configuration("us-east-1", Some(remote), Some(basic())).unwrap().is_empty());
    }

    #[test]
    fn mode_change_updates() {
        let mut desired = basic();
        desired.thing_group_indexing_configuration.as_mut().unwrap().thing_group_indexing_mode = String::from("ON");

        let ops = plan_indexing_configuration("us-east-1", Some(basic()), Some(desired.clone())).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].0, IotConnectorOp::UpdateIndexingConfiguration(desired));
    }

    #[test]
    fn invalid_desired_is_rejected() {
        let mut desired = basic();
        desired.thing_indexing_configuration.as_mut().unwrap().thing_indexing_mode = String::from("ALL");

        assert!(plan_indexing_configuration("us-east-1", Some(basic()), Some(desired)).is_err());
    }
}
