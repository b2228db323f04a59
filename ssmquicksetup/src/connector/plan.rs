use std::path::Path;

use anyhow::bail;
use autoschematic_core::{
    connector::{ConnectorOp, PlanResponseElement, ResourceAddress},
    connector_op,
    util::{RON, diff_ron_values},
};

use crate::{addr::SsmQuickSetupResourceAddress, op::SsmQuickSetupConnectorOp, resource::ConfigurationManager};

use super::SsmQuickSetupConnector;

pub fn plan_configuration_manager(
    region: &str,
    manager_id: &str,
    current: Option<ConfigurationManager>,
    desired: Option<ConfigurationManager>,
) -> anyhow::Result<Vec<(SsmQuickSetupConnectorOp, String)>> {
    match (current, desired) {
        (None, None) => Ok(Vec::new()),
        (None, Some(new_manager)) => {
            new_manager.validate()?;
            let message = format!("Create configuration manager {} in region {}", new_manager.name, region);
            Ok(vec![(SsmQuickSetupConnectorOp::CreateConfigurationManager(new_manager), message)])
        }
        (Some(_old_manager), None) => Ok(vec![(
            SsmQuickSetupConnectorOp::DeleteConfigurationManager,
            format!("Delete configuration manager {} in region {}", manager_id, region),
        )]),
        (Some(old_manager), Some(new_manager)) => {
            new_manager.validate()?;

            let Some(pairs) = old_manager.pair_definitions(&new_manager) else {
                return Ok(vec![
                    (
                        SsmQuickSetupConnectorOp::DeleteConfigurationManager,
                        format!(
                            "Delete configuration manager {} in region {} for replacement: configuration definitions changed shape",
                            manager_id, region
                        ),
                    ),
                    (
                        SsmQuickSetupConnectorOp::CreateConfigurationManager(new_manager.clone()),
                        format!("Recreate configuration manager {} in region {}", new_manager.name, region),
                    ),
                ]);
            };

            let mut ops = Vec::new();

            let description_changed = new_manager.description.is_some() && new_manager.description != old_manager.description;
            if old_manager.name != new_manager.name || description_changed {
                ops.push((
                    SsmQuickSetupConnectorOp::UpdateConfigurationManager {
                        name: new_manager.name.clone(),
                        description: new_manager.description.clone(),
                    },
                    format!("Update name and description of configuration manager {} in region {}", manager_id, region),
                ));
            }

            for (current, wanted) in pairs {
                if current.settings_match(wanted) {
                    continue;
                }

                let Some(id) = current.id.clone() else {
                    bail!(
                        "Configuration definition {} of manager {} has no id to update",
                        current.r#type,
                        manager_id
                    );
                };

                let diff = diff_ron_values(current, wanted).unwrap_or_default();
                ops.push((
                    SsmQuickSetupConnectorOp::UpdateConfigurationDefinition {
                        id: id.clone(),
                        definition: wanted.clone(),
                    },
                    format!(
                        "Update {} definition {} of configuration manager {} in region {}\n{}",
                        wanted.r#type, id, manager_id, region, diff
                    ),
                ));
            }

            if old_manager.tags != new_manager.tags {
                let diff = diff_ron_values(&old_manager.tags, &new_manager.tags).unwrap_or_default();
                ops.push((
                    SsmQuickSetupConnectorOp::UpdateTags(old_manager.tags.clone(), new_manager.tags.clone()),
                    format!("Update tags for configuration manager {} in region {}\n{}", manager_id, region, diff),
                ));
            }

            Ok(ops)
        }
    }
}

impl SsmQuickSetupConnector {
    pub async fn do_plan(
        &self,
        addr: &Path,
        current: Option<String>,
        desired: Option<String>,
    ) -> Result<Vec<PlanResponseElement>, anyhow::Error> {
        let addr = SsmQuickSetupResourceAddress::from_path(addr)?;

        match addr {
            SsmQuickSetupResourceAddress::ConfigurationManager { region, manager_id } => {
                let current: Option<ConfigurationManager> = current.map(|s| RON.from_str(&s)).transpose()?;
                let desired: Option<ConfigurationManager> = desired.map(|s| RON.from_str(&s)).transpose()?;

                let mut res = Vec::new();
                for (op, message) in plan_configuration_manager(&region, &manager_id, current, desired)? {
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
    use crate::{
        resource::tests::{manager, patch_policy},
        tags::Tags,
    };

    fn ops(current: Option<ConfigurationManager>, desired: Option<ConfigurationManager>) -> Vec<SsmQuickSetupConnectorOp> {
        plan_configuration_manager("us-east-1", "7a1b3c5d", current, desired)
            .unwrap()
            .into_iter()
            .map(|(op, _)| op)
            .collect()
    }

    #[test]
    fn create_and_delete() {
        assert_eq!(
            ops(None, Some(manager(None))),
            vec![SsmQuickSetupConnectorOp::CreateConfigurationManager(manager(None))]
        );
        assert_eq!(
            ops(Some(manager(Some("def-1"))), None),
            vec![SsmQuickSetupConnectorOp::DeleteConfigurationManager]
        );
    }

    #[test]
    fn unchanged_manager_plans_nothing() {
        let mut remote = manager(Some("def-1"));
        remote.configuration_definitions[0].type_version = Some(String::from("1.0"));

        assert!(ops(Some(remote), Some(manager(None))).is_empty());
    }

    #[test]
    fn parameter_change_updates_definition_by_current_id() {
        let mut desired = manager(None);
        desired.configuration_definitions[0]
            .parameters
            .insert(String::from("ConfigurationOptionsPatchOperation"), String::from("ScanAndInstall"));

        assert_eq!(
            ops(Some(manager(Some("def-1"))), Some(desired.clone())),
            vec![SsmQuickSetupConnectorOp::UpdateConfigurationDefinition {
                id: String::from("def-1"),
                definition: desired.configuration_definitions[0].clone(),
            }]
        );
    }

    #[test]
    fn rename_updates_manager() {
        let desired = ConfigurationManager {
            name: String::from("patching-prod"),
            description: Some(String::from("Production patching")),
            ..manager(None)
        };

        assert_eq!(
            ops(Some(manager(Some("def-1"))), Some(desired)),
            vec![SsmQuickSetupConnectorOp::UpdateConfigurationManager {
                name: String::from("patching-prod"),
                description: Some(String::from("Production patching")),
            }]
        );
    }

    #[test]
    fn added_definition_replaces_manager() {
        let mut desired = manager(None);
        desired.configuration_definitions.push(patch_policy(None));

        assert_eq!(
            ops(Some(manager(Some("def-1"))), Some(desired.clone())),
            vec![
                SsmQuickSetupConnectorOp::DeleteConfigurationManager,
                SsmQuickSetupConnectorOp::CreateConfigurationManager(desired),
            ]
        );
    }

    #[test]
    fn conflicting_pairing_replaces_manager() {
        let current = ConfigurationManager {
            configuration_definitions: vec![patch_policy(Some("def-1")), patch_policy(Some("def-2"))],
            ..manager(None)
        };
        let mut changed = patch_policy(Some("def-1"));
        changed
            .parameters
            .insert(String::from("ConfigurationOptionsPatchOperation"), String::from("ScanAndInstall"));
        let desired = ConfigurationManager {
            configuration_definitions: vec![patch_policy(None), changed],
            ..manager(None)
        };

        assert_eq!(
            ops(Some(current), Some(desired.clone())),
            vec![
                SsmQuickSetupConnectorOp::DeleteConfigurationManager,
                SsmQuickSetupConnectorOp::CreateConfigurationManager(desired),
            ]
        );
    }

    #[test]
    fn tag_change_updates_tags() {
        let desired = ConfigurationManager {
            tags: [("env", "prod")].into_iter().collect(),
            ..manager(None)
        };

        assert_eq!(
            ops(Some(manager(Some("def-1"))), Some(desired.clone())),
            vec![SsmQuickSetupConnectorOp::UpdateTags(Tags::default(), desired.tags)]
        );
    }
}
