use anyhow::bail;
use autoschematic_core::{
    connector::{Resource, ResourceAddress},
    util::{PrettyConfig, RON},
};
use aws_sdk_ssmquicksetup::operation::get_configuration_manager::GetConfigurationManagerOutput;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{addr::SsmQuickSetupResourceAddress, tags::Tags};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationDefinition {
    /// Quick Setup type, e.g. `AWSQuickSetupType-PatchPolicy`.
    pub r#type: String,
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
    #[serde(default)]
    pub type_version: Option<String>,
    #[serde(default)]
    pub local_deployment_administration_role_arn: Option<String>,
    #[serde(default)]
    pub local_deployment_execution_role_name: Option<String>,
    /// Assigned by the service. Once known, it pins this entry to a remote definition.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationManager {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub configuration_definitions: Vec<ConfigurationDefinition>,
    #[serde(default)]
    pub tags: Tags,
}

// Computed fields only count as a difference when both sides carry a value.
fn computed_eq(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

impl ConfigurationDefinition {
    pub fn from_remote(definition: &aws_sdk_ssmquicksetup::types::ConfigurationDefinition) -> Self {
        let mut parameters: Vec<(String, String)> = definition
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        parameters.sort();

        ConfigurationDefinition {
            r#type: definition.r#type.clone(),
            parameters: parameters.into_iter().collect(),
            type_version: definition.type_version.clone(),
            local_deployment_administration_role_arn: definition.local_deployment_administration_role_arn.clone(),
            local_deployment_execution_role_name: definition.local_deployment_execution_role_name.clone(),
            id: definition.id.clone(),
        }
    }

    /// Whether the updatable settings of `self` and `other` agree.
    pub fn settings_match(&self, other: &ConfigurationDefinition) -> bool {
        self.parameters == other.parameters
            && computed_eq(&self.type_version, &other.type_version)
            && computed_eq(
                &self.local_deployment_administration_role_arn,
                &other.local_deployment_administration_role_arn,
            )
            && computed_eq(
                &self.local_deployment_execution_role_name,
                &other.local_deployment_execution_role_name,
            )
    }
}

impl ConfigurationManager {
    pub fn from_remote(output: &GetConfigurationManagerOutput) -> Self {
        ConfigurationManager {
            name: output.name.clone().unwrap_or_default(),
            description: output.description.clone(),
            configuration_definitions: output
                .configuration_definitions
                .iter()
                .flatten()
                .map(ConfigurationDefinition::from_remote)
                .collect(),
            tags: output.tags.clone().into(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.configuration_definitions.is_empty() {
            bail!("A configuration manager needs at least one configuration definition");
        }
        for definition in &self.configuration_definitions {
            if definition.r#type.is_empty() {
                bail!("Configuration definition type must not be empty");
            }
        }
        Ok(())
    }

    /// Pairs each desired definition with the current one it updates: by `id`
    /// when the desired entry carries one, by position otherwise.
    ///
    /// Returns `None` when the definitions cannot be paired one to one, or when a
    /// pair differs in `type`. Either case needs a new manager.
    pub fn pair_definitions<'a>(
        &'a self,
        desired: &'a ConfigurationManager,
    ) -> Option<Vec<(&'a ConfigurationDefinition, &'a ConfigurationDefinition)>> {
        if self.configuration_definitions.len() != desired.configuration_definitions.len() {
            return None;
        }

        let mut claimed = vec![false; self.configuration_definitions.len()];
        let mut pairs = Vec::new();
        for (i, wanted) in desired.configuration_definitions.iter().enumerate() {
            let index = match &wanted.id {
                Some(id) => self.configuration_definitions.iter().position(|d| d.id.as_ref() == Some(id))?,
                None => i,
            };

            // Each current definition backs at most one desired entry.
            if std::mem::replace(&mut claimed[index], true) {
                return None;
            }

            let current = &self.configuration_definitions[index];
            if current.r#type != wanted.r#type {
                return None;
            }
            pairs.push((current, wanted));
        }

        Some(pairs)
    }

    /// Whether `self` and `other` describe the same manager, ignoring computed
    /// fields that either side leaves unset.
    pub fn matches(&self, other: &ConfigurationManager) -> bool {
        if self.name != other.name || !computed_eq(&self.description, &other.description) || self.tags != other.tags {
            return false;
        }

        match self.pair_definitions(other) {
            Some(pairs) => pairs.iter().all(|(a, b)| a.settings_match(b) && computed_eq(&a.id, &b.id)),
            None => false,
        }
    }
}

pub fn configuration_manager_eq(a: &[u8], b: &[u8]) -> anyhow::Result<bool> {
    let a: ConfigurationManager = RON.from_str(str::from_utf8(a)?)?;
    let b: ConfigurationManager = RON.from_str(str::from_utf8(b)?)?;
    Ok(a.matches(&b))
}

pub enum SsmQuickSetupResource {
    ConfigurationManager(ConfigurationManager),
}

impl Resource for SsmQuickSetupResource {
    fn to_bytes(&self) -> Result<Vec<u8>, anyhow::Error> {
        let pretty_config = PrettyConfig::default().struct_names(true);

        match self {
            SsmQuickSetupResource::ConfigurationManager(manager) => Ok(RON.to_string_pretty(&manager, pretty_config)?.into()),
        }
    }

    fn from_bytes(addr: &impl ResourceAddress, s: &[u8]) -> Result<Self, anyhow::Error>
    where
        Self: Sized,
    {
        let addr = SsmQuickSetupResourceAddress::from_path(&addr.to_path_buf())?;
        let s = str::from_utf8(s)?;

        match addr {
            SsmQuickSetupResourceAddress::ConfigurationManager { .. } => {
                Ok(SsmQuickSetupResource::ConfigurationManager(RON.from_str(s)?))
            }
        }
    }
}
