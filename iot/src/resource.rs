use anyhow::bail;
use autoschematic_core::{
    connector::{Resource, ResourceAddress},
    util::{PrettyConfig, RON},
};
use aws_sdk_iot::types;
use serde::{Deserialize, Serialize};

use super::addr::IotResourceAddress;

pub const THING_INDEXING_MODES: &[&str] = &["OFF", "REGISTRY", "REGISTRY_AND_SHADOW"];
pub const THING_CONNECTIVITY_INDEXING_MODES: &[&str] = &["OFF", "STATUS"];
pub const DEVICE_DEFENDER_INDEXING_MODES: &[&str] = &["OFF", "VIOLATIONS"];
pub const NAMED_SHADOW_INDEXING_MODES: &[&str] = &["OFF", "ON"];
pub const THING_GROUP_INDEXING_MODES: &[&str] = &["OFF", "ON"];
pub const FIELD_TYPES: &[&str] = &["Number", "String", "Boolean"];
pub const GEO_LOCATION_ORDERS: &[&str] = &["LatLon", "LonLat"];

fn off() -> String {
    String::from("OFF")
}

fn lat_lon() -> String {
    String::from("LatLon")
}

fn check_one_of(what: &str, value: &str, allowed: &[&str]) -> anyhow::Result<()> {
    if !allowed.contains(&value) {
        bail!("Invalid {what} `{value}`, expected one of: {}", allowed.join(", "));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone)]
#[serde(deny_unknown_fields)]
pub struct Field {
    pub name: String,
    pub r#type: String,
}

impl Field {
    fn from_remote(field: &types::Field) -> Self {
        Field {
            name: field.name.clone().unwrap_or_default(),
            r#type: field.r#type.as_ref().map(|t| t.as_str().to_string()).unwrap_or_default(),
        }
    }

    fn from_remote_list(fields: &Option<Vec<types::Field>>) -> Vec<Field> {
        fields.iter().flatten().map(Field::from_remote).collect()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone)]
#[serde(deny_unknown_fields)]
pub struct GeoLocation {
    pub name: String,
    #[serde(default = "lat_lon")]
    pub order: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct IndexingFilter {
    #[serde(default)]
    pub named_shadow_names: Vec<String>,
    #[serde(default)]
    pub geo_locations: Vec<GeoLocation>,
}

impl IndexingFilter {
    fn is_empty(&self) -> bool {
        self.named_shadow_names.is_empty() && self.geo_locations.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ThingIndexingConfiguration {
    pub thing_indexing_mode: String,
    #[serde(default = "off")]
    pub thing_connectivity_indexing_mode: String,
    #[serde(default = "off")]
    pub device_defender_indexing_mode: String,
    #[serde(default = "off")]
    pub named_shadow_indexing_mode: String,
    #[serde(default)]
    pub filter: Option<IndexingFilter>,
    #[serde(default)]
    pub custom_fields: Vec<Field>,
    /// Fields the service indexes on its own. Read-only.
    #[serde(default)]
    pub managed_fields: Option<Vec<Field>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ThingGroupIndexingConfiguration {
    pub thing_group_indexing_mode: String,
    #[serde(default)]
    pub custom_fields: Vec<Field>,
    /// Fields the service indexes on its own. Read-only.
    #[serde(default)]
    pub managed_fields: Option<Vec<Field>>,
}

/// Fleet indexing settings for one region.
///
/// A sub-configuration left out of the file is not managed: it is neither
/// compared nor sent on update.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct IndexingConfiguration {
    #[serde(default)]
    pub thing_indexing_configuration: Option<ThingIndexingConfiguration>,
    #[serde(default)]
    pub thing_group_indexing_configuration: Option<ThingGroupIndexingConfiguration>,
}

impl ThingIndexingConfiguration {
    pub fn from_remote(config: &types::ThingIndexingConfiguration) -> Self {
        let filter = config.filter.as_ref().map(|f| IndexingFilter {
            named_shadow_names: f.named_shadow_names.clone().unwrap_or_default(),
            geo_locations: f
                .geo_locations
                .iter()
                .flatten()
                .map(|g| GeoLocation {
                    name: g.name.clone().unwrap_or_default(),
                    order: g.order.as_ref().map(|o| o.as_str().to_string()).unwrap_or_else(lat_lon),
                })
                .collect(),
        });

        ThingIndexingConfiguration {
            thing_indexing_mode: config.thing_indexing_mode.as_str().to_string(),
            thing_connectivity_indexing_mode: config
                .thing_connectivity_indexing_mode
                .as_ref()
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(off),
            device_defender_indexing_mode: config
                .device_defender_indexing_mode
                .as_ref()
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(off),
            named_shadow_indexing_mode: config
                .named_shadow_indexing_mode
                .as_ref()
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(off),
            filter,
            custom_fields: Field::from_remote_list(&config.custom_fields),
            managed_fields: Some(Field::from_remote_list(&config.managed_fields)),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        check_one_of("thing_indexing_mode", &self.thing_indexing_mode, THING_INDEXING_MODES)?;
        check_one_of(
            "thing_connectivity_indexing_mode",
            &self.thing_connectivity_indexing_mode,
            THING_CONNECTIVITY_INDEXING_MODES,
        )?;
        check_one_of(
            "device_defender_indexing_mode",
            &self.device_defender_indexing_mode,
            DEVICE_DEFENDER_INDEXING_MODES,
        )?;
        check_one_of(
            "named_shadow_indexing_mode",
            &self.named_shadow_indexing_mode,
            NAMED_SHADOW_INDEXING_MODES,
        )?;

        for field in &self.custom_fields {
            check_one_of(&format!("type for custom field {}", field.name), &field.r#type, FIELD_TYPES)?;
        }

        if let Some(filter) = &self.filter {
            for geo in &filter.geo_locations {
                check_one_of(&format!("order for geo location {}", geo.name), &geo.order, GEO_LOCATION_ORDERS)?;
            }
        }

        Ok(())
    }

    fn normalize(&mut self) {
        self.custom_fields.sort();
        self.custom_fields.dedup();
        if let Some(managed) = &mut self.managed_fields {
            managed.sort();
            managed.dedup();
        }
        if let Some(filter) = &mut self.filter {
            filter.named_shadow_names.sort();
            filter.named_shadow_names.dedup();
            filter.geo_locations.sort();
        }
        if self.filter.as_ref().is_some_and(IndexingFilter::is_empty) {
            self.filter = None;
        }
    }
}

impl ThingGroupIndexingConfiguration {
    pub fn from_remote(config: &types::ThingGroupIndexingConfiguration) -> Self {
        ThingGroupIndexingConfiguration {
            thing_group_indexing_mode: config.thing_group_indexing_mode.as_str().to_string(),
            custom_fields: Field::from_remote_list(&config.custom_fields),
            managed_fields: Some(Field::from_remote_list(&config.managed_fields)),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        check_one_of(
            "thing_group_indexing_mode",
            &self.thing_group_indexing_mode,
            THING_GROUP_INDEXING_MODES,
        )?;

        for field in &self.custom_fields {
            check_one_of(&format!("type for custom field {}", field.name), &field.r#type, FIELD_TYPES)?;
        }

        Ok(())
    }

    fn normalize(&mut self) {
        self.custom_fields.sort();
        self.custom_fields.dedup();
        if let Some(managed) = &mut self.managed_fields {
            managed.sort();
            managed.dedup();
        }
    }
}

impl IndexingConfiguration {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(thing) = &self.thing_indexing_configuration {
            thing.validate()?;
        }
        if let Some(thing_group) = &self.thing_group_indexing_configuration {
            thing_group.validate()?;
        }
        Ok(())
    }

    /// Whether `self` and `other` describe the same indexing settings.
    ///
    /// Field lists and shadow names compare as sets. A sub-configuration or a
    /// `managed_fields` list that either side leaves out is not compared.
    pub fn matches(&self, other: &IndexingConfiguration) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();

        match (&mut a.thing_indexing_configuration, &mut b.thing_indexing_configuration) {
            (Some(x), Some(y)) => {
                x.normalize();
                y.normalize();
                if x.managed_fields.is_none() || y.managed_fields.is_none() {
                    x.managed_fields = None;
                    y.managed_fields = None;
                }
            }
            _ => {
                a.thing_indexing_configuration = None;
                b.thing_indexing_configuration = None;
            }
        }

        match (
            &mut a.thing_group_indexing_configuration,
            &mut b.thing_group_indexing_configuration,
        ) {
            (Some(x), Some(y)) => {
                x.normalize();
                y.normalize();
                if x.managed_fields.is_none() || y.managed_fields.is_none() {
                    x.managed_fields = None;
                    y.managed_fields = None;
                }
            }
            _ => {
                a.thing_group_indexing_configuration = None;
                b.thing_group_indexing_configuration = None;
            }
        }

        a == b
    }
}

pub fn indexing_configuration_eq(a: &[u8], b: &[u8]) -> anyhow::Result<bool> {
    let a: IndexingConfiguration = RON.from_str(str::from_utf8(a)?)?;
    let b: IndexingConfiguration = RON.from_str(str::from_utf8(b)?)?;
    Ok(a.matches(&b))
}

pub enum IotResource {
    IndexingConfiguration(IndexingConfiguration),
}

impl Resource for IotResource {
    fn to_bytes(&self) -> Result<Vec<u8>, anyhow::Error> {
        let pretty_config = PrettyConfig::default().struct_names(true);

        match self {
            IotResource::IndexingConfiguration(config) => Ok(RON.to_string_pretty(&config, pretty_config)?.into()),
        }
    }

    fn from_bytes(addr: &impl ResourceAddress, s: &[u8]) -> Result<Self, anyhow::Error>
    where
        Self: Sized,
    {
        let addr = IotResourceAddress::from_path(&addr.to_path_buf())?;
        let s = str::from_utf8(s)?;

        match addr {
            IotResourceAddress::IndexingConfiguration { .. } => Ok(IotResource::IndexingConfiguration(RON.from_str(s)?)),
        }
    }
}
