use anyhow::Context;
use autoschematic_core::connector::OpExecResponse;
use aws_sdk_iot::types::{
    DeviceDefenderIndexingMode, FieldType, GeoLocationTarget, NamedShadowIndexingMode, TargetFieldOrder,
    ThingConnectivityIndexingMode, ThingGroupIndexingMode, ThingIndexingMode,
};

use super::resource::{Field, IndexingConfiguration, ThingGroupIndexingConfiguration, ThingIndexingConfiguration};

fn fields_to_sdk(fields: &[Field]) -> Option<Vec<aws_sdk_iot::types::Field>> {
    if fields.is_empty() {
        return None;
    }

    Some(
        fields
            .iter()
            .map(|f| {
                aws_sdk_iot::types::Field::builder()
                    .name(&f.name)
                    .r#type(FieldType::from(f.r#type.as_str()))
                    .build()
            })
            .collect(),
    )
}

pub fn thing_indexing_to_sdk(
    config: &ThingIndexingConfiguration,
) -> anyhow::Result<aws_sdk_iot::types::ThingIndexingConfiguration> {
    let filter = config.filter.as_ref().map(|filter| {
        let geo_locations: Vec<GeoLocationTarget> = filter
            .geo_locations
            .iter()
            .map(|g| {
                GeoLocationTarget::builder()
                    .name(&g.name)
                    .order(TargetFieldOrder::from(g.order.as_str()))
                    .build()
            })
            .collect();

        aws_sdk_iot::types::IndexingFilter::builder()
            .set_named_shadow_names(Some(filter.named_shadow_names.clone()))
            .set_geo_locations(Some(geo_locations))
            .build()
    });

    // Managed fields are never sent: the service owns them.
    aws_sdk_iot::types::ThingIndexingConfiguration::builder()
        .thing_indexing_mode(ThingIndexingMode::from(config.thing_indexing_mode.as_str()))
        .thing_connectivity_indexing_mode(ThingConnectivityIndexingMode::from(
            config.thing_connectivity_indexing_mode.as_str(),
        ))
        .device_defender_indexing_mode(DeviceDefenderIndexingMode::from(config.device_defender_indexing_mode.as_str()))
        .named_shadow_indexing_mode(NamedShadowIndexingMode::from(config.named_shadow_indexing_mode.as_str()))
        .set_filter(filter)
        .set_custom_fields(fields_to_sdk(&config.custom_fields))
        .build()
        .context("Invalid thing indexing configuration")
}

pub fn thing_group_indexing_to_sdk(
    config: &ThingGroupIndexingConfiguration,
) -> anyhow::Result<aws_sdk_iot::types::ThingGroupIndexingConfiguration> {
    aws_sdk_iot::types::ThingGroupIndexingConfiguration::builder()
        .thing_group_indexing_mode(ThingGroupIndexingMode::from(config.thing_group_indexing_mode.as_str()))
        .set_custom_fields(fields_to_sdk(&config.custom_fields))
        .build()
        .context("Invalid thing group indexing configuration")
}

pub async fn update_indexing_configuration(
    client: &aws_sdk_iot::Client,
    region: &str,
    config: &IndexingConfiguration,
) -> Result<OpExecResponse, anyhow::Error> {
    config.validate()?;

    let thing = config
        .thing_indexing_configuration
        .as_ref()
        .map(thing_indexing_to_sdk)
        .transpose()?;
    let thing_group = config
        .thing_group_indexing_configuration
        .as_ref()
        .map(thing_group_indexing_to_sdk)
        .transpose()?;

    client
        .update_indexing_configuration()
        .set_thing_indexing_configuration(thing)
        .set_thing_group_indexing_configuration(thing_group)
        .send()
        .await
        .with_context(|| format!("Updating IoT indexing configuration in {region}"))?;

    tracing::info!("Updated IoT indexing configuration in {}", region);

    Ok(OpExecResponse {
        outputs: None,
        friendly_message: Some(format!("Updated IoT indexing configuration in region {region}")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::IndexingFilter;

    #[test]
    fn builds_thing_indexing_request() {
        let config = ThingIndexingConfiguration {
            thing_indexing_mode: String::from("REGISTRY_AND_SHADOW"),
            thing_connectivity_indexing_mode: String::from("STATUS"),
            device_defender_indexing_mode: String::from("OFF"),
            named_shadow_indexing_mode: String::from("ON"),
            filter: Some(IndexingFilter {
                named_shadow_names: vec![String::from("thing1shadow")],
                geo_locations: Vec::new(),
            }),
            custom_fields: vec![Field {
                name: String::from("attributes.version"),
                r#type: String::from("Number"),
            }],
            managed_fields: Some(vec![Field {
                name: String::from("thingName"),
                r#type: String::from("String"),
            }]),
        };

        let sdk = thing_indexing_to_sdk(&config).unwrap();

        assert_eq!(sdk.thing_indexing_mode, ThingIndexingMode::RegistryAndShadow);
        assert_eq!(
            sdk.thing_connectivity_indexing_mode,
            Some(ThingConnectivityIndexingMode::Status)
        );
        assert_eq!(sdk.named_shadow_indexing_mode, Some(NamedShadowIndexingMode::On));
        assert_eq!(sdk.custom_fields.as_ref().map(Vec::len), Some(1));
        assert!(sdk.managed_fields.is_none());
        assert_eq!(
            sdk.filter.and_then(|f| f.named_shadow_names),
            Some(vec![String::from("thing1shadow")])
        );
    }

    #[test]
    fn empty_custom_fields_are_not_sent() {
        let config = ThingGroupIndexingConfiguration {
            thing_group_indexing_mode: String::from("ON"),
            custom_fields: Vec::new(),
            managed_fields: None,
        };

        let sdk = thing_group_indexing_to_sdk(&config).unwrap();

        assert_eq!(sdk.thing_group_indexing_mode, ThingGroupIndexingMode::On);
        assert!(sdk.custom_fields.is_none());
    }
}
