use std::collections::HashMap;

use anyhow::Context;
use autoschematic_connector_aws_core::arn::Arn;
use autoschematic_core::connector::OpExecResponse;
use aws_sdk_ssmquicksetup::{
    operation::delete_configuration_manager::DeleteConfigurationManagerError, types::ConfigurationDefinitionInput,
};

use super::{
    resource::{ConfigurationDefinition, ConfigurationManager},
    status,
    tags::{Tags, tag_diff},
};

pub fn manager_arn(region: &str, account_id: &str, manager_id: &str) -> Arn {
    Arn::regional("ssm-quicksetup", region, account_id, format!("configuration-manager/{manager_id}"))
}

pub fn definition_input(definition: &ConfigurationDefinition) -> anyhow::Result<ConfigurationDefinitionInput> {
    ConfigurationDefinitionInput::builder()
        .r#type(&definition.r#type)
        .set_parameters(Some(
            definition
                .parameters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ))
        .set_type_version(definition.type_version.clone())
        .set_local_deployment_administration_role_arn(definition.local_deployment_administration_role_arn.clone())
        .set_local_deployment_execution_role_name(definition.local_deployment_execution_role_name.clone())
        .build()
        .with_context(|| format!("Invalid configuration definition {}", definition.r#type))
}

pub async fn create_configuration_manager(
    client: &aws_sdk_ssmquicksetup::Client,
    manager: &ConfigurationManager,
) -> Result<OpExecResponse, anyhow::Error> {
    manager.validate()?;

    let definitions = manager
        .configuration_definitions
        .iter()
        .map(definition_input)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let tags = if manager.tags.is_empty() { None } else { Some(manager.tags.to_map()) };

    let output = client
        .create_configuration_manager()
        .name(&manager.name)
        .set_description(manager.description.clone())
        .set_configuration_definitions(Some(definitions))
        .set_tags(tags)
        .send()
        .await
        .with_context(|| format!("Creating configuration manager {}", manager.name))?;

    let arn = output.manager_arn;

    status::wait_configuration_manager_created(client, &arn)
        .await
        .with_context(|| format!("Waiting for configuration manager {arn} to deploy"))?;

    let mut outputs = HashMap::new();
    outputs.insert(String::from("manager_arn"), Some(arn.clone()));

    Ok(OpExecResponse {
        outputs: Some(outputs),
        friendly_message: Some(format!("Created configuration manager {} ({})", manager.name, arn)),
    })
}

pub async fn update_configuration_manager(
    client: &aws_sdk_ssmquicksetup::Client,
    arn: &str,
    name: &str,
    description: Option<&str>,
) -> Result<OpExecResponse, anyhow::Error> {
    client
        .update_configuration_manager()
        .manager_arn(arn)
        .name(name)
        .set_description(description.map(String::from))
        .send()
        .await?;

    status::wait_configuration_manager_updated(client, arn)
        .await
        .with_context(|| format!("Waiting for configuration manager {arn} to deploy"))?;

    Ok(OpExecResponse {
        outputs: None,
        friendly_message: Some(format!("Updated configuration manager {name}")),
    })
}

pub async fn update_configuration_definition(
    client: &aws_sdk_ssmquicksetup::Client,
    arn: &str,
    id: &str,
    definition: &ConfigurationDefinition,
) -> Result<OpExecResponse, anyhow::Error> {
    client
        .update_configuration_definition()
        .manager_arn(arn)
        .id(id)
        .set_parameters(Some(
            definition
                .parameters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ))
        .set_type_version(definition.type_version.clone())
        .set_local_deployment_administration_role_arn(definition.local_deployment_administration_role_arn.clone())
        .set_local_deployment_execution_role_name(definition.local_deployment_execution_role_name.clone())
        .send()
        .await?;

    status::wait_configuration_manager_updated(client, arn)
        .await
        .with_context(|| format!("Waiting for configuration manager {arn} to deploy"))?;

    Ok(OpExecResponse {
        outputs: None,
        friendly_message: Some(format!("Updated {} definition {} of {}", definition.r#type, id, arn)),
    })
}

pub async fn update_tags(
    client: &aws_sdk_ssmquicksetup::Client,
    arn: &str,
    old_tags: &Tags,
    new_tags: &Tags,
) -> Result<OpExecResponse, anyhow::Error> {
    let (untag_keys, new_tagset) = tag_diff(old_tags, new_tags);

    if !untag_keys.is_empty() {
        client
            .untag_resource()
            .resource_arn(arn)
            .set_tag_keys(Some(untag_keys))
            .send()
            .await?;
    }

    if !new_tagset.is_empty() {
        client.tag_resource().resource_arn(arn).set_tags(Some(new_tagset)).send().await?;
    }

    Ok(OpExecResponse {
        outputs: None,
        friendly_message: Some(format!("Updated tags for configuration manager {arn}")),
    })
}

pub async fn delete_configuration_manager(
    client: &aws_sdk_ssmquicksetup::Client,
    arn: &str,
) -> Result<OpExecResponse, anyhow::Error> {
    tracing::info!("Deleting configuration manager {}", arn);

    if let Err(e) = client.delete_configuration_manager().manager_arn(arn).send().await {
        if let Some(DeleteConfigurationManagerError::ResourceNotFoundException(_)) = e.as_service_error() {
            tracing::warn!("Configuration manager {} was already deleted", arn);
            return Ok(OpExecResponse {
                outputs: None,
                friendly_message: Some(format!("Configuration manager {arn} was already deleted")),
            });
        }
        return Err(e).with_context(|| format!("Deleting configuration manager {arn}"));
    }

    status::wait_configuration_manager_deleted(client, arn)
        .await
        .with_context(|| format!("Waiting for configuration manager {arn} to be deleted"))?;

    Ok(OpExecResponse {
        outputs: None,
        friendly_message: Some(format!("Deleted configuration manager {arn}")),
    })
}

#[cfg(test)]
mod tests {
    use aws_sdk_ssmquicksetup::config::{BehaviorVersion, Credentials, Region};
    use serde_json::json;
    use wiremock::{
        Mock, MockBuilder, MockServer, ResponseTemplate,
        matchers::{method, path, path_regex},
    };

    use super::*;
    use crate::resource::tests::{manager, patch_policy};

    const ARN: &str = "arn:aws:ssm-quicksetup:us-east-1:123456789012:configuration-manager/7a1b3c5d";

    fn mock_client(server: &MockServer) -> aws_sdk_ssmquicksetup::Client {
        let config = aws_sdk_ssmquicksetup::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(server.uri())
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
            .build();
        aws_sdk_ssmquicksetup::Client::from_conf(config)
    }

    fn get_manager() -> MockBuilder {
        Mock::given(method("GET")).and(path_regex("^/configurationManager/.+"))
    }

    fn with_status(status: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "ManagerArn": ARN,
            "Name": "patching",
            "StatusSummaries": [
                { "StatusType": "AsyncExecutions", "Status": "FAILED", "LastUpdatedAt": "2024-11-01T00:00:00Z" },
                { "StatusType": "Deployment", "Status": status, "LastUpdatedAt": "2024-11-01T00:00:00Z" },
            ],
        }))
    }

    fn not_found() -> ResponseTemplate {
        ResponseTemplate::new(404)
            .insert_header("x-amzn-errortype", "ResourceNotFoundException")
            .set_body_json(json!({ "Message": "Configuration manager not found" }))
    }

    #[test]
    fn manager_arn_format() {
        let arn = manager_arn("us-east-1", "123456789012", "7a1b3c5d-2e4f-4a6b-8c0d-1e2f3a4b5c6d");
        assert_eq!(
            arn.to_string(),
            "arn:aws:ssm-quicksetup:us-east-1:123456789012:configuration-manager/7a1b3c5d-2e4f-4a6b-8c0d-1e2f3a4b5c6d"
        );
        assert_eq!(arn.resource_id(), "7a1b3c5d-2e4f-4a6b-8c0d-1e2f3a4b5c6d");
    }

    #[test]
    fn definition_input_carries_parameters() {
        let input = definition_input(&patch_policy(None)).unwrap();

        assert_eq!(input.r#type, "AWSQuickSetupType-PatchPolicy");
        assert_eq!(
            input.parameters.get("ConfigurationOptionsPatchOperation").map(String::as_str),
            Some("Scan")
        );
        assert!(input.type_version.is_none());
    }

    #[tokio::test]
    async fn create_waits_for_deployment() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/configurationManager"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ManagerArn": ARN })))
            .expect(1)
            .mount(&server)
            .await;
        get_manager()
            .respond_with(with_status("DEPLOYING"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        get_manager()
            .respond_with(with_status("SUCCEEDED"))
            .expect(1)
            .mount(&server)
            .await;

        let res = create_configuration_manager(&mock_client(&server), &manager(None))
            .await
            .unwrap();

        assert_eq!(res.outputs.unwrap()["manager_arn"].as_deref(), Some(ARN));
    }

    #[tokio::test]
    async fn create_fails_when_deployment_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/configurationManager"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ManagerArn": ARN })))
            .mount(&server)
            .await;
        get_manager().respond_with(with_status("FAILED")).mount(&server).await;

        let err = create_configuration_manager(&mock_client(&server), &manager(None))
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("unexpected state `FAILED`"));
    }

    #[tokio::test]
    async fn delete_waits_until_gone() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path_regex("^/configurationManager/.+"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        get_manager()
            .respond_with(with_status("DELETING"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        get_manager().respond_with(not_found()).expect(1).mount(&server).await;

        let res = delete_configuration_manager(&mock_client(&server), ARN).await.unwrap();

        assert_eq!(res.friendly_message, Some(format!("Deleted configuration manager {ARN}")));
    }

    #[tokio::test]
    async fn deleting_a_missing_manager_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path_regex("^/configurationManager/.+"))
            .respond_with(not_found())
            .expect(1)
            .mount(&server)
            .await;
        get_manager().respond_with(not_found()).expect(0).mount(&server).await;

        let res = delete_configuration_manager(&mock_client(&server), ARN).await.unwrap();

        assert_eq!(
            res.friendly_message,
            Some(format!("Configuration manager {ARN} was already deleted"))
        );
    }
}
