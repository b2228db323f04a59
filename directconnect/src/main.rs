use autoschematic_connector_aws_directconnect::connector::DirectConnectConnector;
use autoschematic_core::tarpc_bridge::tarpc_connector_main;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    autoschematic_connector_aws_core::logging::init();
    tarpc_connector_main::<DirectConnectConnector>().await?;
    Ok(())
}
