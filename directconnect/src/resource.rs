use anyhow::bail;
use autoschematic_core::{
    connector::{Resource, ResourceAddress},
    util::{PrettyConfig, RON},
};
use serde::{Deserialize, Serialize};

use super::{addr::DirectConnectResourceAddress, tags::Tags};

/// Port speeds accepted by CreateLag.
pub const CONNECTION_BANDWIDTHS: &[&str] = &[
    "50Mbps", "100Mbps", "200Mbps", "300Mbps", "400Mbps", "500Mbps", "1Gbps", "2Gbps", "5Gbps", "10Gbps", "25Gbps", "100Gbps",
    "400Gbps",
];

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Lag {
    pub name: String,
    pub connections_bandwidth: String,
    pub location: String,
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Existing dedicated connection to migrate into the LAG on creation.
    /// When unset, the connection AWS creates alongside the LAG is deleted.
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub request_macsec: bool,
    /// Delete member connections before deleting the LAG.
    /// Kept in the `force_destroy` output, since AWS has no such attribute.
    #[serde(default)]
    pub force_destroy: bool,
    #[serde(default)]
    pub tags: Tags,
}

impl Lag {
    pub fn from_remote(lag: &aws_sdk_directconnect::types::Lag) -> Self {
        Lag {
            name: lag.lag_name.clone().unwrap_or_default(),
            connections_bandwidth: lag.connections_bandwidth.clone().unwrap_or_default(),
            location: lag.location.clone().unwrap_or_default(),
            provider_name: lag.provider_name.clone(),
            connection_id: None,
            request_macsec: lag.mac_sec_capable.unwrap_or(false),
            force_destroy: false,
            tags: lag.tags.clone().into(),
        }
    }

    /// Clears `connection_id`, which only exists on the desired side and can never be read back.
    pub fn without_write_only(&self) -> Self {
        Lag {
            connection_id: None,
            ..self.clone()
        }
    }

    /// Whether moving from `self` to `desired` needs a new LAG.
    /// An unset `provider_name` on the desired side accepts whatever AWS reports.
    pub fn requires_replacement(&self, desired: &Lag) -> bool {
        self.connections_bandwidth != desired.connections_bandwidth
            || self.location != desired.location
            || (desired.provider_name.is_some() && self.provider_name != desired.provider_name)
            || self.request_macsec != desired.request_macsec
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            bail!("LAG name must not be empty");
        }
        if self.location.is_empty() {
            bail!("LAG location must not be empty");
        }
        if !CONNECTION_BANDWIDTHS.contains(&self.connections_bandwidth.as_str()) {
            bail!(
                "Invalid connections_bandwidth `{}`, expected one of: {}",
                self.connections_bandwidth,
                CONNECTION_BANDWIDTHS.join(", ")
            );
        }
        Ok(())
    }
}

// `provider_name` is computed when left unset, so it only differs when both sides name one.
fn provider_eq(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Compares two LAG bodies the way a read-back would see them.
pub fn lag_eq(a: &[u8], b: &[u8]) -> anyhow::Result<bool> {
    let a: Lag = RON.from_str(str::from_utf8(a)?)?;
    let b: Lag = RON.from_str(str::from_utf8(b)?)?;

    if !provider_eq(&a.provider_name, &b.provider_name) {
        return Ok(false);
    }

    Ok(Lag {
        provider_name: None,
        ..a.without_write_only()
    } == Lag {
        provider_name: None,
        ..b.without_write_only()
    })
}

pub enum DirectConnectResource {
    Lag(Lag),
}

impl Resource for DirectConnectResource {
    fn to_bytes(&self) -> Result<Vec<u8>, anyhow::Error> {
        let pretty_config = PrettyConfig::default().struct_names(true);

        match self {
            DirectConnectResource::Lag(lag) => Ok(RON.to_string_pretty(&lag, pretty_config)?.into()),
        }
    }

    fn from_bytes(addr: &impl ResourceAddress, s: &[u8]) -> Result<Self, anyhow::Error>
    where
        Self: Sized,
    {
        let addr = DirectConnectResourceAddress::from_path(&addr.to_path_buf())?;
        let s = str::from_utf8(s)?;

        match addr {
            DirectConnectResourceAddress::Lag { .. } => Ok(DirectConnectResource::Lag(RON.from_str(s)?)),
        }
    }
}
