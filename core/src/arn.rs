//! Amazon Resource Names.
//!
//! Connectors address AWS-assigned resources by their short id and rebuild the
//! full ARN from the region, the verified account id and the partition.

use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArnError {
    #[error("ARN must start with `arn:`: {0}")]
    MissingPrefix(String),
    #[error("ARN has {found} components, expected 6: {arn}")]
    TooFewComponents { arn: String, found: usize },
    #[error("ARN has an empty resource: {0}")]
    EmptyResource(String),
}

/// The partition a region belongs to.
pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else if region.starts_with("us-isob-") {
        "aws-iso-b"
    } else if region.starts_with("us-iso-") {
        "aws-iso"
    } else {
        "aws"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition:  String,
    pub service:    String,
    pub region:     String,
    pub account_id: String,
    pub resource:   String,
}

impl Arn {
    /// A regional ARN in the partition that `region` belongs to.
    pub fn regional(service: &str, region: &str, account_id: &str, resource: impl Into<String>) -> Self {
        Self {
            partition:  partition_for_region(region).to_string(),
            service:    service.to_string(),
            region:     region.to_string(),
            account_id: account_id.to_string(),
            resource:   resource.into(),
        }
    }

    /// The trailing id of the resource part, e.g. `dxlag-abcd1234` for `dxlag/dxlag-abcd1234`.
    pub fn resource_id(&self) -> &str {
        match self.resource.rsplit_once('/') {
            Some((_, id)) => id,
            None => &self.resource,
        }
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with("arn:") {
            return Err(ArnError::MissingPrefix(s.to_string()));
        }

        let parts: Vec<&str> = s.splitn(6, ':').collect();
        let [_, partition, service, region, account_id, resource] = parts[..] else {
            return Err(ArnError::TooFewComponents {
                arn:   s.to_string(),
                found: parts.len(),
            });
        };

        if resource.is_empty() {
            return Err(ArnError::EmptyResource(s.to_string()));
        }

        Ok(Arn {
            partition:  partition.to_string(),
            service:    service.to_string(),
            region:     region.to_string(),
            account_id: account_id.to_string(),
            resource:   resource.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions() {
        assert_eq!(partition_for_region("us-east-1"), "aws");
        assert_eq!(partition_for_region("cn-northwest-1"), "aws-cn");
        assert_eq!(partition_for_region("us-gov-west-1"), "aws-us-gov");
        assert_eq!(partition_for_region("us-iso-east-1"), "aws-iso");
        assert_eq!(partition_for_region("us-isob-east-1"), "aws-iso-b");
    }

    #[test]
    fn regional_arn_display() {
        let arn = Arn::regional("directconnect", "cn-north-1", "123456789012", "dxlag/dxlag-ffy7zraq");
        assert_eq!(
            arn.to_string(),
            "arn:aws-cn:directconnect:cn-north-1:123456789012:dxlag/dxlag-ffy7zraq"
        );
        assert_eq!(arn.resource_id(), "dxlag-ffy7zraq");
    }

    #[test]
    fn parse_keeps_colons_in_resource() {
        let arn: Arn = "arn:aws:logs:us-east-1:123456789012:log-group:/my/group:*".parse().unwrap();
        assert_eq!(arn.service, "logs");
        assert_eq!(arn.resource, "log-group:/my/group:*");
    }

    #[test]
    fn parse_quick_setup_manager_arn() {
        let arn: Arn = "arn:aws:ssm-quicksetup:us-west-2:123456789012:configuration-manager/7cac1a1b-64a9-4c9a-97e8-8c68928b8f13"
            .parse()
            .unwrap();
        assert_eq!(arn.region, "us-west-2");
        assert_eq!(arn.resource_id(), "7cac1a1b-64a9-4c9a-97e8-8c68928b8f13");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!("dxlag-1234".parse::<Arn>(), Err(ArnError::MissingPrefix(_))));
        assert!(matches!(
            "arn:aws:iot:us-east-1".parse::<Arn>(),
            Err(ArnError::TooFewComponents { found: 4, .. })
        ));
        assert!(matches!(
            "arn:aws:iot:us-east-1:123456789012:".parse::<Arn>(),
            Err(ArnError::EmptyResource(_))
        ));
    }
}
