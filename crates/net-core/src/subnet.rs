//! Subnet records

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NetworkError, Result};
use crate::network::{
    expect_bool, expect_string, new_record_id, validate_cidr, validate_google_name, Network,
};
use crate::provider::Provider;

/// An allocation range inside a Neutron subnet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPool {
    pub start: String,
    pub end: String,
}

/// EC2 subnet attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmazonSubnetAttrs {
    pub availability_zone: String,
}

/// GCE subnetwork attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleSubnetAttrs {
    pub region: String,
    pub gateway_ip: Option<String>,
}

/// Neutron subnet attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenStackSubnetAttrs {
    pub gateway_ip: Option<String>,
    pub ip_version: u8,
    pub enable_dhcp: bool,
    pub dns_nameservers: Vec<String>,
    pub allocation_pools: Vec<AllocationPool>,
}

impl Default for OpenStackSubnetAttrs {
    fn default() -> Self {
        Self {
            gateway_ip: None,
            ip_version: 4,
            enable_dhcp: true,
            dns_nameservers: Vec::new(),
            allocation_pools: Vec::new(),
        }
    }
}

/// Provider-specific subnet attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum SubnetAttrs {
    Amazon(AmazonSubnetAttrs),
    Google(GoogleSubnetAttrs),
    OpenStack(OpenStackSubnetAttrs),
}

impl SubnetAttrs {
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Amazon => SubnetAttrs::Amazon(AmazonSubnetAttrs::default()),
            Provider::Google => SubnetAttrs::Google(GoogleSubnetAttrs::default()),
            Provider::OpenStack => SubnetAttrs::OpenStack(OpenStackSubnetAttrs::default()),
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            SubnetAttrs::Amazon(_) => Provider::Amazon,
            SubnetAttrs::Google(_) => Provider::Google,
            SubnetAttrs::OpenStack(_) => Provider::OpenStack,
        }
    }

    /// Apply a caller-supplied creation parameter onto the record.
    pub fn set_field(&mut self, key: &str, value: &Value) -> Result<()> {
        let provider = self.provider();
        match self {
            SubnetAttrs::Amazon(attrs) => match key {
                "availability_zone" => attrs.availability_zone = expect_string(key, value)?,
                _ => return Err(unknown_field(provider, key)),
            },
            SubnetAttrs::Google(attrs) => match key {
                "region" => attrs.region = expect_string(key, value)?,
                "gateway_ip" => attrs.gateway_ip = Some(expect_string(key, value)?),
                _ => return Err(unknown_field(provider, key)),
            },
            SubnetAttrs::OpenStack(attrs) => match key {
                "gateway_ip" => attrs.gateway_ip = Some(expect_string(key, value)?),
                "ip_version" => {
                    attrs.ip_version = value
                        .as_u64()
                        .and_then(|v| u8::try_from(v).ok())
                        .ok_or_else(|| {
                            NetworkError::bad_request("field 'ip_version' expects 4 or 6")
                        })?
                }
                "enable_dhcp" => attrs.enable_dhcp = expect_bool(key, value)?,
                "dns_nameservers" => {
                    attrs.dns_nameservers = serde_json::from_value(value.clone()).map_err(|_| {
                        NetworkError::bad_request("field 'dns_nameservers' expects a string list")
                    })?
                }
                "allocation_pools" => {
                    attrs.allocation_pools =
                        serde_json::from_value(value.clone()).map_err(|_| {
                            NetworkError::bad_request(
                                "field 'allocation_pools' expects a list of {start, end} ranges",
                            )
                        })?
                }
                _ => return Err(unknown_field(provider, key)),
            },
        }
        Ok(())
    }
}

fn unknown_field(provider: Provider, key: &str) -> NetworkError {
    NetworkError::bad_request(format!("unknown field for {} subnet: {}", provider, key))
}

/// A cloud subnet record, owned by a `Network`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub subnet_id: String,
    /// Local id of the owning network record.
    pub network: String,
    pub cidr: String,
    #[serde(rename = "name")]
    pub title: String,
    pub description: String,
    pub extra: HashMap<String, Value>,
    #[serde(flatten)]
    pub attrs: SubnetAttrs,
}

impl Subnet {
    /// New, not-yet-created subnet owned by `network`.
    pub fn new(network: &Network, cidr: impl Into<String>) -> Self {
        let mut subnet = Self::from_listing(network, "");
        subnet.cidr = cidr.into();
        subnet
    }

    /// Record for a provider-listed subnet.
    pub fn from_listing(network: &Network, subnet_id: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            subnet_id: subnet_id.into(),
            network: network.id.clone(),
            cidr: String::new(),
            title: String::new(),
            description: String::new(),
            extra: HashMap::new(),
            attrs: SubnetAttrs::for_provider(network.provider()),
        }
    }

    pub fn provider(&self) -> Provider {
        self.attrs.provider()
    }

    pub fn amazon_attrs_mut(&mut self) -> Option<&mut AmazonSubnetAttrs> {
        match &mut self.attrs {
            SubnetAttrs::Amazon(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn google_attrs_mut(&mut self) -> Option<&mut GoogleSubnetAttrs> {
        match &mut self.attrs {
            SubnetAttrs::Google(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn google_attrs(&self) -> Option<&GoogleSubnetAttrs> {
        match &self.attrs {
            SubnetAttrs::Google(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn openstack_attrs_mut(&mut self) -> Option<&mut OpenStackSubnetAttrs> {
        match &mut self.attrs {
            SubnetAttrs::OpenStack(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Field-level validation, run before the provider call and again at
    /// save time.
    pub fn validate(&self) -> Result<()> {
        if self.cidr.is_empty() {
            return Err(NetworkError::MissingParameter {
                parameter: "cidr".to_string(),
            });
        }
        validate_cidr(&self.cidr)?;

        match &self.attrs {
            SubnetAttrs::Amazon(attrs) => {
                if attrs.availability_zone.is_empty() {
                    return Err(NetworkError::MissingParameter {
                        parameter: "availability_zone".to_string(),
                    });
                }
                Ok(())
            }
            SubnetAttrs::Google(attrs) => {
                if attrs.region.is_empty() {
                    return Err(NetworkError::MissingParameter {
                        parameter: "region".to_string(),
                    });
                }
                validate_google_name(&self.title)
            }
            SubnetAttrs::OpenStack(_) => Ok(()),
        }
    }
}

impl std::fmt::Display for Subnet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subnet \"{}\" ({})", self.title, self.id)
    }
}
