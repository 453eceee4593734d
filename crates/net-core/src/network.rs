//! Network records

use std::collections::HashMap;
use std::sync::OnceLock;

use ipnet::Ipv4Net;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{NetworkError, Result};
use crate::provider::Provider;

/// GCE resource names: lowercase RFC1035 labels.
pub const GOOGLE_NAME_REGEX: &str = r"^(?:[a-z](?:[-a-z0-9]{0,61}[a-z0-9])?)$";

fn google_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(GOOGLE_NAME_REGEX).expect("valid name regex"))
}

/// Check that a CIDR string maps to a valid IPv4 network.
pub fn validate_cidr(cidr: &str) -> Result<()> {
    cidr.parse::<Ipv4Net>()
        .map(|_| ())
        .map_err(|err| NetworkError::bad_request(format!("invalid CIDR '{}': {}", cidr, err)))
}

pub(crate) fn validate_google_name(title: &str) -> Result<()> {
    if title.is_empty() || !google_name_regex().is_match(title) {
        return Err(NetworkError::bad_request(
            "a lowercase RFC1035-style name must be specified",
        ));
    }
    Ok(())
}

pub(crate) fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub(crate) fn expect_string(field: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| NetworkError::bad_request(format!("field '{}' expects a string", field)))
}

pub(crate) fn expect_bool(field: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| NetworkError::bad_request(format!("field '{}' expects a boolean", field)))
}

/// Owning cloud reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub id: String,
    pub title: String,
    pub provider: Provider,
}

impl Cloud {
    pub fn new(title: impl Into<String>, provider: Provider) -> Self {
        Self {
            id: new_record_id(),
            title: title.into(),
            provider,
        }
    }
}

/// EC2 VPC tenancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceTenancy {
    #[default]
    Default,
    Private,
}

impl std::str::FromStr for InstanceTenancy {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(InstanceTenancy::Default),
            "private" => Ok(InstanceTenancy::Private),
            other => Err(NetworkError::bad_request(format!(
                "unknown instance tenancy: {}",
                other
            ))),
        }
    }
}

/// GCE network mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    Legacy,
    Auto,
    Custom,
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkMode::Legacy => write!(f, "legacy"),
            NetworkMode::Auto => write!(f, "auto"),
            NetworkMode::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for NetworkMode {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "legacy" => Ok(NetworkMode::Legacy),
            "auto" => Ok(NetworkMode::Auto),
            "custom" => Ok(NetworkMode::Custom),
            other => Err(NetworkError::bad_request(format!(
                "unknown network mode: {}",
                other
            ))),
        }
    }
}

/// EC2 VPC attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmazonNetworkAttrs {
    pub cidr: Option<String>,
    #[serde(rename = "default")]
    pub is_default: bool,
    pub instance_tenancy: InstanceTenancy,
}

/// GCE network attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleNetworkAttrs {
    pub cidr: Option<String>,
    pub mode: NetworkMode,
    pub gateway_ip: Option<String>,
}

/// Neutron network attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenStackNetworkAttrs {
    pub shared: bool,
    pub admin_state_up: bool,
    pub router_external: bool,
}

impl Default for OpenStackNetworkAttrs {
    fn default() -> Self {
        Self {
            shared: false,
            admin_state_up: true,
            router_external: false,
        }
    }
}

/// Provider-specific network attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum NetworkAttrs {
    Amazon(AmazonNetworkAttrs),
    Google(GoogleNetworkAttrs),
    OpenStack(OpenStackNetworkAttrs),
}

impl NetworkAttrs {
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Amazon => NetworkAttrs::Amazon(AmazonNetworkAttrs::default()),
            Provider::Google => NetworkAttrs::Google(GoogleNetworkAttrs::default()),
            Provider::OpenStack => NetworkAttrs::OpenStack(OpenStackNetworkAttrs::default()),
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            NetworkAttrs::Amazon(_) => Provider::Amazon,
            NetworkAttrs::Google(_) => Provider::Google,
            NetworkAttrs::OpenStack(_) => Provider::OpenStack,
        }
    }

    /// Apply a caller-supplied creation parameter onto the record.
    ///
    /// Keys outside the provider's field set are rejected with a bad-request
    /// error.
    pub fn set_field(&mut self, key: &str, value: &Value) -> Result<()> {
        let provider = self.provider();
        match self {
            NetworkAttrs::Amazon(attrs) => match key {
                "cidr" => attrs.cidr = Some(expect_string(key, value)?),
                "default" => attrs.is_default = expect_bool(key, value)?,
                "instance_tenancy" => {
                    attrs.instance_tenancy = expect_string(key, value)?.parse()?
                }
                _ => return Err(unknown_field(provider, key)),
            },
            NetworkAttrs::Google(attrs) => match key {
                "cidr" => attrs.cidr = Some(expect_string(key, value)?),
                "mode" => attrs.mode = expect_string(key, value)?.parse()?,
                "gateway_ip" => attrs.gateway_ip = Some(expect_string(key, value)?),
                _ => return Err(unknown_field(provider, key)),
            },
            NetworkAttrs::OpenStack(attrs) => match key {
                "shared" => attrs.shared = expect_bool(key, value)?,
                "admin_state_up" => attrs.admin_state_up = expect_bool(key, value)?,
                "router_external" => attrs.router_external = expect_bool(key, value)?,
                _ => return Err(unknown_field(provider, key)),
            },
        }
        Ok(())
    }
}

fn unknown_field(provider: Provider, key: &str) -> NetworkError {
    NetworkError::bad_request(format!("unknown field for {} network: {}", provider, key))
}

/// A cloud network record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub network_id: String,
    pub cloud: String,
    #[serde(rename = "name")]
    pub title: String,
    pub description: String,
    pub extra: HashMap<String, Value>,
    #[serde(flatten)]
    pub attrs: NetworkAttrs,
}

impl Network {
    /// New, not-yet-created network owned by `cloud`.
    pub fn new(cloud: &Cloud) -> Self {
        Self::from_listing(cloud, "")
    }

    /// Record for a provider-listed network.
    pub fn from_listing(cloud: &Cloud, network_id: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            network_id: network_id.into(),
            cloud: cloud.id.clone(),
            title: String::new(),
            description: String::new(),
            extra: HashMap::new(),
            attrs: NetworkAttrs::for_provider(cloud.provider),
        }
    }

    pub fn provider(&self) -> Provider {
        self.attrs.provider()
    }

    pub fn amazon_attrs_mut(&mut self) -> Option<&mut AmazonNetworkAttrs> {
        match &mut self.attrs {
            NetworkAttrs::Amazon(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn google_attrs_mut(&mut self) -> Option<&mut GoogleNetworkAttrs> {
        match &mut self.attrs {
            NetworkAttrs::Google(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn openstack_attrs_mut(&mut self) -> Option<&mut OpenStackNetworkAttrs> {
        match &mut self.attrs {
            NetworkAttrs::OpenStack(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Field-level validation, run before the provider call and again at
    /// save time.
    pub fn validate(&self) -> Result<()> {
        match &self.attrs {
            NetworkAttrs::Amazon(attrs) => {
                let cidr = attrs.cidr.as_deref().ok_or(NetworkError::MissingParameter {
                    parameter: "cidr".to_string(),
                })?;
                validate_cidr(cidr)
            }
            NetworkAttrs::Google(attrs) => {
                // GCE assigns CIDRs itself outside legacy mode.
                match attrs.mode {
                    NetworkMode::Legacy => {
                        let cidr =
                            attrs.cidr.as_deref().ok_or(NetworkError::MissingParameter {
                                parameter: "cidr".to_string(),
                            })?;
                        validate_cidr(cidr)?;
                    }
                    _ => {
                        if attrs.cidr.is_some() {
                            return Err(NetworkError::bad_request(format!(
                                "CIDR cannot be set for mode '{}'",
                                attrs.mode
                            )));
                        }
                    }
                }
                validate_google_name(&self.title)
            }
            NetworkAttrs::OpenStack(_) => Ok(()),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Network \"{}\" ({})", self.title, self.id)
    }
}
