//! Provider SDK client boundary
//!
//! The actual SDK clients live outside this workspace; this module defines
//! the trait they satisfy and the wire-shaped values crossing the boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use cloudnet_core::{AllocationPool, CloudApiError, ExtraValue};

pub type ApiResult<T> = std::result::Result<T, CloudApiError>;

/// A provider-shaped parameter bag.
///
/// Creation, listing and deletion calls all take free-form keyword-style
/// parameters; driver hooks reshape them (rename, inject, drop) before the
/// call goes out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiParams {
    values: HashMap<String, Value>,
}

impl ApiParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Move the value under `from` to `to`; no-op if `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(value) = self.values.remove(from) {
            self.values.insert(to.to_string(), value);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

/// Provider-specific attributes exposed on a provider network object.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ApiNetworkAttrs {
    #[default]
    None,
    Amazon {
        cidr_block: String,
    },
    Google {
        cidr: Option<String>,
        mode: String,
    },
    OpenStack {
        router_external: bool,
    },
}

/// A network object as returned by a provider SDK.
#[derive(Debug, Clone)]
pub struct ApiNetwork {
    pub id: String,
    pub name: String,
    pub extra: HashMap<String, ExtraValue>,
    pub attrs: ApiNetworkAttrs,
}

impl ApiNetwork {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: HashMap::new(),
            attrs: ApiNetworkAttrs::None,
        }
    }
}

/// Provider-specific attributes exposed on a provider subnet object.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ApiSubnetAttrs {
    #[default]
    None,
    Google {
        cidr: String,
        region: String,
        network_id: String,
    },
    OpenStack {
        cidr: String,
        gateway_ip: Option<String>,
        enable_dhcp: bool,
        dns_nameservers: Vec<String>,
        allocation_pools: Vec<AllocationPool>,
        network_id: String,
    },
}

impl ApiSubnetAttrs {
    /// Provider id of the owning network, when the object carries one.
    pub fn network_id(&self) -> Option<&str> {
        match self {
            ApiSubnetAttrs::Google { network_id, .. } => Some(network_id),
            ApiSubnetAttrs::OpenStack { network_id, .. } => Some(network_id),
            ApiSubnetAttrs::None => None,
        }
    }
}

/// A subnet object as returned by a provider SDK.
#[derive(Debug, Clone)]
pub struct ApiSubnet {
    pub id: String,
    pub name: String,
    pub extra: HashMap<String, ExtraValue>,
    pub attrs: ApiSubnetAttrs,
}

impl ApiSubnet {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: HashMap::new(),
            attrs: ApiSubnetAttrs::None,
        }
    }
}

/// The networking surface of a provider SDK client.
///
/// The canonical calls exist on every provider. The extension calls mirror
/// the uneven per-provider surfaces (GCE subnetworks, GCE destroy variants,
/// named lookups); providers that lack one keep the default `Unsupported`
/// implementation.
#[async_trait]
pub trait CloudNetworkApi: Send + Sync {
    async fn create_network(&self, params: &ApiParams) -> ApiResult<ApiNetwork>;
    async fn create_subnet(&self, params: &ApiParams) -> ApiResult<ApiSubnet>;
    async fn list_networks(&self, params: &ApiParams) -> ApiResult<Vec<ApiNetwork>>;
    async fn list_subnets(&self, params: &ApiParams) -> ApiResult<Vec<ApiSubnet>>;
    async fn delete_network(&self, params: &ApiParams) -> ApiResult<()>;
    async fn delete_subnet(&self, params: &ApiParams) -> ApiResult<()>;

    async fn create_subnetwork(&self, _params: &ApiParams) -> ApiResult<ApiSubnet> {
        Err(CloudApiError::Unsupported {
            call: "create_subnetwork",
        })
    }

    async fn list_subnetworks(&self, _params: &ApiParams) -> ApiResult<Vec<ApiSubnet>> {
        Err(CloudApiError::Unsupported {
            call: "list_subnetworks",
        })
    }

    async fn destroy_network(&self, _params: &ApiParams) -> ApiResult<()> {
        Err(CloudApiError::Unsupported {
            call: "destroy_network",
        })
    }

    async fn destroy_subnetwork(&self, _params: &ApiParams) -> ApiResult<()> {
        Err(CloudApiError::Unsupported {
            call: "destroy_subnetwork",
        })
    }

    /// Targeted lookup; `Ok(None)` means the provider answered and the
    /// object does not exist.
    async fn get_network(&self, _params: &ApiParams) -> ApiResult<Option<ApiNetwork>> {
        Err(CloudApiError::Unsupported {
            call: "get_network",
        })
    }

    async fn get_subnetwork(&self, _params: &ApiParams) -> ApiResult<Option<ApiSubnet>> {
        Err(CloudApiError::Unsupported {
            call: "get_subnetwork",
        })
    }
}
