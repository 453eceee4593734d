//! Cloudnet Core
//!
//! Core types for multi-cloud network synchronization: provider tags,
//! persisted `Network`/`Subnet` records with provider-specific attribute
//! payloads, validation and the error taxonomy.

pub mod error;
pub mod extra;
pub mod network;
pub mod provider;
pub mod subnet;

pub use error::{CloudApiError, NetworkError, Result};
pub use extra::{normalize_extra, parse_bool_flag, pop_bool, pop_string, ExtraValue};
pub use network::{
    validate_cidr, AmazonNetworkAttrs, Cloud, GoogleNetworkAttrs, InstanceTenancy, Network,
    NetworkAttrs, NetworkMode, OpenStackNetworkAttrs,
};
pub use provider::Provider;
pub use subnet::{
    AllocationPool, AmazonSubnetAttrs, GoogleSubnetAttrs, OpenStackSubnetAttrs, Subnet, SubnetAttrs,
};
