//! Cloudnet Sync
//!
//! Orchestration of network and subnet CRUD against provider APIs: the SDK
//! client boundary, the persistence boundary, the per-provider driver hook
//! trait and the controller that ties them together.

pub mod api;
pub mod controller;
pub mod driver;
pub mod memory;
pub mod registry;
pub mod store;

pub use api::{
    ApiNetwork, ApiNetworkAttrs, ApiParams, ApiResult, ApiSubnet, ApiSubnetAttrs, CloudNetworkApi,
};
pub use controller::NetworkController;
pub use driver::NetworkDriver;
pub use memory::MemoryStore;
pub use registry::DriverRegistry;
pub use store::NetworkStore;
