//! Cloudnet Drivers
//!
//! Per-provider `NetworkDriver` implementations plus the factory that maps a
//! provider tag to its driver.

pub mod amazon;
pub mod factory;
pub mod google;
pub mod openstack;


pub use amazon::AmazonNetworkDriver;
pub use factory::{default_registry, NetworkDriverFactory};
pub use google::GoogleNetworkDriver;
pub use openstack::OpenStackNetworkDriver;
