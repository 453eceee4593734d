//! Driver factory

use std::sync::Arc;

use cloudnet_core::Provider;
use cloudnet_sync::{DriverRegistry, NetworkDriver};

use crate::amazon::AmazonNetworkDriver;
use crate::google::GoogleNetworkDriver;
use crate::openstack::OpenStackNetworkDriver;

/// Maps a provider tag to its driver.
pub struct NetworkDriverFactory;

impl NetworkDriverFactory {
    pub fn create_driver(provider: Provider) -> Arc<dyn NetworkDriver> {
        match provider {
            Provider::Amazon => Arc::new(AmazonNetworkDriver),
            Provider::Google => Arc::new(GoogleNetworkDriver),
            Provider::OpenStack => Arc::new(OpenStackNetworkDriver),
        }
    }
}

/// Registry with every built-in driver registered.
pub fn default_registry() -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    for provider in [Provider::Amazon, Provider::Google, Provider::OpenStack] {
        registry.register(NetworkDriverFactory::create_driver(provider));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_matches_provider() {
        for provider in [Provider::Amazon, Provider::Google, Provider::OpenStack] {
            let driver = NetworkDriverFactory::create_driver(provider);
            assert_eq!(driver.provider(), provider);
        }
    }

    #[test]
    fn test_default_registry_covers_all_providers() {
        let registry = default_registry();
        for provider in [Provider::Amazon, Provider::Google, Provider::OpenStack] {
            assert!(registry.get(provider).is_ok());
        }
    }
}
