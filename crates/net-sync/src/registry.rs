//! Driver registry

use std::collections::HashMap;
use std::sync::Arc;

use cloudnet_core::{NetworkError, Provider, Result};

use crate::driver::NetworkDriver;

/// Explicit provider-to-driver table.
///
/// Drivers are registered up front; resolving a provider nobody registered
/// is a caller error, not a fallback to some default behavior.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: HashMap<Provider, Arc<dyn NetworkDriver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, driver: Arc<dyn NetworkDriver>) {
        let provider = driver.provider();
        log::info!("Registered network driver for provider: {}", provider);
        self.drivers.insert(provider, driver);
    }

    pub fn get(&self, provider: Provider) -> Result<Arc<dyn NetworkDriver>> {
        self.drivers.get(&provider).cloned().ok_or_else(|| {
            NetworkError::bad_request(format!("no network driver registered for {}", provider))
        })
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.drivers.keys().copied().collect()
    }
}
