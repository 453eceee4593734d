//! In-memory document store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cloudnet_core::{Network, NetworkError, Result, Subnet};

use crate::store::NetworkStore;

/// In-memory `NetworkStore`.
///
/// Keeps records behind a `tokio::sync::RwLock`. The uniqueness constraints
/// a document database would enforce with indexes are checked at save time,
/// and deleting a network drops any subnets still referencing it, as a
/// database cascade rule would.
#[derive(Default)]
pub struct MemoryStore {
    networks: RwLock<HashMap<String, Network>>,
    subnets: RwLock<HashMap<String, Subnet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NetworkStore for MemoryStore {
    async fn save_network(&self, network: &Network) -> Result<()> {
        network.validate()?;

        let mut networks = self.networks.write().await;
        if !network.network_id.is_empty() {
            let duplicate = networks.values().any(|existing| {
                existing.id != network.id
                    && existing.cloud == network.cloud
                    && existing.network_id == network.network_id
            });
            if duplicate {
                return Err(NetworkError::NetworkExists {
                    title: network.title.clone(),
                });
            }
        }
        networks.insert(network.id.clone(), network.clone());
        Ok(())
    }

    async fn get_network(&self, id: &str) -> Result<Option<Network>> {
        Ok(self.networks.read().await.get(id).cloned())
    }

    async fn find_network(&self, cloud: &str, network_id: &str) -> Result<Option<Network>> {
        Ok(self
            .networks
            .read()
            .await
            .values()
            .find(|network| network.cloud == cloud && network.network_id == network_id)
            .cloned())
    }

    async fn delete_network(&self, id: &str) -> Result<()> {
        self.networks.write().await.remove(id);
        self.subnets
            .write()
            .await
            .retain(|_, subnet| subnet.network != id);
        Ok(())
    }

    async fn save_subnet(&self, subnet: &Subnet) -> Result<()> {
        subnet.validate()?;

        let mut subnets = self.subnets.write().await;
        if !subnet.subnet_id.is_empty() {
            let duplicate = subnets.values().any(|existing| {
                existing.id != subnet.id
                    && existing.network == subnet.network
                    && existing.subnet_id == subnet.subnet_id
            });
            if duplicate {
                return Err(NetworkError::SubnetExists {
                    title: subnet.title.clone(),
                });
            }
        }
        subnets.insert(subnet.id.clone(), subnet.clone());
        Ok(())
    }

    async fn get_subnet(&self, id: &str) -> Result<Option<Subnet>> {
        Ok(self.subnets.read().await.get(id).cloned())
    }

    async fn find_subnet(&self, network: &str, subnet_id: &str) -> Result<Option<Subnet>> {
        Ok(self
            .subnets
            .read()
            .await
            .values()
            .find(|subnet| subnet.network == network && subnet.subnet_id == subnet_id)
            .cloned())
    }

    async fn list_subnets(&self, network: &str) -> Result<Vec<Subnet>> {
        let mut subnets: Vec<Subnet> = self
            .subnets
            .read()
            .await
            .values()
            .filter(|subnet| subnet.network == network)
            .cloned()
            .collect();
        subnets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(subnets)
    }

    async fn delete_subnet(&self, id: &str) -> Result<()> {
        self.subnets.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudnet_core::{Cloud, Provider};

    fn openstack_cloud() -> Cloud {
        Cloud::new("ost", Provider::OpenStack)
    }

    #[tokio::test]
    async fn test_network_upsert_and_lookup() {
        let store = MemoryStore::new();
        let cloud = openstack_cloud();

        let mut network = Network::from_listing(&cloud, "net-1");
        network.title = "private".to_string();
        store.save_network(&network).await.unwrap();

        let found = store.find_network(&cloud.id, "net-1").await.unwrap().unwrap();
        assert_eq!(found.id, network.id);

        // Saving again under the same local id is an update, not a conflict.
        network.description = "updated".to_string();
        store.save_network(&network).await.unwrap();
        let found = store.get_network(&network.id).await.unwrap().unwrap();
        assert_eq!(found.description, "updated");
    }

    #[tokio::test]
    async fn test_duplicate_network_rejected() {
        let store = MemoryStore::new();
        let cloud = openstack_cloud();

        store
            .save_network(&Network::from_listing(&cloud, "net-1"))
            .await
            .unwrap();

        let err = store
            .save_network(&Network::from_listing(&cloud, "net-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::NetworkExists { .. }));

        // A different cloud may carry the same provider id.
        let other = openstack_cloud();
        store
            .save_network(&Network::from_listing(&other, "net-1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_subnet_rejected_per_network() {
        let store = MemoryStore::new();
        let cloud = openstack_cloud();
        let network = Network::from_listing(&cloud, "net-1");
        let sibling = Network::from_listing(&cloud, "net-2");

        let mut subnet = Subnet::from_listing(&network, "sub-1");
        subnet.cidr = "192.168.0.0/24".to_string();
        store.save_subnet(&subnet).await.unwrap();

        let mut duplicate = Subnet::from_listing(&network, "sub-1");
        duplicate.cidr = "192.168.1.0/24".to_string();
        let err = store.save_subnet(&duplicate).await.unwrap_err();
        assert!(matches!(err, NetworkError::SubnetExists { .. }));

        // The same provider id under another network is fine.
        let mut cousin = Subnet::from_listing(&sibling, "sub-1");
        cousin.cidr = "192.168.2.0/24".to_string();
        store.save_subnet(&cousin).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_validates_records() {
        let store = MemoryStore::new();
        let cloud = openstack_cloud();
        let network = Network::from_listing(&cloud, "net-1");

        let subnet = Subnet::new(&network, "not-a-cidr");
        let err = store.save_subnet(&subnet).await.unwrap_err();
        assert!(matches!(err, NetworkError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_delete_network_drops_owned_subnets() {
        let store = MemoryStore::new();
        let cloud = openstack_cloud();
        let network = Network::from_listing(&cloud, "net-1");
        store.save_network(&network).await.unwrap();

        let mut subnet = Subnet::from_listing(&network, "sub-1");
        subnet.cidr = "192.168.0.0/24".to_string();
        store.save_subnet(&subnet).await.unwrap();

        store.delete_network(&network.id).await.unwrap();
        assert!(store.get_network(&network.id).await.unwrap().is_none());
        assert!(store.list_subnets(&network.id).await.unwrap().is_empty());
    }
}
