//! Persistence boundary

use async_trait::async_trait;

use cloudnet_core::{Network, Result, Subnet};

/// Document store for network and subnet records.
///
/// Saves are validate-then-upsert: field validation failures surface as
/// `BadRequest`, uniqueness conflicts as `NetworkExists`/`SubnetExists`.
/// Uniqueness is `(cloud, network_id)` for networks and
/// `(network, subnet_id)` for subnets.
#[async_trait]
pub trait NetworkStore: Send + Sync {
    async fn save_network(&self, network: &Network) -> Result<()>;
    async fn get_network(&self, id: &str) -> Result<Option<Network>>;
    async fn find_network(&self, cloud: &str, network_id: &str) -> Result<Option<Network>>;
    async fn delete_network(&self, id: &str) -> Result<()>;

    async fn save_subnet(&self, subnet: &Subnet) -> Result<()>;
    async fn get_subnet(&self, id: &str) -> Result<Option<Subnet>>;
    async fn find_subnet(&self, network: &str, subnet_id: &str) -> Result<Option<Subnet>>;
    async fn list_subnets(&self, network: &str) -> Result<Vec<Subnet>>;
    async fn delete_subnet(&self, id: &str) -> Result<()>;
}
