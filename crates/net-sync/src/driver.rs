//! Per-provider driver hooks

use std::collections::HashMap;

use async_trait::async_trait;

use cloudnet_core::{ExtraValue, Network, Provider, Result, Subnet};

use crate::api::{ApiNetwork, ApiParams, ApiResult, ApiSubnet, CloudNetworkApi};

/// Provider-specific behavior slotted into the controller's CRUD flows.
///
/// Every method has a default that does the canonical thing: parameter hooks
/// leave the bag untouched, call hooks dispatch the canonical SDK call, and
/// lookups report nothing found. A driver overrides only the points where its
/// provider deviates.
#[async_trait]
pub trait NetworkDriver: Send + Sync + std::fmt::Debug {
    fn provider(&self) -> Provider;

    /// Reshape the outgoing parameter bag before `create_network`.
    fn create_network_params(&self, _network: &Network, _params: &mut ApiParams) {}

    /// Reshape the outgoing parameter bag before the subnet creation call.
    fn create_subnet_params(
        &self,
        _subnet: &Subnet,
        _network: &Network,
        _params: &mut ApiParams,
    ) {
    }

    /// Issue the subnet creation call itself.
    async fn create_subnet_call(
        &self,
        api: &dyn CloudNetworkApi,
        params: &ApiParams,
    ) -> ApiResult<ApiSubnet> {
        api.create_subnet(params).await
    }

    /// Absorb provider-specific fields of a listed network into the record.
    ///
    /// `extra` is the listed object's extra map; values consumed here are
    /// removed from it so they are not persisted twice.
    fn parse_listed_network(
        &self,
        _network: &mut Network,
        _listed: &ApiNetwork,
        _extra: &mut HashMap<String, ExtraValue>,
    ) -> Result<()> {
        Ok(())
    }

    /// Absorb provider-specific fields of a listed subnet into the record.
    fn parse_listed_subnet(
        &self,
        _subnet: &mut Subnet,
        _listed: &ApiSubnet,
        _extra: &mut HashMap<String, ExtraValue>,
    ) -> Result<()> {
        Ok(())
    }

    /// Reshape the parameter bag sent with the subnet listing call.
    fn list_subnets_params(&self, _network: &Network, _params: &mut ApiParams) {}

    /// Fetch the provider's subnets for `network`.
    async fn fetch_subnets(
        &self,
        api: &dyn CloudNetworkApi,
        _network: &Network,
        params: &ApiParams,
    ) -> ApiResult<Vec<ApiSubnet>> {
        api.list_subnets(params).await
    }

    /// Populate the parameters identifying `network` for deletion.
    ///
    /// Async and fallible: some providers must look the live object up first
    /// to learn what their deletion call wants.
    async fn delete_network_params(
        &self,
        _api: &dyn CloudNetworkApi,
        _network: &Network,
        _params: &mut ApiParams,
    ) -> Result<()> {
        Ok(())
    }

    /// Issue the network deletion call itself.
    async fn delete_network_call(
        &self,
        api: &dyn CloudNetworkApi,
        params: &ApiParams,
    ) -> ApiResult<()> {
        api.delete_network(params).await
    }

    /// Populate the parameters identifying `subnet` for deletion.
    async fn delete_subnet_params(
        &self,
        _api: &dyn CloudNetworkApi,
        _subnet: &Subnet,
        _network: &Network,
        _params: &mut ApiParams,
    ) -> Result<()> {
        Ok(())
    }

    /// Issue the subnet deletion call itself.
    async fn delete_subnet_call(
        &self,
        api: &dyn CloudNetworkApi,
        params: &ApiParams,
    ) -> ApiResult<()> {
        api.delete_subnet(params).await
    }

    /// Fetch the live provider object backing `network`, if the provider
    /// supports targeted lookup.
    async fn lookup_network(
        &self,
        _api: &dyn CloudNetworkApi,
        _network: &Network,
    ) -> Result<Option<ApiNetwork>> {
        Ok(None)
    }

    /// Fetch the live provider object backing `subnet`, if the provider
    /// supports targeted lookup.
    async fn lookup_subnet(
        &self,
        _api: &dyn CloudNetworkApi,
        _subnet: &Subnet,
        _network: &Network,
    ) -> Result<Option<ApiSubnet>> {
        Ok(None)
    }
}
