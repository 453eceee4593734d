//! Neutron driver

use std::collections::HashMap;

use async_trait::async_trait;

use cloudnet_core::{pop_bool, ExtraValue, Network, NetworkError, Provider, Result, Subnet};
use cloudnet_sync::{
    ApiNetwork, ApiNetworkAttrs, ApiParams, ApiResult, ApiSubnet, ApiSubnetAttrs, CloudNetworkApi,
    NetworkDriver,
};

/// Neutron identifies everything by opaque id; deletions pass the stored
/// ids straight through without any lookup round-trip.
#[derive(Debug)]
pub struct OpenStackNetworkDriver;

#[async_trait]
impl NetworkDriver for OpenStackNetworkDriver {
    fn provider(&self) -> Provider {
        Provider::OpenStack
    }

    fn create_subnet_params(&self, _subnet: &Subnet, network: &Network, params: &mut ApiParams) {
        params.set("network_id", network.network_id.clone());
    }

    fn parse_listed_network(
        &self,
        network: &mut Network,
        listed: &ApiNetwork,
        extra: &mut HashMap<String, ExtraValue>,
    ) -> Result<()> {
        let shared = pop_bool(extra, "shared");
        let admin_state_up = pop_bool(extra, "admin_state_up");

        let attrs = network
            .openstack_attrs_mut()
            .ok_or_else(|| NetworkError::bad_request("record is not a Neutron network"))?;
        if let ApiNetworkAttrs::OpenStack { router_external } = &listed.attrs {
            attrs.router_external = *router_external;
        }
        if let Some(shared) = shared {
            attrs.shared = shared;
        }
        if let Some(admin_state_up) = admin_state_up {
            attrs.admin_state_up = admin_state_up;
        }
        Ok(())
    }

    fn parse_listed_subnet(
        &self,
        subnet: &mut Subnet,
        listed: &ApiSubnet,
        _extra: &mut HashMap<String, ExtraValue>,
    ) -> Result<()> {
        if let ApiSubnetAttrs::OpenStack {
            cidr,
            gateway_ip,
            enable_dhcp,
            dns_nameservers,
            allocation_pools,
            ..
        } = &listed.attrs
        {
            subnet.cidr = cidr.clone();
            let attrs = subnet
                .openstack_attrs_mut()
                .ok_or_else(|| NetworkError::bad_request("record is not a Neutron subnet"))?;
            attrs.gateway_ip = gateway_ip.clone();
            attrs.enable_dhcp = *enable_dhcp;
            attrs.dns_nameservers = dns_nameservers.clone();
            attrs.allocation_pools = allocation_pools.clone();
        }
        Ok(())
    }

    async fn fetch_subnets(
        &self,
        api: &dyn CloudNetworkApi,
        network: &Network,
        params: &ApiParams,
    ) -> ApiResult<Vec<ApiSubnet>> {
        // Neutron lists subnets tenant-wide; keep only this network's.
        let listed = api.list_subnets(params).await?;
        Ok(listed
            .into_iter()
            .filter(|subnet| subnet.attrs.network_id() == Some(network.network_id.as_str()))
            .collect())
    }

    async fn delete_network_params(
        &self,
        _api: &dyn CloudNetworkApi,
        network: &Network,
        params: &mut ApiParams,
    ) -> Result<()> {
        params.set("network_id", network.network_id.clone());
        Ok(())
    }

    async fn delete_subnet_params(
        &self,
        _api: &dyn CloudNetworkApi,
        subnet: &Subnet,
        _network: &Network,
        params: &mut ApiParams,
    ) -> Result<()> {
        params.set("subnet_id", subnet.subnet_id.clone());
        Ok(())
    }

    async fn lookup_network(
        &self,
        api: &dyn CloudNetworkApi,
        network: &Network,
    ) -> Result<Option<ApiNetwork>> {
        let listed = api
            .list_networks(&ApiParams::new())
            .await
            .map_err(|source| NetworkError::NetworkListing { source })?;
        Ok(listed.into_iter().find(|live| live.id == network.network_id))
    }

    async fn lookup_subnet(
        &self,
        api: &dyn CloudNetworkApi,
        subnet: &Subnet,
        _network: &Network,
    ) -> Result<Option<ApiSubnet>> {
        let listed = api
            .list_subnets(&ApiParams::new())
            .await
            .map_err(|source| NetworkError::SubnetListing { source })?;
        Ok(listed.into_iter().find(|live| live.id == subnet.subnet_id))
    }
}
