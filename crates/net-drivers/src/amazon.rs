//! EC2 VPC driver

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;

use cloudnet_core::{
    parse_bool_flag, pop_string, ExtraValue, Network, NetworkError, Provider, Result, Subnet,
};
use cloudnet_sync::{
    ApiNetwork, ApiNetworkAttrs, ApiParams, ApiSubnet, CloudNetworkApi, NetworkDriver,
};

/// EC2 networks are VPCs and subnets live inside one; calls identify the
/// VPC explicitly, and deletions go through a lookup because EC2 deletes by
/// live object id, not by name.
#[derive(Debug)]
pub struct AmazonNetworkDriver;

#[async_trait]
impl NetworkDriver for AmazonNetworkDriver {
    fn provider(&self) -> Provider {
        Provider::Amazon
    }

    fn create_network_params(&self, _network: &Network, params: &mut ApiParams) {
        // EC2 calls the CIDR argument cidr_block.
        params.rename("cidr", "cidr_block");
    }

    fn create_subnet_params(&self, _subnet: &Subnet, network: &Network, params: &mut ApiParams) {
        params.rename("cidr", "cidr_block");
        params.set("vpc_id", network.network_id.clone());
    }

    fn parse_listed_network(
        &self,
        network: &mut Network,
        listed: &ApiNetwork,
        extra: &mut HashMap<String, ExtraValue>,
    ) -> Result<()> {
        let is_default = extra
            .remove("is_default")
            .map(|value| parse_bool_flag(&value))
            .unwrap_or(false);
        let tenancy = pop_string(extra, "instance_tenancy");

        let attrs = network
            .amazon_attrs_mut()
            .ok_or_else(|| NetworkError::bad_request("record is not an EC2 network"))?;
        if let ApiNetworkAttrs::Amazon { cidr_block } = &listed.attrs {
            attrs.cidr = Some(cidr_block.clone());
        }
        attrs.is_default = is_default;
        if let Some(tenancy) = tenancy {
            attrs.instance_tenancy = tenancy.parse()?;
        }
        Ok(())
    }

    fn parse_listed_subnet(
        &self,
        subnet: &mut Subnet,
        _listed: &ApiSubnet,
        extra: &mut HashMap<String, ExtraValue>,
    ) -> Result<()> {
        if let Some(cidr) = pop_string(extra, "cidr_block") {
            subnet.cidr = cidr;
        }
        let zone = pop_string(extra, "zone");

        let attrs = subnet
            .amazon_attrs_mut()
            .ok_or_else(|| NetworkError::bad_request("record is not an EC2 subnet"))?;
        if let Some(zone) = zone {
            attrs.availability_zone = zone;
        }
        Ok(())
    }

    fn list_subnets_params(&self, network: &Network, params: &mut ApiParams) {
        params.set("filters", json!({ "vpc-id": network.network_id }));
    }

    async fn delete_network_params(
        &self,
        api: &dyn CloudNetworkApi,
        network: &Network,
        params: &mut ApiParams,
    ) -> Result<()> {
        let live = self.lookup_network(api, network).await?.ok_or_else(|| {
            NetworkError::NetworkNotFound {
                title: network.title.clone(),
                network_id: network.network_id.clone(),
            }
        })?;
        params.set("vpc_id", live.id);
        Ok(())
    }

    async fn delete_subnet_params(
        &self,
        api: &dyn CloudNetworkApi,
        subnet: &Subnet,
        network: &Network,
        params: &mut ApiParams,
    ) -> Result<()> {
        let live = self.lookup_subnet(api, subnet, network).await?.ok_or_else(|| {
            NetworkError::SubnetNotFound {
                title: subnet.title.clone(),
                subnet_id: subnet.subnet_id.clone(),
            }
        })?;
        params.set("subnet_id", live.id);
        Ok(())
    }

    async fn lookup_network(
        &self,
        api: &dyn CloudNetworkApi,
        network: &Network,
    ) -> Result<Option<ApiNetwork>> {
        let mut params = ApiParams::new();
        params.set("network_ids", json!([network.network_id]));
        let listed = api
            .list_networks(&params)
            .await
            .map_err(|source| NetworkError::NetworkDeletion { source })?;
        Ok(listed.into_iter().find(|live| live.id == network.network_id))
    }

    async fn lookup_subnet(
        &self,
        api: &dyn CloudNetworkApi,
        subnet: &Subnet,
        _network: &Network,
    ) -> Result<Option<ApiSubnet>> {
        let mut params = ApiParams::new();
        params.set("subnet_ids", json!([subnet.subnet_id]));
        let listed = api
            .list_subnets(&params)
            .await
            .map_err(|source| NetworkError::SubnetDeletion { source })?;
        Ok(listed.into_iter().find(|live| live.id == subnet.subnet_id))
    }
}
