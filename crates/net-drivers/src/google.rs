//! GCE driver

use std::collections::HashMap;

use async_trait::async_trait;

use cloudnet_core::{
    pop_string, ExtraValue, Network, NetworkAttrs, NetworkError, NetworkMode, Provider, Result,
    Subnet,
};
use cloudnet_sync::{
    ApiNetwork, ApiNetworkAttrs, ApiParams, ApiResult, ApiSubnet, ApiSubnetAttrs, CloudNetworkApi,
    NetworkDriver,
};

/// GCE addresses networks and subnetworks by name, carries a separate
/// subnetwork call family, and only accepts a CIDR on legacy-mode networks.
#[derive(Debug)]
pub struct GoogleNetworkDriver;

#[async_trait]
impl NetworkDriver for GoogleNetworkDriver {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn create_network_params(&self, network: &Network, params: &mut ApiParams) {
        // GCE allocates ranges itself outside legacy mode.
        let legacy = matches!(
            &network.attrs,
            NetworkAttrs::Google(attrs) if attrs.mode == NetworkMode::Legacy
        );
        if !legacy {
            params.remove("cidr");
        }
    }

    fn create_subnet_params(&self, _subnet: &Subnet, network: &Network, params: &mut ApiParams) {
        // Subnetworks attach to the parent network by name.
        params.set("network", network.title.clone());
    }

    async fn create_subnet_call(
        &self,
        api: &dyn CloudNetworkApi,
        params: &ApiParams,
    ) -> ApiResult<ApiSubnet> {
        api.create_subnetwork(params).await
    }

    fn parse_listed_network(
        &self,
        network: &mut Network,
        listed: &ApiNetwork,
        extra: &mut HashMap<String, ExtraValue>,
    ) -> Result<()> {
        let gateway = pop_string(extra, "gatewayIPv4");

        let attrs = network
            .google_attrs_mut()
            .ok_or_else(|| NetworkError::bad_request("record is not a GCE network"))?;
        if let ApiNetworkAttrs::Google { cidr, mode } = &listed.attrs {
            attrs.cidr = cidr.clone();
            attrs.mode = mode.parse()?;
        }
        attrs.gateway_ip = gateway;
        Ok(())
    }

    fn parse_listed_subnet(
        &self,
        subnet: &mut Subnet,
        listed: &ApiSubnet,
        extra: &mut HashMap<String, ExtraValue>,
    ) -> Result<()> {
        let gateway = pop_string(extra, "gatewayAddress");

        if let ApiSubnetAttrs::Google { cidr, region, .. } = &listed.attrs {
            subnet.cidr = cidr.clone();
            let attrs = subnet
                .google_attrs_mut()
                .ok_or_else(|| NetworkError::bad_request("record is not a GCE subnetwork"))?;
            attrs.region = region.clone();
            attrs.gateway_ip = gateway;
        }
        Ok(())
    }

    async fn fetch_subnets(
        &self,
        api: &dyn CloudNetworkApi,
        network: &Network,
        params: &ApiParams,
    ) -> ApiResult<Vec<ApiSubnet>> {
        // The subnetwork listing is project-wide; keep only this network's.
        let listed = api.list_subnetworks(params).await?;
        Ok(listed
            .into_iter()
            .filter(|subnet| subnet.attrs.network_id() == Some(network.network_id.as_str()))
            .collect())
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
        params.set("name", live.name);
        Ok(())
    }

    async fn delete_network_call(
        &self,
        api: &dyn CloudNetworkApi,
        params: &ApiParams,
    ) -> ApiResult<()> {
        api.destroy_network(params).await
    }

    async fn delete_subnet_params(
        &self,
        _api: &dyn CloudNetworkApi,
        subnet: &Subnet,
        _network: &Network,
        params: &mut ApiParams,
    ) -> Result<()> {
        params.set("name", subnet.title.clone());
        if let Some(attrs) = subnet.google_attrs() {
            params.set("region", attrs.region.clone());
        }
        Ok(())
    }

    async fn delete_subnet_call(
        &self,
        api: &dyn CloudNetworkApi,
        params: &ApiParams,
    ) -> ApiResult<()> {
        api.destroy_subnetwork(params).await
    }

    async fn lookup_network(
        &self,
        api: &dyn CloudNetworkApi,
        network: &Network,
    ) -> Result<Option<ApiNetwork>> {
        let mut params = ApiParams::new();
        params.set("name", network.title.clone());
        api.get_network(&params)
            .await
            .map_err(|source| NetworkError::NetworkDeletion { source })
    }

    async fn lookup_subnet(
        &self,
        api: &dyn CloudNetworkApi,
        subnet: &Subnet,
        _network: &Network,
    ) -> Result<Option<ApiSubnet>> {
        let mut params = ApiParams::new();
        params.set("name", subnet.title.clone());
        if let Some(attrs) = subnet.google_attrs() {
            params.set("region", attrs.region.clone());
        }
        api.get_subnetwork(&params)
            .await
            .map_err(|source| NetworkError::SubnetDeletion { source })
    }
}
