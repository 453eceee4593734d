//! Network CRUD orchestration

use std::sync::Arc;

use serde_json::Value;

use cloudnet_core::{normalize_extra, Cloud, Network, NetworkError, Result, Subnet};

use crate::api::{ApiParams, CloudNetworkApi};
use crate::driver::NetworkDriver;
use crate::store::NetworkStore;

/// Orchestrates network and subnet CRUD for one cloud.
///
/// Each operation runs the same shape regardless of provider: apply and
/// validate caller parameters, let the driver reshape the outgoing call,
/// issue it through the SDK client, then persist the outcome. Provider
/// deviations live entirely in the `NetworkDriver` hooks.
pub struct NetworkController {
    cloud: Cloud,
    api: Arc<dyn CloudNetworkApi>,
    driver: Arc<dyn NetworkDriver>,
    store: Arc<dyn NetworkStore>,
}

impl NetworkController {
    pub fn new(
        cloud: Cloud,
        api: Arc<dyn CloudNetworkApi>,
        driver: Arc<dyn NetworkDriver>,
        store: Arc<dyn NetworkStore>,
    ) -> Result<Self> {
        if driver.provider() != cloud.provider {
            return Err(NetworkError::bad_request(format!(
                "driver for {} cannot manage a {} cloud",
                driver.provider(),
                cloud.provider
            )));
        }
        Ok(Self {
            cloud,
            api,
            driver,
            store,
        })
    }

    pub fn cloud(&self) -> &Cloud {
        &self.cloud
    }

    /// Create `network` on the provider and persist it.
    ///
    /// `params` is applied onto the record field by field before anything
    /// goes out; an unknown key rejects the whole request. The same bag,
    /// reshaped by the driver, becomes the creation call's arguments.
    pub async fn create_network(&self, network: &mut Network, mut params: ApiParams) -> Result<()> {
        for (key, value) in params.iter() {
            apply_network_field(network, key, value)?;
        }
        network.validate()?;

        if !network.title.is_empty() {
            params.set("name", network.title.clone());
        }
        self.driver.create_network_params(network, &mut params);

        let created = self
            .api
            .create_network(&params)
            .await
            .map_err(|source| NetworkError::NetworkCreation { source })?;
        network.network_id = created.id;

        self.store.save_network(network).await?;
        log::info!("Created {} on cloud {}", network, self.cloud.title);
        Ok(())
    }

    /// Create `subnet` on the provider and persist it.
    pub async fn create_subnet(&self, subnet: &mut Subnet, mut params: ApiParams) -> Result<()> {
        // Reject before touching the provider.
        if subnet.cidr.is_empty() {
            return Err(NetworkError::MissingParameter {
                parameter: "cidr".to_string(),
            });
        }
        let network = self.owning_network(subnet).await?;

        for (key, value) in params.iter() {
            apply_subnet_field(subnet, key, value)?;
        }
        subnet.validate()?;

        if !subnet.title.is_empty() {
            params.set("name", subnet.title.clone());
        }
        params.set("cidr", subnet.cidr.clone());
        self.driver.create_subnet_params(subnet, &network, &mut params);

        let created = self
            .driver
            .create_subnet_call(self.api.as_ref(), &params)
            .await
            .map_err(|source| NetworkError::SubnetCreation { source })?;
        subnet.subnet_id = created.id;

        self.store.save_subnet(subnet).await?;
        log::info!("Created {} on {}", subnet, network);
        Ok(())
    }

    /// Fetch the provider's networks and sync them into the store.
    ///
    /// Listed objects are matched to existing records by provider id so the
    /// local id stays stable across listings. A driver parse failure is
    /// logged and leaves that record with canonical fields only; it never
    /// aborts the listing.
    pub async fn list_networks(&self) -> Result<Vec<Network>> {
        let listed = self
            .api
            .list_networks(&ApiParams::new())
            .await
            .map_err(|source| NetworkError::NetworkListing { source })?;

        let mut networks = Vec::with_capacity(listed.len());
        for api_network in listed {
            let mut network = match self
                .store
                .find_network(&self.cloud.id, &api_network.id)
                .await?
            {
                Some(existing) => existing,
                None => Network::from_listing(&self.cloud, api_network.id.clone()),
            };

            let mut extra = api_network.extra.clone();
            if let Err(err) = self
                .driver
                .parse_listed_network(&mut network, &api_network, &mut extra)
            {
                log::error!("Failed to parse {}: {}", network, err);
            }
            network.extra = normalize_extra(&extra);
            network.title = api_network.name.clone();
            if network.description.is_empty() {
                if let Some(description) = network.extra.remove("description") {
                    network.description = as_plain_string(description);
                }
            }

            self.store.save_network(&network).await?;
            networks.push(network);
        }
        Ok(networks)
    }

    /// Fetch the provider's subnets for `network` and sync them into the
    /// store.
    pub async fn list_subnets(
        &self,
        network: &Network,
        mut params: ApiParams,
    ) -> Result<Vec<Subnet>> {
        self.driver.list_subnets_params(network, &mut params);
        let listed = self
            .driver
            .fetch_subnets(self.api.as_ref(), network, &params)
            .await
            .map_err(|source| NetworkError::SubnetListing { source })?;

        let mut subnets = Vec::with_capacity(listed.len());
        for api_subnet in listed {
            let mut subnet = match self.store.find_subnet(&network.id, &api_subnet.id).await? {
                Some(existing) => existing,
                None => Subnet::from_listing(network, api_subnet.id.clone()),
            };

            let mut extra = api_subnet.extra.clone();
            if let Err(err) = self
                .driver
                .parse_listed_subnet(&mut subnet, &api_subnet, &mut extra)
            {
                log::error!("Failed to parse {}: {}", subnet, err);
            }
            subnet.extra = normalize_extra(&extra);
            subnet.title = api_subnet.name.clone();

            self.store.save_subnet(&subnet).await?;
            subnets.push(subnet);
        }
        Ok(subnets)
    }

    /// Delete `network` from the provider and the store.
    ///
    /// Owned subnets are deleted first; a failure there leaves the network
    /// untouched.
    pub async fn delete_network(&self, network: &Network, mut params: ApiParams) -> Result<()> {
        for subnet in self.store.list_subnets(&network.id).await? {
            self.delete_subnet(&subnet, ApiParams::new()).await?;
        }

        self.driver
            .delete_network_params(self.api.as_ref(), network, &mut params)
            .await?;
        self.driver
            .delete_network_call(self.api.as_ref(), &params)
            .await
            .map_err(|source| NetworkError::NetworkDeletion { source })?;

        self.store.delete_network(&network.id).await?;
        log::info!("Deleted {} from cloud {}", network, self.cloud.title);
        Ok(())
    }

    /// Delete `subnet` from the provider and the store.
    pub async fn delete_subnet(&self, subnet: &Subnet, mut params: ApiParams) -> Result<()> {
        let network = self.owning_network(subnet).await?;

        self.driver
            .delete_subnet_params(self.api.as_ref(), subnet, &network, &mut params)
            .await?;
        self.driver
            .delete_subnet_call(self.api.as_ref(), &params)
            .await
            .map_err(|source| NetworkError::SubnetDeletion { source })?;

        self.store.delete_subnet(&subnet.id).await?;
        log::info!("Deleted {} from {}", subnet, network);
        Ok(())
    }

    async fn owning_network(&self, subnet: &Subnet) -> Result<Network> {
        self.store
            .get_network(&subnet.network)
            .await?
            .ok_or_else(|| NetworkError::NetworkNotFound {
                title: String::new(),
                network_id: subnet.network.clone(),
            })
    }
}

fn apply_network_field(network: &mut Network, key: &str, value: &Value) -> Result<()> {
    match key {
        "name" => network.title = expect_string(key, value)?,
        "description" => network.description = expect_string(key, value)?,
        _ => network.attrs.set_field(key, value)?,
    }
    Ok(())
}

fn apply_subnet_field(subnet: &mut Subnet, key: &str, value: &Value) -> Result<()> {
    match key {
        "name" => subnet.title = expect_string(key, value)?,
        "description" => subnet.description = expect_string(key, value)?,
        "cidr" => subnet.cidr = expect_string(key, value)?,
        _ => subnet.attrs.set_field(key, value)?,
    }
    Ok(())
}

fn expect_string(field: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| NetworkError::bad_request(format!("field '{}' expects a string", field)))
}

fn as_plain_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use cloudnet_core::{CloudApiError, ExtraValue, Provider};

    use crate::api::{ApiNetwork, ApiResult, ApiSubnet};
    use crate::memory::MemoryStore;

    /// Records every call it receives and answers with canned objects.
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<(&'static str, ApiParams)>>,
        networks: Mutex<Vec<ApiNetwork>>,
        subnets: Mutex<Vec<ApiSubnet>>,
        fail_creates: bool,
    }

    impl RecordingApi {
        fn record(&self, call: &'static str, params: &ApiParams) {
            self.calls.lock().unwrap().push((call, params.clone()));
        }

        fn calls(&self) -> Vec<(&'static str, ApiParams)> {
            self.calls.lock().unwrap().clone()
        }

        fn push_network(&self, network: ApiNetwork) {
            self.networks.lock().unwrap().push(network);
        }

        fn push_subnet(&self, subnet: ApiSubnet) {
            self.subnets.lock().unwrap().push(subnet);
        }
    }

    #[async_trait]
    impl CloudNetworkApi for RecordingApi {
        async fn create_network(&self, params: &ApiParams) -> ApiResult<ApiNetwork> {
            self.record("create_network", params);
            if self.fail_creates {
                return Err(CloudApiError::Call {
                    message: "quota exceeded".to_string(),
                });
            }
            Ok(ApiNetwork::new(
                "net-new",
                params.get_str("name").unwrap_or_default(),
            ))
        }

        async fn create_subnet(&self, params: &ApiParams) -> ApiResult<ApiSubnet> {
            self.record("create_subnet", params);
            if self.fail_creates {
                return Err(CloudApiError::Call {
                    message: "quota exceeded".to_string(),
                });
            }
            Ok(ApiSubnet::new(
                "sub-new",
                params.get_str("name").unwrap_or_default(),
            ))
        }

        async fn list_networks(&self, params: &ApiParams) -> ApiResult<Vec<ApiNetwork>> {
            self.record("list_networks", params);
            Ok(self.networks.lock().unwrap().clone())
        }

        async fn list_subnets(&self, params: &ApiParams) -> ApiResult<Vec<ApiSubnet>> {
            self.record("list_subnets", params);
            Ok(self.subnets.lock().unwrap().clone())
        }

        async fn delete_network(&self, params: &ApiParams) -> ApiResult<()> {
            self.record("delete_network", params);
            Ok(())
        }

        async fn delete_subnet(&self, params: &ApiParams) -> ApiResult<()> {
            self.record("delete_subnet", params);
            Ok(())
        }
    }

    /// A driver with every hook left at its default.
    #[derive(Debug)]
    struct PlainDriver;

    impl NetworkDriver for PlainDriver {
        fn provider(&self) -> Provider {
            Provider::OpenStack
        }
    }

    /// A driver whose listing parse hook always fails.
    #[derive(Debug)]
    struct BrokenParseDriver;

    impl NetworkDriver for BrokenParseDriver {
        fn provider(&self) -> Provider {
            Provider::OpenStack
        }

        fn parse_listed_network(
            &self,
            _network: &mut Network,
            _listed: &ApiNetwork,
            _extra: &mut HashMap<String, ExtraValue>,
        ) -> Result<()> {
            Err(NetworkError::bad_request("malformed listing"))
        }
    }

    fn controller_with(
        api: Arc<RecordingApi>,
        driver: Arc<dyn NetworkDriver>,
    ) -> (NetworkController, Arc<MemoryStore>) {
        let cloud = Cloud::new("ost", Provider::OpenStack);
        let store = Arc::new(MemoryStore::new());
        let controller =
            NetworkController::new(cloud, api, driver, store.clone()).unwrap();
        (controller, store)
    }

    #[test]
    fn test_driver_cloud_mismatch_rejected() {
        let cloud = Cloud::new("ec2", Provider::Amazon);
        let result = NetworkController::new(
            cloud,
            Arc::new(RecordingApi::default()),
            Arc::new(PlainDriver),
            Arc::new(MemoryStore::new()),
        );
        assert!(matches!(result, Err(NetworkError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_create_network_persists_provider_id() {
        let api = Arc::new(RecordingApi::default());
        let (controller, store) = controller_with(api.clone(), Arc::new(PlainDriver));

        let mut network = Network::new(controller.cloud());
        let mut params = ApiParams::new();
        params.set("name", "private");
        params.set("shared", true);
        controller.create_network(&mut network, params).await.unwrap();

        assert_eq!(network.network_id, "net-new");
        assert_eq!(network.title, "private");
        let attrs = network.openstack_attrs_mut().unwrap();
        assert!(attrs.shared);

        let saved = store.get_network(&network.id).await.unwrap().unwrap();
        assert_eq!(saved.network_id, "net-new");

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "create_network");
        assert_eq!(calls[0].1.get_str("name"), Some("private"));
    }

    #[tokio::test]
    async fn test_create_network_rejects_unknown_param() {
        let api = Arc::new(RecordingApi::default());
        let (controller, _) = controller_with(api.clone(), Arc::new(PlainDriver));

        let mut network = Network::new(controller.cloud());
        let mut params = ApiParams::new();
        params.set("instance_tenancy", "private");
        let err = controller
            .create_network(&mut network, params)
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkError::BadRequest { .. }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_network_failure_not_persisted() {
        let api = Arc::new(RecordingApi {
            fail_creates: true,
            ..Default::default()
        });
        let (controller, store) = controller_with(api, Arc::new(PlainDriver));

        let mut network = Network::new(controller.cloud());
        let err = controller
            .create_network(&mut network, ApiParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkError::NetworkCreation { .. }));
        assert!(store
            .find_network(&controller.cloud().id, "net-new")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_subnet_requires_cidr_before_any_call() {
        let api = Arc::new(RecordingApi::default());
        let (controller, store) = controller_with(api.clone(), Arc::new(PlainDriver));

        let network = Network::from_listing(controller.cloud(), "net-1");
        store.save_network(&network).await.unwrap();

        let mut subnet = Subnet::new(&network, "");
        let err = controller
            .create_subnet(&mut subnet, ApiParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkError::MissingParameter { .. }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_subnet_requires_known_network() {
        let api = Arc::new(RecordingApi::default());
        let (controller, _store) = controller_with(api.clone(), Arc::new(PlainDriver));

        // The owning network was never saved.
        let network = Network::from_listing(controller.cloud(), "net-1");
        let mut subnet = Subnet::new(&network, "192.168.0.0/24");
        let err = controller
            .create_subnet(&mut subnet, ApiParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkError::NetworkNotFound { .. }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_subnet_sends_cidr() {
        let api = Arc::new(RecordingApi::default());
        let (controller, store) = controller_with(api.clone(), Arc::new(PlainDriver));

        let network = Network::from_listing(controller.cloud(), "net-1");
        store.save_network(&network).await.unwrap();

        let mut subnet = Subnet::new(&network, "192.168.0.0/24");
        let mut params = ApiParams::new();
        params.set("name", "backend");
        controller.create_subnet(&mut subnet, params).await.unwrap();

        assert_eq!(subnet.subnet_id, "sub-new");
        let calls = api.calls();
        assert_eq!(calls[0].0, "create_subnet");
        assert_eq!(calls[0].1.get_str("cidr"), Some("192.168.0.0/24"));
        assert_eq!(calls[0].1.get_str("name"), Some("backend"));
    }

    #[tokio::test]
    async fn test_list_networks_upserts_by_provider_id() {
        let api = Arc::new(RecordingApi::default());
        api.push_network(ApiNetwork::new("net-1", "private"));
        let (controller, _) = controller_with(api.clone(), Arc::new(PlainDriver));

        let first = controller.list_networks().await.unwrap();
        let second = controller.list_networks().await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        // The local id survives re-listing.
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(second[0].title, "private");
    }

    #[tokio::test]
    async fn test_list_networks_normalizes_extra_and_description() {
        let api = Arc::new(RecordingApi::default());
        let mut listed = ApiNetwork::new("net-1", "private");
        listed
            .extra
            .insert("description".to_string(), ExtraValue::from("tenant net"));
        listed.extra.insert(
            "created_at".to_string(),
            ExtraValue::Opaque("2017-03-01 10:00:00+00:00".to_string()),
        );
        api.push_network(listed);
        let (controller, _) = controller_with(api, Arc::new(PlainDriver));

        let networks = controller.list_networks().await.unwrap();
        assert_eq!(networks[0].description, "tenant net");
        assert!(!networks[0].extra.contains_key("description"));
        assert_eq!(
            networks[0].extra["created_at"],
            json!("2017-03-01 10:00:00+00:00")
        );
    }

    #[tokio::test]
    async fn test_list_networks_survives_parse_failure() {
        let api = Arc::new(RecordingApi::default());
        api.push_network(ApiNetwork::new("net-1", "private"));
        api.push_network(ApiNetwork::new("net-2", "public"));
        let (controller, _) = controller_with(api, Arc::new(BrokenParseDriver));

        let networks = controller.list_networks().await.unwrap();
        assert_eq!(networks.len(), 2);
    }

    #[tokio::test]
    async fn test_list_subnets_copies_title() {
        let api = Arc::new(RecordingApi::default());
        let mut listed = ApiSubnet::new("sub-1", "backend");
        listed.extra.insert("cidr".to_string(), ExtraValue::from("192.168.0.0/24"));
        api.push_subnet(listed);
        let (controller, store) = controller_with(api, Arc::new(ListedCidrDriver));

        let network = Network::from_listing(controller.cloud(), "net-1");
        store.save_network(&network).await.unwrap();

        let subnets = controller
            .list_subnets(&network, ApiParams::new())
            .await
            .unwrap();
        assert_eq!(subnets.len(), 1);
        assert_eq!(subnets[0].title, "backend");
        assert_eq!(subnets[0].subnet_id, "sub-1");
        assert_eq!(subnets[0].cidr, "192.168.0.0/24");
    }

    /// Fills the record's CIDR from the listed extra map, as real drivers do.
    #[derive(Debug)]
    struct ListedCidrDriver;

    impl NetworkDriver for ListedCidrDriver {
        fn provider(&self) -> Provider {
            Provider::OpenStack
        }

        fn parse_listed_subnet(
            &self,
            subnet: &mut Subnet,
            _listed: &ApiSubnet,
            extra: &mut HashMap<String, ExtraValue>,
        ) -> Result<()> {
            if let Some(cidr) = cloudnet_core::pop_string(extra, "cidr") {
                subnet.cidr = cidr;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_delete_network_cascades_subnets_first() {
        let api = Arc::new(RecordingApi::default());
        let (controller, store) = controller_with(api.clone(), Arc::new(PlainDriver));

        let network = Network::from_listing(controller.cloud(), "net-1");
        store.save_network(&network).await.unwrap();
        let mut subnet = Subnet::from_listing(&network, "sub-1");
        subnet.cidr = "192.168.0.0/24".to_string();
        store.save_subnet(&subnet).await.unwrap();

        controller
            .delete_network(&network, ApiParams::new())
            .await
            .unwrap();

        let calls: Vec<&str> = api.calls().iter().map(|(name, _)| *name).collect();
        assert_eq!(calls, vec!["delete_subnet", "delete_network"]);
        assert!(store.get_network(&network.id).await.unwrap().is_none());
        assert!(store.get_subnet(&subnet.id).await.unwrap().is_none());
    }
}
