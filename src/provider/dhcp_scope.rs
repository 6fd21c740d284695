use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderResult, Summarize};
use crate::provider::{Resource, tracked, tracked_list};
use crate::technitium::{
    DhcpScope, Exclusion, GenericOption, ReservedLease, StaticRoute, TechnitiumClient, VendorInfo,
};
use crate::validation::{validate_hardware_address, validate_ip_address, validate_required};

/// `technitium_dhcp_scope` plan/state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpScopeModel {
    pub name: String,
    pub starting_address: String,
    pub ending_address: String,
    pub subnet_mask: String,
    pub lease_time_days: Option<u16>,
    pub lease_time_hours: Option<u8>,
    pub lease_time_minutes: Option<u8>,
    pub offer_delay_time: Option<u16>,
    pub ping_check_enabled: Option<bool>,
    pub ping_check_timeout: Option<u16>,
    pub ping_check_retries: Option<u8>,
    pub domain_name: Option<String>,
    pub domain_search_list: Option<Vec<String>>,
    pub dns_updates: Option<bool>,
    pub dns_ttl: Option<u32>,
    pub server_address: Option<String>,
    pub server_host_name: Option<String>,
    pub boot_file_name: Option<String>,
    pub router_address: Option<String>,
    pub use_this_dns_server: Option<bool>,
    pub dns_servers: Option<Vec<String>>,
    pub wins_servers: Option<Vec<String>>,
    pub ntp_servers: Option<Vec<String>>,
    pub ntp_server_domain_names: Option<Vec<String>>,
    pub static_routes: Option<Vec<StaticRouteModel>>,
    pub vendor_info: Option<Vec<VendorInfo>>,
    pub capwap_ac_ip_addresses: Option<Vec<String>>,
    pub tftp_server_addresses: Option<Vec<String>>,
    pub generic_options: Option<Vec<GenericOption>>,
    pub exclusions: Option<Vec<ExclusionModel>>,
    pub reserved_leases: Option<Vec<ReservedLeaseModel>>,
    pub allow_only_reserved_leases: Option<bool>,
    pub block_locally_administered_mac_addresses: Option<bool>,
    pub ignore_client_identifier_option: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRouteModel {
    pub destination: String,
    pub subnet_mask: String,
    pub router: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionModel {
    pub starting_address: String,
    pub ending_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedLeaseModel {
    pub host_name: Option<String>,
    pub hardware_address: String,
    pub address: String,
    pub comments: Option<String>,
}

impl From<StaticRoute> for StaticRouteModel {
    fn from(r: StaticRoute) -> Self {
        Self {
            destination: r.destination,
            subnet_mask: r.subnet_mask,
            router: r.router,
        }
    }
}

impl From<&StaticRouteModel> for StaticRoute {
    fn from(r: &StaticRouteModel) -> Self {
        Self {
            destination: r.destination.clone(),
            subnet_mask: r.subnet_mask.clone(),
            router: r.router.clone(),
        }
    }
}

impl From<Exclusion> for ExclusionModel {
    fn from(e: Exclusion) -> Self {
        Self {
            starting_address: e.starting_address,
            ending_address: e.ending_address,
        }
    }
}

impl From<&ExclusionModel> for Exclusion {
    fn from(e: &ExclusionModel) -> Self {
        Self {
            starting_address: e.starting_address.clone(),
            ending_address: e.ending_address.clone(),
        }
    }
}

impl From<ReservedLease> for ReservedLeaseModel {
    fn from(l: ReservedLease) -> Self {
        Self {
            host_name: l.host_name.filter(|h| !h.is_empty()),
            hardware_address: l.hardware_address,
            address: l.address,
            comments: l.comments.filter(|c| !c.is_empty()),
        }
    }
}

impl From<&ReservedLeaseModel> for ReservedLease {
    fn from(l: &ReservedLeaseModel) -> Self {
        Self {
            host_name: l.host_name.clone(),
            hardware_address: l.hardware_address.clone(),
            address: l.address.clone(),
            comments: l.comments.clone(),
        }
    }
}

fn convert<A, B>(items: &Option<Vec<A>>) -> Option<Vec<B>>
where
    for<'a> B: From<&'a A>,
{
    items.as_ref().map(|v| v.iter().map(B::from).collect())
}

fn convert_owned<A, B: From<A>>(items: Option<Vec<A>>) -> Option<Vec<B>> {
    items.map(|v| v.into_iter().map(B::from).collect())
}

impl From<&DhcpScopeModel> for DhcpScope {
    fn from(m: &DhcpScopeModel) -> Self {
        DhcpScope {
            name: m.name.clone(),
            starting_address: m.starting_address.clone(),
            ending_address: m.ending_address.clone(),
            subnet_mask: m.subnet_mask.clone(),
            lease_time_days: m.lease_time_days,
            lease_time_hours: m.lease_time_hours,
            lease_time_minutes: m.lease_time_minutes,
            offer_delay_time: m.offer_delay_time,
            ping_check_enabled: m.ping_check_enabled,
            ping_check_timeout: m.ping_check_timeout,
            ping_check_retries: m.ping_check_retries,
            domain_name: m.domain_name.clone(),
            domain_search_list: m.domain_search_list.clone(),
            dns_updates: m.dns_updates,
            dns_ttl: m.dns_ttl,
            server_address: m.server_address.clone(),
            server_host_name: m.server_host_name.clone(),
            boot_file_name: m.boot_file_name.clone(),
            router_address: m.router_address.clone(),
            use_this_dns_server: m.use_this_dns_server,
            dns_servers: m.dns_servers.clone(),
            wins_servers: m.wins_servers.clone(),
            ntp_servers: m.ntp_servers.clone(),
            ntp_server_domain_names: m.ntp_server_domain_names.clone(),
            static_routes: convert(&m.static_routes),
            vendor_info: m.vendor_info.clone(),
            capwap_ac_ip_addresses: m.capwap_ac_ip_addresses.clone(),
            tftp_server_addresses: m.tftp_server_addresses.clone(),
            generic_options: m.generic_options.clone(),
            exclusions: convert(&m.exclusions),
            reserved_leases: convert(&m.reserved_leases),
            allow_only_reserved_leases: m.allow_only_reserved_leases,
            block_locally_administered_mac_addresses: m.block_locally_administered_mac_addresses,
            ignore_client_identifier_option: m.ignore_client_identifier_option,
        }
    }
}

/// Everything the appliance reports, as used by the data source.
impl From<DhcpScope> for DhcpScopeModel {
    fn from(s: DhcpScope) -> Self {
        DhcpScopeModel {
            name: s.name,
            starting_address: s.starting_address,
            ending_address: s.ending_address,
            subnet_mask: s.subnet_mask,
            lease_time_days: s.lease_time_days,
            lease_time_hours: s.lease_time_hours,
            lease_time_minutes: s.lease_time_minutes,
            offer_delay_time: s.offer_delay_time,
            ping_check_enabled: s.ping_check_enabled,
            ping_check_timeout: s.ping_check_timeout,
            ping_check_retries: s.ping_check_retries,
            domain_name: s.domain_name,
            domain_search_list: s.domain_search_list,
            dns_updates: s.dns_updates,
            dns_ttl: s.dns_ttl,
            server_address: s.server_address,
            server_host_name: s.server_host_name,
            boot_file_name: s.boot_file_name,
            router_address: s.router_address,
            use_this_dns_server: s.use_this_dns_server,
            dns_servers: s.dns_servers,
            wins_servers: s.wins_servers,
            ntp_servers: s.ntp_servers,
            ntp_server_domain_names: s.ntp_server_domain_names,
            static_routes: convert_owned(s.static_routes),
            vendor_info: s.vendor_info,
            capwap_ac_ip_addresses: s.capwap_ac_ip_addresses,
            tftp_server_addresses: s.tftp_server_addresses,
            generic_options: s.generic_options,
            exclusions: convert_owned(s.exclusions),
            reserved_leases: convert_owned(s.reserved_leases),
            allow_only_reserved_leases: s.allow_only_reserved_leases,
            block_locally_administered_mac_addresses: s.block_locally_administered_mac_addresses,
            ignore_client_identifier_option: s.ignore_client_identifier_option,
        }
    }
}

impl DhcpScopeModel {
    /// Apply the refresh rule against `prior`.
    pub fn tracked_by(self, prior: &DhcpScopeModel) -> Self {
        let p = prior;
        DhcpScopeModel {
            name: self.name,
            starting_address: self.starting_address,
            ending_address: self.ending_address,
            subnet_mask: self.subnet_mask,
            lease_time_days: tracked(&p.lease_time_days, self.lease_time_days),
            lease_time_hours: tracked(&p.lease_time_hours, self.lease_time_hours),
            lease_time_minutes: tracked(&p.lease_time_minutes, self.lease_time_minutes),
            offer_delay_time: tracked(&p.offer_delay_time, self.offer_delay_time),
            ping_check_enabled: tracked(&p.ping_check_enabled, self.ping_check_enabled),
            ping_check_timeout: tracked(&p.ping_check_timeout, self.ping_check_timeout),
            ping_check_retries: tracked(&p.ping_check_retries, self.ping_check_retries),
            domain_name: tracked(&p.domain_name, self.domain_name),
            domain_search_list: tracked_list(&p.domain_search_list, self.domain_search_list),
            dns_updates: tracked(&p.dns_updates, self.dns_updates),
            dns_ttl: tracked(&p.dns_ttl, self.dns_ttl),
            server_address: tracked(&p.server_address, self.server_address),
            server_host_name: tracked(&p.server_host_name, self.server_host_name),
            boot_file_name: tracked(&p.boot_file_name, self.boot_file_name),
            router_address: tracked(&p.router_address, self.router_address),
            use_this_dns_server: tracked(&p.use_this_dns_server, self.use_this_dns_server),
            dns_servers: tracked_list(&p.dns_servers, self.dns_servers),
            wins_servers: tracked_list(&p.wins_servers, self.wins_servers),
            ntp_servers: tracked_list(&p.ntp_servers, self.ntp_servers),
            ntp_server_domain_names: tracked_list(
                &p.ntp_server_domain_names,
                self.ntp_server_domain_names,
            ),
            static_routes: tracked_list(&p.static_routes, self.static_routes),
            vendor_info: tracked_list(&p.vendor_info, self.vendor_info),
            capwap_ac_ip_addresses: tracked_list(
                &p.capwap_ac_ip_addresses,
                self.capwap_ac_ip_addresses,
            ),
            tftp_server_addresses: tracked_list(
                &p.tftp_server_addresses,
                self.tftp_server_addresses,
            ),
            generic_options: tracked_list(&p.generic_options, self.generic_options),
            exclusions: tracked_list(&p.exclusions, self.exclusions),
            reserved_leases: tracked_list(&p.reserved_leases, self.reserved_leases),
            allow_only_reserved_leases: tracked(
                &p.allow_only_reserved_leases,
                self.allow_only_reserved_leases,
            ),
            block_locally_administered_mac_addresses: tracked(
                &p.block_locally_administered_mac_addresses,
                self.block_locally_administered_mac_addresses,
            ),
            ignore_client_identifier_option: tracked(
                &p.ignore_client_identifier_option,
                self.ignore_client_identifier_option,
            ),
        }
    }

    pub fn validate(&self) -> ProviderResult<()> {
        validate_required("name", &self.name)?;
        validate_ip_address("starting_address", &self.starting_address)?;
        validate_ip_address("ending_address", &self.ending_address)?;
        validate_ip_address("subnet_mask", &self.subnet_mask)?;
        if let Some(router) = self.router_address.as_deref().filter(|r| !r.is_empty()) {
            validate_ip_address("router_address", router)?;
        }
        for lease in self.reserved_leases.iter().flatten() {
            validate_hardware_address(&lease.hardware_address)?;
            validate_ip_address("reserved_leases.address", &lease.address)?;
        }
        Ok(())
    }
}

/// `technitium_dhcp_scope`. Renames are applied in place.
#[derive(Debug, Clone)]
pub struct DhcpScopeResource {
    client: TechnitiumClient,
}

impl DhcpScopeResource {
    pub fn new(client: TechnitiumClient) -> Self {
        Self { client }
    }

    async fn set(
        &self,
        plan: &DhcpScopeModel,
        old_name: Option<&str>,
    ) -> ProviderResult<DhcpScopeModel> {
        plan.validate()?;
        let verb = if old_name.is_some() { "update" } else { "create" };
        let stored = self
            .client
            .set_scope(&DhcpScope::from(plan), old_name)
            .await
            .summarize(|| format!("Could not {verb} DHCP scope {}", plan.name))?;
        Ok(DhcpScopeModel::from(stored).tracked_by(plan))
    }
}

#[async_trait]
impl Resource for DhcpScopeResource {
    type Model = DhcpScopeModel;
    const TYPE_NAME: &'static str = "technitium_dhcp_scope";

    fn replace_triggers(_plan: &DhcpScopeModel, _state: &DhcpScopeModel) -> Vec<&'static str> {
        Vec::new()
    }

    async fn create(&self, plan: &DhcpScopeModel) -> ProviderResult<DhcpScopeModel> {
        self.set(plan, None).await
    }

    async fn read(&self, state: &DhcpScopeModel) -> ProviderResult<Option<DhcpScopeModel>> {
        let scopes = self
            .client
            .list_scopes()
            .await
            .summarize(|| "Could not list DHCP scopes".to_string())?;
        if !scopes.iter().any(|s| s.name == state.name) {
            debug!("DHCP scope {} no longer exists", state.name);
            return Ok(None);
        }

        let scope = self
            .client
            .get_scope(&state.name)
            .await
            .summarize(|| format!("Could not read DHCP scope {}", state.name))?;
        Ok(Some(DhcpScopeModel::from(scope).tracked_by(state)))
    }

    async fn update(
        &self,
        plan: &DhcpScopeModel,
        state: &DhcpScopeModel,
    ) -> ProviderResult<DhcpScopeModel> {
        self.set(plan, Some(&state.name)).await
    }

    async fn delete(&self, state: &DhcpScopeModel) -> ProviderResult<()> {
        self.client
            .delete_scope(&state.name)
            .await
            .summarize(|| format!("Could not delete DHCP scope {}", state.name))
    }
}
