use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderResult, Summarize};
use crate::provider::{Resource, changed, tracked, tracked_list};
use crate::technitium::{DnsZone, DnsZoneCreate, DnsZoneOptions, TechnitiumClient, ZoneType};
use crate::validation::validate_domain_name;

/// `technitium_dns_zone` plan/state.
///
/// The creation-only attributes (`catalog` through `dnssec_validation`) are
/// not reported back by the appliance and are carried over from the prior
/// model on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsZoneModel {
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    pub catalog: Option<String>,
    pub forwarder: Option<String>,
    pub initialize_forwarder: Option<bool>,
    pub use_soa_serial_date_scheme: Option<bool>,
    pub primary_name_server_addresses: Option<Vec<String>>,
    pub zone_transfer_protocol: Option<String>,
    pub tsig_key_name: Option<String>,
    pub protocol: Option<String>,
    pub dnssec_validation: Option<bool>,

    pub disabled: Option<bool>,
    pub query_access: Option<String>,
    pub query_access_network_acl: Option<Vec<String>>,
    pub zone_transfer: Option<String>,
    pub zone_transfer_network_acl: Option<Vec<String>>,
    pub zone_transfer_tsig_key_names: Option<Vec<String>>,
    pub notify: Option<String>,
    pub notify_name_servers: Option<Vec<String>>,
    pub update: Option<String>,
    pub update_network_acl: Option<Vec<String>>,

    /// Computed.
    pub dnssec_status: Option<String>,
}

impl DnsZoneModel {
    pub fn new(name: impl Into<String>, zone_type: ZoneType) -> Self {
        DnsZoneModel {
            name: name.into(),
            zone_type,
            catalog: None,
            forwarder: None,
            initialize_forwarder: None,
            use_soa_serial_date_scheme: None,
            primary_name_server_addresses: None,
            zone_transfer_protocol: None,
            tsig_key_name: None,
            protocol: None,
            dnssec_validation: None,
            disabled: None,
            query_access: None,
            query_access_network_acl: None,
            zone_transfer: None,
            zone_transfer_network_acl: None,
            zone_transfer_tsig_key_names: None,
            notify: None,
            notify_name_servers: None,
            update: None,
            update_network_acl: None,
            dnssec_status: None,
        }
    }

    pub fn to_create(&self) -> DnsZoneCreate {
        DnsZoneCreate {
            name: self.name.clone(),
            zone_type: self.zone_type,
            catalog: self.catalog.clone(),
            use_soa_serial_date_scheme: self.use_soa_serial_date_scheme,
            primary_name_server_addresses: self.primary_name_server_addresses.clone(),
            zone_transfer_protocol: self.zone_transfer_protocol.clone(),
            tsig_key_name: self.tsig_key_name.clone(),
            protocol: self.protocol.clone(),
            forwarder: self.forwarder.clone(),
            initialize_forwarder: self.initialize_forwarder,
            dnssec_validation: self.dnssec_validation,
        }
    }

    pub fn to_options(&self) -> DnsZoneOptions {
        DnsZoneOptions {
            disabled: self.disabled,
            query_access: self.query_access.clone(),
            query_access_network_acl: self.query_access_network_acl.clone(),
            zone_transfer: self.zone_transfer.clone(),
            zone_transfer_network_acl: self.zone_transfer_network_acl.clone(),
            zone_transfer_tsig_key_names: self.zone_transfer_tsig_key_names.clone(),
            notify: self.notify.clone(),
            notify_name_servers: self.notify_name_servers.clone(),
            update: self.update.clone(),
            update_network_acl: self.update_network_acl.clone(),
        }
    }

    /// Names of the in-place options that differ from `state`.
    pub fn changed_options(&self, state: &DnsZoneModel) -> Vec<&'static str> {
        changed(&[
            ("disabled", self.disabled != state.disabled),
            ("query_access", self.query_access != state.query_access),
            (
                "query_access_network_acl",
                self.query_access_network_acl != state.query_access_network_acl,
            ),
            ("zone_transfer", self.zone_transfer != state.zone_transfer),
            (
                "zone_transfer_network_acl",
                self.zone_transfer_network_acl != state.zone_transfer_network_acl,
            ),
            (
                "zone_transfer_tsig_key_names",
                self.zone_transfer_tsig_key_names != state.zone_transfer_tsig_key_names,
            ),
            ("notify", self.notify != state.notify),
            ("notify_name_servers", self.notify_name_servers != state.notify_name_servers),
            ("update", self.update != state.update),
            ("update_network_acl", self.update_network_acl != state.update_network_acl),
        ])
    }

    /// Apply the refresh rule against `prior`.
    pub fn tracked_by(self, prior: &DnsZoneModel) -> Self {
        let p = prior;
        DnsZoneModel {
            name: self.name,
            zone_type: self.zone_type,
            catalog: tracked(&p.catalog, self.catalog),
            forwarder: p.forwarder.clone(),
            initialize_forwarder: p.initialize_forwarder,
            use_soa_serial_date_scheme: p.use_soa_serial_date_scheme,
            primary_name_server_addresses: p.primary_name_server_addresses.clone(),
            zone_transfer_protocol: p.zone_transfer_protocol.clone(),
            tsig_key_name: p.tsig_key_name.clone(),
            protocol: p.protocol.clone(),
            dnssec_validation: p.dnssec_validation,
            disabled: tracked(&p.disabled, self.disabled),
            query_access: tracked(&p.query_access, self.query_access),
            query_access_network_acl: tracked_list(
                &p.query_access_network_acl,
                self.query_access_network_acl,
            ),
            zone_transfer: tracked(&p.zone_transfer, self.zone_transfer),
            zone_transfer_network_acl: tracked_list(
                &p.zone_transfer_network_acl,
                self.zone_transfer_network_acl,
            ),
            zone_transfer_tsig_key_names: tracked_list(
                &p.zone_transfer_tsig_key_names,
                self.zone_transfer_tsig_key_names,
            ),
            notify: tracked(&p.notify, self.notify),
            notify_name_servers: tracked_list(&p.notify_name_servers, self.notify_name_servers),
            update: tracked(&p.update, self.update),
            update_network_acl: tracked_list(&p.update_network_acl, self.update_network_acl),
            dnssec_status: self.dnssec_status,
        }
    }
}

/// Everything `/api/zones/options/get` reports. Creation-only attributes are unknown.
impl From<DnsZone> for DnsZoneModel {
    fn from(z: DnsZone) -> Self {
        DnsZoneModel {
            catalog: z.catalog.filter(|c| !c.is_empty()),
            disabled: Some(z.disabled),
            query_access: z.query_access,
            query_access_network_acl: z.query_access_network_acl,
            zone_transfer: z.zone_transfer,
            zone_transfer_network_acl: z.zone_transfer_network_acl,
            zone_transfer_tsig_key_names: z.zone_transfer_tsig_key_names,
            notify: z.notify,
            notify_name_servers: z.notify_name_servers,
            update: z.update,
            update_network_acl: z.update_network_acl,
            dnssec_status: z.dnssec_status,
            ..DnsZoneModel::new(z.name, z.zone_type)
        }
    }
}

#[derive(Debug, Clone)]
pub struct DnsZoneResource {
    client: TechnitiumClient,
}

impl DnsZoneResource {
    pub fn new(client: TechnitiumClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for DnsZoneResource {
    type Model = DnsZoneModel;
    const TYPE_NAME: &'static str = "technitium_dns_zone";

    fn replace_triggers(plan: &DnsZoneModel, state: &DnsZoneModel) -> Vec<&'static str> {
        changed(&[
            ("name", plan.name != state.name),
            ("type", plan.zone_type != state.zone_type),
            ("catalog", plan.catalog != state.catalog),
            ("forwarder", plan.forwarder != state.forwarder),
            (
                "initialize_forwarder",
                plan.initialize_forwarder != state.initialize_forwarder,
            ),
            (
                "use_soa_serial_date_scheme",
                plan.use_soa_serial_date_scheme != state.use_soa_serial_date_scheme,
            ),
            (
                "primary_name_server_addresses",
                plan.primary_name_server_addresses != state.primary_name_server_addresses,
            ),
            (
                "zone_transfer_protocol",
                plan.zone_transfer_protocol != state.zone_transfer_protocol,
            ),
            ("tsig_key_name", plan.tsig_key_name != state.tsig_key_name),
            ("protocol", plan.protocol != state.protocol),
            (
                "dnssec_validation",
                plan.dnssec_validation != state.dnssec_validation,
            ),
        ])
    }

    fn normalize_plan(mut plan: DnsZoneModel, state: &DnsZoneModel) -> DnsZoneModel {
        plan.dnssec_status = state.dnssec_status.clone();
        plan
    }

    async fn create(&self, plan: &DnsZoneModel) -> ProviderResult<DnsZoneModel> {
        validate_domain_name("name", &plan.name)?;
        let mut zone = self
            .client
            .create_dns_zone(&plan.to_create())
            .await
            .summarize(|| format!("Could not create DNS zone {}", plan.name))?;

        let options = plan.to_options();
        if !options.is_empty() {
            zone = self
                .client
                .set_dns_zone_options(&plan.name, &options)
                .await
                .summarize(|| format!("Could not set options of DNS zone {}", plan.name))?;
        }
        Ok(DnsZoneModel::from(zone).tracked_by(plan))
    }

    async fn read(&self, state: &DnsZoneModel) -> ProviderResult<Option<DnsZoneModel>> {
        let zones = self
            .client
            .list_dns_zones()
            .await
            .summarize(|| "Could not list DNS zones".to_string())?;
        if !zones.iter().any(|z| z.name.eq_ignore_ascii_case(&state.name)) {
            debug!("DNS zone {} no longer exists", state.name);
            return Ok(None);
        }

        let zone = self
            .client
            .get_dns_zone(&state.name)
            .await
            .summarize(|| format!("Could not read DNS zone {}", state.name))?;
        Ok(Some(DnsZoneModel::from(zone).tracked_by(state)))
    }

    /// Only the zone options can change in place.
    async fn update(
        &self,
        plan: &DnsZoneModel,
        state: &DnsZoneModel,
    ) -> ProviderResult<DnsZoneModel> {
        debug!(
            "Updating DNS zone {} options: {:?}",
            state.name,
            plan.changed_options(state)
        );
        let zone = self
            .client
            .set_dns_zone_options(&state.name, &plan.to_options())
            .await
            .summarize(|| format!("Could not update DNS zone {}", state.name))?;
        Ok(DnsZoneModel::from(zone).tracked_by(plan))
    }

    async fn delete(&self, state: &DnsZoneModel) -> ProviderResult<()> {
        self.client
            .delete_dns_zone(&state.name)
            .await
            .summarize(|| format!("Could not delete DNS zone {}", state.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::lifecycle::{PlannedAction, decide};

    #[test]
    fn changed_options_lists_only_differing_options() {
        let mut state = DnsZoneModel::new("example.com", ZoneType::Primary);
        state.notify = Some("ZoneNameServers".into());
        state.dnssec_status = Some("Unsigned".into());
        let mut plan = state.clone();
        plan.notify = None;
        plan.zone_transfer = Some("Deny".into());
        plan.dnssec_status = None;
        assert_eq!(plan.changed_options(&state), ["zone_transfer", "notify"]);
    }

    #[test]
    fn creation_only_attributes_force_replacement() {
        let state = DnsZoneModel::new("example.com", ZoneType::Primary);
        let mut plan = state.clone();
        plan.use_soa_serial_date_scheme = Some(true);
        plan.zone_type = ZoneType::Forwarder;
        assert_eq!(
            DnsZoneResource::replace_triggers(&plan, &state),
            ["type", "use_soa_serial_date_scheme"]
        );
    }

    #[test]
    fn option_changes_update_in_place() {
        let state = DnsZoneModel::new("example.com", ZoneType::Primary);
        let mut plan = state.clone();
        plan.zone_transfer = Some("Deny".into());
        assert_eq!(
            decide::<DnsZoneResource>(Some(&plan), Some(&state)),
            PlannedAction::Update
        );
    }

    #[test]
    fn dnssec_status_is_computed() {
        let mut state = DnsZoneModel::new("example.com", ZoneType::Primary);
        state.dnssec_status = Some("SignedWithNSEC".into());
        let plan = DnsZoneModel::new("example.com", ZoneType::Primary);
        assert_eq!(
            decide::<DnsZoneResource>(Some(&plan), Some(&state)),
            PlannedAction::NoOp
        );
    }

    #[test]
    fn refresh_carries_creation_only_attributes() {
        let mut prior = DnsZoneModel::new("corp.internal", ZoneType::Forwarder);
        prior.forwarder = Some("10.0.0.53".into());
        prior.protocol = Some("Udp".into());
        let zone: DnsZone = serde_json::from_str(
            r#"{"name":"corp.internal","type":"Forwarder","disabled":false,
                "dnssecStatus":"Unsigned","zoneTransfer":"Deny","notify":"None"}"#,
        )
        .unwrap();

        let refreshed = DnsZoneModel::from(zone).tracked_by(&prior);
        assert_eq!(refreshed.forwarder.as_deref(), Some("10.0.0.53"));
        assert_eq!(refreshed.zone_transfer, None);
        assert_eq!(refreshed.disabled, None);
        assert_eq!(refreshed.dnssec_status.as_deref(), Some("Unsigned"));
    }
}
