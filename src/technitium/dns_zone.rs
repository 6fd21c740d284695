use serde::de::IgnoredAny;
use tracing::debug;

use crate::technitium::client::TechnitiumClient;
use crate::technitium::error::ClientError;
use crate::technitium::params::Params;
use crate::technitium::types::{DnsZone, DnsZoneCreate, DnsZoneList, DnsZoneOptions, DnsZoneSummary};

impl TechnitiumClient {
    pub async fn list_dns_zones(&self) -> Result<Vec<DnsZoneSummary>, ClientError> {
        let list: DnsZoneList = self.call_for("/api/zones/list", &Params::new()).await?;
        Ok(list.zones)
    }

    pub async fn get_dns_zone(&self, name: &str) -> Result<DnsZone, ClientError> {
        let mut params = Params::new();
        params.push("zone", name);
        self.call_for("/api/zones/options/get", &params).await
    }

    /// Create a zone and return it as the appliance reports it.
    pub async fn create_dns_zone(&self, zone: &DnsZoneCreate) -> Result<DnsZone, ClientError> {
        debug!("Creating {} zone {}", zone.zone_type, zone.name);
        self.call::<IgnoredAny>("/api/zones/create", &create_zone_params(zone))
            .await?;
        self.get_dns_zone(&zone.name).await
    }

    /// Apply mutable options to an existing zone.
    pub async fn set_dns_zone_options(
        &self,
        name: &str,
        options: &DnsZoneOptions,
    ) -> Result<DnsZone, ClientError> {
        self.call::<IgnoredAny>("/api/zones/options/set", &zone_options_params(name, options))
            .await?;
        self.get_dns_zone(name).await
    }

    pub async fn delete_dns_zone(&self, name: &str) -> Result<(), ClientError> {
        let mut params = Params::new();
        params.push("zone", name);
        self.call::<IgnoredAny>("/api/zones/delete", &params).await?;
        Ok(())
    }
}

pub fn create_zone_params(zone: &DnsZoneCreate) -> Params {
    let mut params = Params::new();
    params
        .push("zone", &zone.name)
        .push("type", zone.zone_type)
        .push_opt("catalog", zone.catalog.as_deref())
        .push_opt("useSoaSerialDateScheme", zone.use_soa_serial_date_scheme)
        .push_list(
            "primaryNameServerAddresses",
            zone.primary_name_server_addresses.as_deref(),
        )
        .push_opt("zoneTransferProtocol", zone.zone_transfer_protocol.as_deref())
        .push_opt("tsigKeyName", zone.tsig_key_name.as_deref())
        .push_opt("protocol", zone.protocol.as_deref())
        .push_opt("forwarder", zone.forwarder.as_deref())
        .push_opt("initializeForwarder", zone.initialize_forwarder)
        .push_opt("dnssecValidation", zone.dnssec_validation);
    params
}

pub fn zone_options_params(name: &str, options: &DnsZoneOptions) -> Params {
    let mut params = Params::new();
    params
        .push("zone", name)
        .push_opt("disabled", options.disabled)
        .push_opt("queryAccess", options.query_access.as_deref())
        .push_list(
            "queryAccessNetworkACL",
            options.query_access_network_acl.as_deref(),
        )
        .push_opt("zoneTransfer", options.zone_transfer.as_deref())
        .push_list(
            "zoneTransferNetworkACL",
            options.zone_transfer_network_acl.as_deref(),
        )
        .push_list(
            "zoneTransferTsigKeyNames",
            options.zone_transfer_tsig_key_names.as_deref(),
        )
        .push_opt("notify", options.notify.as_deref())
        .push_list("notifyNameServers", options.notify_name_servers.as_deref())
        .push_opt("update", options.update.as_deref())
        .push_list("updateNetworkACL", options.update_network_acl.as_deref());
    params
}
