use serde::de::IgnoredAny;
use tracing::debug;

use crate::technitium::client::TechnitiumClient;
use crate::technitium::error::ClientError;
use crate::technitium::params::Params;
use crate::technitium::types::{DhcpScope, DhcpScopeList, DhcpScopeSummary};

impl TechnitiumClient {
    pub async fn list_scopes(&self) -> Result<Vec<DhcpScopeSummary>, ClientError> {
        let list: DhcpScopeList = self
            .call_for("/api/dhcp/scopes/list", &Params::new())
            .await?;
        Ok(list.scopes)
    }

    pub async fn get_scope(&self, name: &str) -> Result<DhcpScope, ClientError> {
        let mut params = Params::new();
        params.push("name", name);
        self.call_for("/api/dhcp/scopes/get", &params).await
    }

    /// Create or update `scope`, renaming it from `old_name` in the same call
    /// when that differs from `scope.name`. Returns the scope as stored.
    pub async fn set_scope(
        &self,
        scope: &DhcpScope,
        old_name: Option<&str>,
    ) -> Result<DhcpScope, ClientError> {
        let params = scope_params(scope, old_name);
        match params.get("newName") {
            Some(new_name) => debug!(
                "Renaming scope from {} to {new_name}",
                params.get("name").unwrap_or_default()
            ),
            None => debug!("Setting scope {}", scope.name),
        }

        self.call::<IgnoredAny>("/api/dhcp/scopes/set", &params)
            .await?;
        self.get_scope(&scope.name).await
    }

    pub async fn delete_scope(&self, name: &str) -> Result<(), ClientError> {
        let mut params = Params::new();
        params.push("name", name);
        self.call::<IgnoredAny>("/api/dhcp/scopes/delete", &params)
            .await?;
        Ok(())
    }
}

/// Query parameters for `/api/dhcp/scopes/set`.
pub fn scope_params(scope: &DhcpScope, old_name: Option<&str>) -> Params {
    let mut params = Params::new();
    match old_name.filter(|old| *old != scope.name) {
        Some(old) => params.push("name", old).push("newName", &scope.name),
        None => params.push("name", &scope.name),
    };

    params
        .push("startingAddress", &scope.starting_address)
        .push("endingAddress", &scope.ending_address)
        .push("subnetMask", &scope.subnet_mask)
        .push_opt("leaseTimeDays", scope.lease_time_days)
        .push_opt("leaseTimeHours", scope.lease_time_hours)
        .push_opt("leaseTimeMinutes", scope.lease_time_minutes)
        .push_opt("offerDelayTime", scope.offer_delay_time)
        .push_opt("pingCheckEnabled", scope.ping_check_enabled)
        .push_opt("pingCheckTimeout", scope.ping_check_timeout)
        .push_opt("pingCheckRetries", scope.ping_check_retries)
        .push_opt("domainName", scope.domain_name.as_deref())
        .push_list("domainSearchList", scope.domain_search_list.as_deref())
        .push_opt("dnsUpdates", scope.dns_updates)
        .push_opt("dnsTtl", scope.dns_ttl)
        .push_opt("serverAddress", scope.server_address.as_deref())
        .push_opt("serverHostName", scope.server_host_name.as_deref())
        .push_opt("bootFileName", scope.boot_file_name.as_deref())
        .push_opt("routerAddress", scope.router_address.as_deref())
        .push_opt("useThisDnsServer", scope.use_this_dns_server)
        .push_list("dnsServers", scope.dns_servers.as_deref())
        .push_list("winsServers", scope.wins_servers.as_deref())
        .push_list("ntpServers", scope.ntp_servers.as_deref())
        .push_list("ntpServerDomainNames", scope.ntp_server_domain_names.as_deref())
        .push_rows("staticRoutes", scope.static_routes.as_deref(), |r| {
            vec![r.destination.clone(), r.subnet_mask.clone(), r.router.clone()]
        })
        .push_rows("vendorInfo", scope.vendor_info.as_deref(), |v| {
            vec![v.identifier.clone(), v.information.clone()]
        })
        .push_list("capwapAcIpAddresses", scope.capwap_ac_ip_addresses.as_deref())
        .push_list("tftpServerAddresses", scope.tftp_server_addresses.as_deref())
        .push_rows("genericOptions", scope.generic_options.as_deref(), |o| {
            vec![o.code.to_string(), o.value.clone()]
        })
        .push_rows("exclusions", scope.exclusions.as_deref(), |e| {
            vec![e.starting_address.clone(), e.ending_address.clone()]
        })
        .push_rows("reservedLeases", scope.reserved_leases.as_deref(), |l| {
            vec![
                l.host_name.clone().unwrap_or_default(),
                l.hardware_address.clone(),
                l.address.clone(),
                l.comments.clone().unwrap_or_default(),
            ]
        })
        .push_opt("allowOnlyReservedLeases", scope.allow_only_reserved_leases)
        .push_opt(
            "blockLocallyAdministeredMacAddresses",
            scope.block_locally_administered_mac_addresses,
        )
        .push_opt(
            "ignoreClientIdentifierOption",
            scope.ignore_client_identifier_option,
        );

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technitium::types::{Exclusion, ReservedLease, StaticRoute};

    fn lan() -> DhcpScope {
        DhcpScope {
            name: "LAN".into(),
            starting_address: "192.168.1.100".into(),
            ending_address: "192.168.1.200".into(),
            subnet_mask: "255.255.255.0".into(),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_scope_sends_only_required_parameters() {
        let params = scope_params(&lan(), None);
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            ["name", "startingAddress", "endingAddress", "subnetMask"]
        );
        assert_eq!(params.get("name"), Some("LAN"));
    }

    #[test]
    fn rename_uses_old_name_as_key_and_adds_new_name() {
        let mut scope = lan();
        scope.name = "Office".into();
        let params = scope_params(&scope, Some("LAN"));
        assert_eq!(params.get("name"), Some("LAN"));
        assert_eq!(params.get("newName"), Some("Office"));
    }

    #[test]
    fn same_old_name_does_not_emit_new_name() {
        let params = scope_params(&lan(), Some("LAN"));
        assert_eq!(params.get("name"), Some("LAN"));
        assert!(!params.contains("newName"));
    }

    #[test]
    fn exclusions_are_pipe_encoded_start_before_end() {
        let mut scope = lan();
        scope.exclusions = Some(vec![
            Exclusion {
                starting_address: "100".into(),
                ending_address: "110".into(),
            },
            Exclusion {
                starting_address: "200".into(),
                ending_address: "210".into(),
            },
        ]);
        let params = scope_params(&scope, None);
        assert_eq!(params.get("exclusions"), Some("100|110|200|210"));
    }

    #[test]
    fn empty_exclusion_list_is_sent_to_clear_it() {
        let mut scope = lan();
        scope.exclusions = Some(Vec::new());
        let params = scope_params(&scope, None);
        assert_eq!(params.get("exclusions"), Some(""));
    }

    #[test]
    fn nested_lists_keep_their_field_order() {
        let mut scope = lan();
        scope.static_routes = Some(vec![StaticRoute {
            destination: "172.16.0.0".into(),
            subnet_mask: "255.255.0.0".into(),
            router: "10.0.0.254".into(),
        }]);
        scope.reserved_leases = Some(vec![ReservedLease {
            host_name: None,
            hardware_address: "00-11-22-33-44-55".into(),
            address: "192.168.1.150".into(),
            comments: Some("printer".into()),
        }]);
        scope.dns_servers = Some(vec!["1.1.1.1".into(), "1.0.0.1".into()]);

        let params = scope_params(&scope, None);
        assert_eq!(
            params.get("staticRoutes"),
            Some("172.16.0.0|255.255.0.0|10.0.0.254")
        );
        assert_eq!(
            params.get("reservedLeases"),
            Some("|00-11-22-33-44-55|192.168.1.150|printer")
        );
        assert_eq!(params.get("dnsServers"), Some("1.1.1.1,1.0.0.1"));
    }

    #[test]
    fn booleans_and_numbers_are_rendered_plainly() {
        let mut scope = lan();
        scope.lease_time_days = Some(7);
        scope.ping_check_enabled = Some(false);
        let params = scope_params(&scope, None);
        assert_eq!(params.get("leaseTimeDays"), Some("7"));
        assert_eq!(params.get("pingCheckEnabled"), Some("false"));
    }
}
