//! Read-only lookups: single scope/zone/record and their list forms.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult, Summarize};
use crate::provider::{DataSource, DhcpScopeModel, DnsZoneModel, DnsZoneRecordModel};
use crate::technitium::{DhcpScopeSummary, DnsZoneSummary, TechnitiumClient, ZoneType};

#[derive(Debug, Clone, Deserialize)]
pub struct ByName {
    pub name: String,
}

/// Lookup without arguments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct All {}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordQuery {
    pub domain: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,
}

macro_rules! data_source {
    ($name:ident) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            client: TechnitiumClient,
        }

        impl $name {
            pub fn new(client: TechnitiumClient) -> Self {
                Self { client }
            }
        }
    };
}

data_source!(DhcpScopeDataSource);
data_source!(DhcpScopesDataSource);
data_source!(DnsZoneDataSource);
data_source!(DnsZonesDataSource);
data_source!(DnsZoneRecordDataSource);
data_source!(DnsZoneRecordsDataSource);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DhcpScopeSummaryModel {
    pub name: String,
    pub enabled: bool,
    pub starting_address: String,
    pub ending_address: String,
    pub subnet_mask: String,
    pub network_address: Option<String>,
    pub broadcast_address: Option<String>,
    pub interface_address: Option<String>,
}

impl From<DhcpScopeSummary> for DhcpScopeSummaryModel {
    fn from(s: DhcpScopeSummary) -> Self {
        Self {
            name: s.name,
            enabled: s.enabled,
            starting_address: s.starting_address,
            ending_address: s.ending_address,
            subnet_mask: s.subnet_mask,
            network_address: s.network_address,
            broadcast_address: s.broadcast_address,
            interface_address: s.interface_address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsZoneSummaryModel {
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    pub disabled: bool,
    pub internal: bool,
    pub dnssec_status: Option<String>,
    pub soa_serial: Option<u32>,
    pub expiry: Option<String>,
    pub is_expired: Option<bool>,
    pub last_modified: Option<String>,
    pub catalog: Option<String>,
}

impl From<DnsZoneSummary> for DnsZoneSummaryModel {
    fn from(z: DnsZoneSummary) -> Self {
        Self {
            name: z.name,
            zone_type: z.zone_type,
            disabled: z.disabled,
            internal: z.internal,
            dnssec_status: z.dnssec_status,
            soa_serial: z.soa_serial,
            expiry: z.expiry,
            is_expired: z.is_expired,
            last_modified: z.last_modified,
            catalog: z.catalog,
        }
    }
}

#[async_trait]
impl DataSource for DhcpScopeDataSource {
    type Query = ByName;
    type Output = DhcpScopeModel;
    const TYPE_NAME: &'static str = "technitium_dhcp_scope";

    async fn read(&self, query: &ByName) -> ProviderResult<DhcpScopeModel> {
        let scope = self
            .client
            .get_scope(&query.name)
            .await
            .summarize(|| format!("Could not read DHCP scope {}", query.name))?;
        Ok(DhcpScopeModel::from(scope))
    }
}

#[async_trait]
impl DataSource for DhcpScopesDataSource {
    type Query = All;
    type Output = Vec<DhcpScopeSummaryModel>;
    const TYPE_NAME: &'static str = "technitium_dhcp_scopes";

    async fn read(&self, _query: &All) -> ProviderResult<Vec<DhcpScopeSummaryModel>> {
        let scopes = self
            .client
            .list_scopes()
            .await
            .summarize(|| "Could not list DHCP scopes".to_string())?;
        Ok(scopes.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl DataSource for DnsZoneDataSource {
    type Query = ByName;
    type Output = DnsZoneModel;
    const TYPE_NAME: &'static str = "technitium_dns_zone";

    async fn read(&self, query: &ByName) -> ProviderResult<DnsZoneModel> {
        let zone = self
            .client
            .get_dns_zone(&query.name)
            .await
            .summarize(|| format!("Could not read DNS zone {}", query.name))?;
        Ok(DnsZoneModel::from(zone))
    }
}

#[async_trait]
impl DataSource for DnsZonesDataSource {
    type Query = All;
    type Output = Vec<DnsZoneSummaryModel>;
    const TYPE_NAME: &'static str = "technitium_dns_zones";

    async fn read(&self, _query: &All) -> ProviderResult<Vec<DnsZoneSummaryModel>> {
        let zones = self
            .client
            .list_dns_zones()
            .await
            .summarize(|| "Could not list DNS zones".to_string())?;
        Ok(zones.into_iter().map(Into::into).collect())
    }
}

/// First record at `domain`, optionally restricted to one type.
#[async_trait]
impl DataSource for DnsZoneRecordDataSource {
    type Query = RecordQuery;
    type Output = DnsZoneRecordModel;
    const TYPE_NAME: &'static str = "technitium_dns_zone_record";

    async fn read(&self, query: &RecordQuery) -> ProviderResult<DnsZoneRecordModel> {
        let records = self
            .client
            .get_dns_zone_records(&query.domain, query.zone.as_deref())
            .await
            .summarize(|| format!("Could not read DNS zone records of {}", query.domain))?;

        records
            .into_iter()
            .find(|r| {
                query
                    .record_type
                    .as_deref()
                    .is_none_or(|t| r.record_type().eq_ignore_ascii_case(t))
            })
            .map(DnsZoneRecordModel::from)
            .ok_or_else(|| {
                ProviderError::not_found(format!(
                    "no {} record at {}",
                    query.record_type.as_deref().unwrap_or("matching"),
                    query.domain
                ))
            })
    }
}

#[async_trait]
impl DataSource for DnsZoneRecordsDataSource {
    type Query = RecordQuery;
    type Output = Vec<DnsZoneRecordModel>;
    const TYPE_NAME: &'static str = "technitium_dns_zone_records";

    async fn read(&self, query: &RecordQuery) -> ProviderResult<Vec<DnsZoneRecordModel>> {
        let records = self
            .client
            .get_dns_zone_records(&query.domain, query.zone.as_deref())
            .await
            .summarize(|| format!("Could not read DNS zone records of {}", query.domain))?;

        Ok(records
            .into_iter()
            .filter(|r| {
                query
                    .record_type
                    .as_deref()
                    .is_none_or(|t| r.record_type().eq_ignore_ascii_case(t))
            })
            .map(DnsZoneRecordModel::from)
            .collect())
    }
}
