use std::fmt;

use serde::{Deserialize, Serialize};

/// Uniform `{status, errorMessage?, response?}` wrapper returned by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
    pub response: Option<T>,
}

pub const STATUS_OK: &str = "ok";
pub const STATUS_INVALID_TOKEN: &str = "invalid-token";

// ---------------------------------------------------------------------------
// DHCP
// ---------------------------------------------------------------------------

/// Entry of `/api/dhcp/scopes/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhcpScopeSummary {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    pub starting_address: String,
    pub ending_address: String,
    pub subnet_mask: String,
    #[serde(default)]
    pub network_address: Option<String>,
    #[serde(default)]
    pub broadcast_address: Option<String>,
    #[serde(default)]
    pub interface_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DhcpScopeList {
    #[serde(default)]
    pub scopes: Vec<DhcpScopeSummary>,
}

/// A DHCP scope as sent to `/api/dhcp/scopes/set` and returned by `/get`.
///
/// Only the address range and subnet mask are required; everything else is
/// left untouched on the appliance when `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DhcpScope {
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
    pub static_routes: Option<Vec<StaticRoute>>,
    pub vendor_info: Option<Vec<VendorInfo>>,
    pub capwap_ac_ip_addresses: Option<Vec<String>>,
    pub tftp_server_addresses: Option<Vec<String>>,
    pub generic_options: Option<Vec<GenericOption>>,
    pub exclusions: Option<Vec<Exclusion>>,
    pub reserved_leases: Option<Vec<ReservedLease>>,
    pub allow_only_reserved_leases: Option<bool>,
    pub block_locally_administered_mac_addresses: Option<bool>,
    pub ignore_client_identifier_option: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    pub starting_address: String,
    pub ending_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticRoute {
    pub destination: String,
    pub subnet_mask: String,
    pub router: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorInfo {
    pub identifier: String,
    pub information: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericOption {
    pub code: u8,
    pub value: String,
}

/// Reserved lease as embedded in a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedLease {
    #[serde(default)]
    pub host_name: Option<String>,
    pub hardware_address: String,
    pub address: String,
    #[serde(default)]
    pub comments: Option<String>,
}

/// Reserved lease addressed on its own through `addReservedLease`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpReservedLease {
    pub scope_name: String,
    pub hardware_address: String,
    pub ip_address: String,
    pub host_name: Option<String>,
    pub comments: Option<String>,
}

// ---------------------------------------------------------------------------
// DNS zones
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneType {
    Primary,
    Secondary,
    Stub,
    Forwarder,
    SecondaryForwarder,
    Catalog,
    SecondaryCatalog,
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZoneType::Primary => "Primary",
            ZoneType::Secondary => "Secondary",
            ZoneType::Stub => "Stub",
            ZoneType::Forwarder => "Forwarder",
            ZoneType::SecondaryForwarder => "SecondaryForwarder",
            ZoneType::Catalog => "Catalog",
            ZoneType::SecondaryCatalog => "SecondaryCatalog",
        };
        f.write_str(name)
    }
}

/// Entry of `/api/zones/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsZoneSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub dnssec_status: Option<String>,
    #[serde(default)]
    pub soa_serial: Option<u32>,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub is_expired: Option<bool>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub catalog: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DnsZoneList {
    #[serde(default)]
    pub zones: Vec<DnsZoneSummary>,
}

/// Zone as reported by `/api/zones/options/get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsZone {
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, alias = "dnsSecStatus")]
    pub dnssec_status: Option<String>,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub notify_failed: bool,
    #[serde(default)]
    pub notify_failed_for: Option<Vec<String>>,
    #[serde(default)]
    pub query_access: Option<String>,
    #[serde(rename = "queryAccessNetworkACL", default)]
    pub query_access_network_acl: Option<Vec<String>>,
    #[serde(default)]
    pub zone_transfer: Option<String>,
    #[serde(rename = "zoneTransferNetworkACL", default)]
    pub zone_transfer_network_acl: Option<Vec<String>>,
    #[serde(default)]
    pub zone_transfer_tsig_key_names: Option<Vec<String>>,
    #[serde(default)]
    pub notify: Option<String>,
    #[serde(default)]
    pub notify_name_servers: Option<Vec<String>>,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(rename = "updateNetworkACL", default)]
    pub update_network_acl: Option<Vec<String>>,
}

/// Creation-only zone settings. Changing any of them means a new zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsZoneCreate {
    pub name: String,
    pub zone_type: ZoneType,
    pub catalog: Option<String>,
    pub use_soa_serial_date_scheme: Option<bool>,
    pub primary_name_server_addresses: Option<Vec<String>>,
    pub zone_transfer_protocol: Option<String>,
    pub tsig_key_name: Option<String>,
    pub protocol: Option<String>,
    pub forwarder: Option<String>,
    pub initialize_forwarder: Option<bool>,
    pub dnssec_validation: Option<bool>,
}

impl DnsZoneCreate {
    pub fn new(name: impl Into<String>, zone_type: ZoneType) -> Self {
        Self {
            name: name.into(),
            zone_type,
            catalog: None,
            use_soa_serial_date_scheme: None,
            primary_name_server_addresses: None,
            zone_transfer_protocol: None,
            tsig_key_name: None,
            protocol: None,
            forwarder: None,
            initialize_forwarder: None,
            dnssec_validation: None,
        }
    }
}

/// Mutable zone options for `/api/zones/options/set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsZoneOptions {
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
}

impl DnsZoneOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// DNS zone records
// ---------------------------------------------------------------------------

/// A single resource record inside a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsZoneRecord {
    pub domain: String,
    pub zone: String,
    pub ttl: Option<u32>,
    pub disabled: Option<bool>,
    pub comments: Option<String>,
    pub expiry_ttl: Option<u32>,
    pub data: RecordData,
}

impl DnsZoneRecord {
    pub fn record_type(&self) -> &str {
        self.data.record_type()
    }
}

/// Type-specific payload. Exactly one variant is meaningful per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(AddressData),
    Aaaa(AddressData),
    Cname {
        cname: String,
    },
    Ns {
        name_server: String,
        glue: Option<String>,
    },
    Ptr {
        ptr_name: String,
    },
    Mx {
        exchange: String,
        preference: u16,
    },
    Txt {
        text: String,
        split_text: Option<bool>,
    },
    Fwd(ForwarderData),
    App {
        app_name: String,
        class_path: String,
        record_data: String,
    },
    /// Read-only carrier for types this crate does not write (SOA, SRV, ...).
    Other {
        record_type: String,
        rdata: serde_json::Map<String, serde_json::Value>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressData {
    pub ip_address: String,
    pub ptr: Option<bool>,
    pub create_ptr_zone: Option<bool>,
    pub update_svcb_hints: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwarderData {
    pub protocol: Option<String>,
    pub forwarder: String,
    pub forwarder_priority: Option<u16>,
    pub dnssec_validation: Option<bool>,
    pub proxy: Option<ProxySettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    pub proxy_type: String,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RecordData {
    pub fn record_type(&self) -> &str {
        match self {
            RecordData::A(_) => "A",
            RecordData::Aaaa(_) => "AAAA",
            RecordData::Cname { .. } => "CNAME",
            RecordData::Ns { .. } => "NS",
            RecordData::Ptr { .. } => "PTR",
            RecordData::Mx { .. } => "MX",
            RecordData::Txt { .. } => "TXT",
            RecordData::Fwd(_) => "FWD",
            RecordData::App { .. } => "APP",
            RecordData::Other { record_type, .. } => record_type,
        }
    }

    /// Value that tells two records of the same name and type apart.
    /// `None` means any record of that type matches (a name owns one CNAME).
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            RecordData::A(a) | RecordData::Aaaa(a) => Some(&a.ip_address),
            RecordData::Ns { name_server, .. } => Some(name_server),
            RecordData::Ptr { ptr_name } => Some(ptr_name),
            RecordData::Mx { exchange, .. } => Some(exchange),
            RecordData::Txt { text, .. } => Some(text),
            RecordData::Fwd(f) => Some(&f.forwarder),
            RecordData::App { app_name, .. } => Some(app_name),
            RecordData::Cname { .. } | RecordData::Other { .. } => None,
        }
    }
}

/// Flat `rData` object as the appliance returns it for every type.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RecordDataWire {
    pub ip_address: Option<String>,
    pub name_server: Option<String>,
    pub glue: Option<String>,
    pub cname: Option<String>,
    pub ptr_name: Option<String>,
    pub exchange: Option<String>,
    pub preference: Option<u16>,
    pub text: Option<String>,
    pub split_text: Option<bool>,
    pub protocol: Option<String>,
    pub forwarder: Option<String>,
    pub forwarder_priority: Option<u16>,
    pub dnssec_validation: Option<bool>,
    pub proxy_type: Option<String>,
    pub proxy_address: Option<String>,
    pub proxy_port: Option<u16>,
    pub proxy_username: Option<String>,
    pub proxy_password: Option<String>,
    pub app_name: Option<String>,
    pub class_path: Option<String>,
    pub data: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordWire {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub expiry_ttl: Option<u32>,
    #[serde(rename = "rData", alias = "rdata", default)]
    pub r_data: RecordDataWire,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ZoneRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DnsZoneRecordList {
    #[serde(default)]
    pub zone: ZoneRef,
    #[serde(default)]
    pub records: Vec<RecordWire>,
}
