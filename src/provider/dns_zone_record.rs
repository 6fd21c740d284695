use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult, Summarize};
use crate::provider::{Resource, changed, tracked};
use crate::technitium::{
    AddressData, ClientError, DnsZoneRecord, ForwarderData, ProxySettings, RecordData,
    TechnitiumClient,
};
use crate::validation::{ValidationError, validate_domain_name, validate_ip_address};

/// `technitium_dns_zone_record` plan/state.
///
/// Flat, one optional attribute per type-specific field. Only the fields of
/// `type` are meaningful; [`DnsZoneRecordModel::to_record`] turns them into
/// the typed [`RecordData`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsZoneRecordModel {
    pub domain: String,
    pub zone: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: Option<u32>,
    pub disabled: Option<bool>,
    pub comments: Option<String>,
    pub expiry_ttl: Option<u32>,

    // A, AAAA
    pub ip_address: Option<String>,
    pub ptr: Option<bool>,
    pub create_ptr_zone: Option<bool>,
    pub update_svcb_hints: Option<bool>,
    // NS
    pub name_server: Option<String>,
    pub glue: Option<String>,
    // CNAME
    pub cname: Option<String>,
    // PTR
    pub ptr_name: Option<String>,
    // MX
    pub exchange: Option<String>,
    pub preference: Option<u16>,
    // TXT
    pub text: Option<String>,
    pub split_text: Option<bool>,
    // FWD
    pub protocol: Option<String>,
    pub forwarder: Option<String>,
    pub forwarder_priority: Option<u16>,
    pub dnssec_validation: Option<bool>,
    pub proxy_type: Option<String>,
    pub proxy_address: Option<String>,
    pub proxy_port: Option<u16>,
    pub proxy_username: Option<String>,
    pub proxy_password: Option<String>,
    // APP
    pub app_name: Option<String>,
    pub class_path: Option<String>,
    pub record_data: Option<String>,
}

fn required(
    record_type: &str,
    field: &'static str,
    value: &Option<String>,
) -> Result<String, ValidationError> {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ValidationError::MissingRecordField {
            record_type: record_type.to_string(),
            field,
        })
}

impl DnsZoneRecordModel {
    /// Typed record for the client. Fails when a field the type needs is missing.
    pub fn to_record(&self) -> Result<DnsZoneRecord, ValidationError> {
        validate_domain_name("domain", &self.domain)?;
        validate_domain_name("zone", &self.zone)?;

        let t = self.record_type.to_ascii_uppercase();
        let data = match t.as_str() {
            "A" | "AAAA" => {
                let ip_address = required(&t, "ip_address", &self.ip_address)?;
                validate_ip_address("ip_address", &ip_address)?;
                let address = AddressData {
                    ip_address,
                    ptr: self.ptr,
                    create_ptr_zone: self.create_ptr_zone,
                    update_svcb_hints: self.update_svcb_hints,
                };
                if t == "A" {
                    RecordData::A(address)
                } else {
                    RecordData::Aaaa(address)
                }
            }
            "CNAME" => RecordData::Cname {
                cname: required(&t, "cname", &self.cname)?,
            },
            "NS" => RecordData::Ns {
                name_server: required(&t, "name_server", &self.name_server)?,
                glue: self.glue.clone(),
            },
            "PTR" => RecordData::Ptr {
                ptr_name: required(&t, "ptr_name", &self.ptr_name)?,
            },
            "MX" => RecordData::Mx {
                exchange: required(&t, "exchange", &self.exchange)?,
                preference: self.preference.ok_or(ValidationError::MissingRecordField {
                    record_type: t.clone(),
                    field: "preference",
                })?,
            },
            "TXT" => RecordData::Txt {
                text: required(&t, "text", &self.text)?,
                split_text: self.split_text,
            },
            "FWD" => RecordData::Fwd(ForwarderData {
                protocol: self.protocol.clone(),
                forwarder: required(&t, "forwarder", &self.forwarder)?,
                forwarder_priority: self.forwarder_priority,
                dnssec_validation: self.dnssec_validation,
                proxy: self.proxy_type.clone().map(|proxy_type| ProxySettings {
                    proxy_type,
                    address: self.proxy_address.clone(),
                    port: self.proxy_port,
                    username: self.proxy_username.clone(),
                    password: self.proxy_password.clone(),
                }),
            }),
            "APP" => RecordData::App {
                app_name: required(&t, "app_name", &self.app_name)?,
                class_path: required(&t, "class_path", &self.class_path)?,
                record_data: self.record_data.clone().unwrap_or_default(),
            },
            _ => return Err(ValidationError::UnsupportedRecordType(self.record_type.clone())),
        };

        Ok(DnsZoneRecord {
            domain: self.domain.clone(),
            zone: self.zone.clone(),
            ttl: self.ttl,
            disabled: self.disabled,
            comments: self.comments.clone(),
            expiry_ttl: self.expiry_ttl,
            data,
        })
    }

    /// Apply the refresh rule against `prior`. Request-only flags (`ptr`,
    /// `create_ptr_zone`, `update_svcb_hints`, `proxy_password`) are never
    /// reported and keep their prior value.
    pub fn tracked_by(self, prior: &DnsZoneRecordModel) -> Self {
        let p = prior;
        DnsZoneRecordModel {
            domain: self.domain,
            zone: self.zone,
            record_type: self.record_type,
            ttl: tracked(&p.ttl, self.ttl),
            disabled: tracked(&p.disabled, self.disabled),
            comments: tracked(&p.comments, self.comments),
            expiry_ttl: tracked(&p.expiry_ttl, self.expiry_ttl),
            ip_address: tracked(&p.ip_address, self.ip_address),
            ptr: p.ptr,
            create_ptr_zone: p.create_ptr_zone,
            update_svcb_hints: p.update_svcb_hints,
            name_server: tracked(&p.name_server, self.name_server),
            glue: tracked(&p.glue, self.glue),
            cname: tracked(&p.cname, self.cname),
            ptr_name: tracked(&p.ptr_name, self.ptr_name),
            exchange: tracked(&p.exchange, self.exchange),
            preference: tracked(&p.preference, self.preference),
            text: tracked(&p.text, self.text),
            split_text: tracked(&p.split_text, self.split_text),
            protocol: tracked(&p.protocol, self.protocol),
            forwarder: tracked(&p.forwarder, self.forwarder),
            forwarder_priority: tracked(&p.forwarder_priority, self.forwarder_priority),
            dnssec_validation: tracked(&p.dnssec_validation, self.dnssec_validation),
            proxy_type: tracked(&p.proxy_type, self.proxy_type),
            proxy_address: tracked(&p.proxy_address, self.proxy_address),
            proxy_port: tracked(&p.proxy_port, self.proxy_port),
            proxy_username: tracked(&p.proxy_username, self.proxy_username),
            proxy_password: p.proxy_password.clone(),
            app_name: tracked(&p.app_name, self.app_name),
            class_path: tracked(&p.class_path, self.class_path),
            record_data: tracked(&p.record_data, self.record_data),
        }
    }
}

/// Flatten a typed record. Types this crate does not write keep only the
/// common attributes.
impl From<DnsZoneRecord> for DnsZoneRecordModel {
    fn from(r: DnsZoneRecord) -> Self {
        let mut m = DnsZoneRecordModel {
            domain: r.domain,
            zone: r.zone,
            record_type: r.data.record_type().to_string(),
            ttl: r.ttl,
            disabled: r.disabled,
            comments: r.comments,
            expiry_ttl: r.expiry_ttl,
            ..Default::default()
        };
        match r.data {
            RecordData::A(a) | RecordData::Aaaa(a) => {
                m.ip_address = Some(a.ip_address);
                m.ptr = a.ptr;
                m.create_ptr_zone = a.create_ptr_zone;
                m.update_svcb_hints = a.update_svcb_hints;
            }
            RecordData::Cname { cname } => m.cname = Some(cname),
            RecordData::Ns { name_server, glue } => {
                m.name_server = Some(name_server);
                m.glue = glue;
            }
            RecordData::Ptr { ptr_name } => m.ptr_name = Some(ptr_name),
            RecordData::Mx {
                exchange,
                preference,
            } => {
                m.exchange = Some(exchange);
                m.preference = Some(preference);
            }
            RecordData::Txt { text, split_text } => {
                m.text = Some(text);
                m.split_text = split_text;
            }
            RecordData::Fwd(f) => {
                m.protocol = f.protocol;
                m.forwarder = Some(f.forwarder);
                m.forwarder_priority = f.forwarder_priority;
                m.dnssec_validation = f.dnssec_validation;
                if let Some(proxy) = f.proxy {
                    m.proxy_type = Some(proxy.proxy_type);
                    m.proxy_address = proxy.address;
                    m.proxy_port = proxy.port;
                    m.proxy_username = proxy.username;
                    m.proxy_password = proxy.password;
                }
            }
            RecordData::App {
                app_name,
                class_path,
                record_data,
            } => {
                m.app_name = Some(app_name);
                m.class_path = Some(class_path);
                m.record_data = Some(record_data);
            }
            RecordData::Other { .. } => {}
        }
        m
    }
}

/// `technitium_dns_zone_record`. Domain, zone and type changes replace the
/// record; everything else, the type-specific value included, is updated in
/// place.
#[derive(Debug, Clone)]
pub struct DnsZoneRecordResource {
    client: TechnitiumClient,
}

impl DnsZoneRecordResource {
    pub fn new(client: TechnitiumClient) -> Self {
        Self { client }
    }

    async fn read_back(
        &self,
        record: &DnsZoneRecord,
        prior: &DnsZoneRecordModel,
    ) -> ProviderResult<DnsZoneRecordModel> {
        let found = self
            .client
            .find_dns_zone_record(record)
            .await
            .summarize(|| format!("Could not read DNS zone record {}", record.domain))?;
        match found {
            Some(stored) => Ok(DnsZoneRecordModel::from(stored).tracked_by(prior)),
            None => {
                warn!(
                    "{} record {} not found after write",
                    record.record_type(),
                    record.domain
                );
                Err(ProviderError::not_found(format!(
                    "{} record {} in zone {}",
                    record.record_type(),
                    record.domain,
                    record.zone
                )))
            }
        }
    }
}

#[async_trait]
impl Resource for DnsZoneRecordResource {
    type Model = DnsZoneRecordModel;
    const TYPE_NAME: &'static str = "technitium_dns_zone_record";

    fn replace_triggers(
        plan: &DnsZoneRecordModel,
        state: &DnsZoneRecordModel,
    ) -> Vec<&'static str> {
        changed(&[
            ("domain", plan.domain != state.domain),
            ("zone", plan.zone != state.zone),
            (
                "type",
                !plan.record_type.eq_ignore_ascii_case(&state.record_type),
            ),
        ])
    }

    async fn create(&self, plan: &DnsZoneRecordModel) -> ProviderResult<DnsZoneRecordModel> {
        let record = plan.to_record()?;
        self.client
            .create_dns_zone_record(&record)
            .await
            .summarize(|| format!("Could not create DNS zone record {}", plan.domain))?;
        self.read_back(&record, plan).await
    }

    async fn read(&self, state: &DnsZoneRecordModel) -> ProviderResult<Option<DnsZoneRecordModel>> {
        let record = state.to_record()?;
        match self.client.find_dns_zone_record(&record).await {
            Ok(found) => Ok(found.map(|r| DnsZoneRecordModel::from(r).tracked_by(state))),
            Err(ClientError::Api { message, .. }) => {
                debug!("Dropping record {} from state: {message}", state.domain);
                Ok(None)
            }
            Err(e) => {
                Err(e).summarize(|| format!("Could not read DNS zone record {}", state.domain))
            }
        }
    }

    /// The prior record comes from `state`; only discriminators that differ
    /// are sent as `new<Field>`.
    async fn update(
        &self,
        plan: &DnsZoneRecordModel,
        state: &DnsZoneRecordModel,
    ) -> ProviderResult<DnsZoneRecordModel> {
        let desired = plan.to_record()?;
        let prior = state.to_record()?;
        self.client
            .upsert_dns_zone_record(&desired, Some(&prior))
            .await
            .summarize(|| format!("Could not update DNS zone record {}", plan.domain))?;
        self.read_back(&desired, plan).await
    }

    async fn delete(&self, state: &DnsZoneRecordModel) -> ProviderResult<()> {
        let record = state.to_record()?;
        self.client
            .delete_dns_zone_record(&record)
            .await
            .summarize(|| format!("Could not delete DNS zone record {}", state.domain))
    }
}
