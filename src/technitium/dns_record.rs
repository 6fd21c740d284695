use serde::de::IgnoredAny;
use tracing::{debug, warn};

use crate::technitium::client::TechnitiumClient;
use crate::technitium::error::ClientError;
use crate::technitium::params::{Params, push_renamed};
use crate::technitium::types::{
    AddressData, DnsZoneRecord, DnsZoneRecordList, ForwarderData, ProxySettings, RecordData,
    RecordWire,
};

/// Appliance message for deleting something that is already gone.
const NO_SUCH_RECORD: &str = "no such record exists";

impl TechnitiumClient {
    /// All records at `domain`. With `zone` set, the lookup is scoped to that zone.
    pub async fn get_dns_zone_records(
        &self,
        domain: &str,
        zone: Option<&str>,
    ) -> Result<Vec<DnsZoneRecord>, ClientError> {
        let mut params = Params::new();
        params
            .push("domain", domain)
            .push_opt("zone", zone)
            .push("listZone", true);

        let list: DnsZoneRecordList = self
            .call_for("/api/zones/records/get", &params)
            .await?;
        let zone_name = list
            .zone
            .name
            .or_else(|| zone.map(str::to_string))
            .unwrap_or_default();
        Ok(list
            .records
            .into_iter()
            .map(|r| record_from_wire(&zone_name, r))
            .collect())
    }

    /// Find the stored record with the same domain, type and discriminator.
    pub async fn find_dns_zone_record(
        &self,
        record: &DnsZoneRecord,
    ) -> Result<Option<DnsZoneRecord>, ClientError> {
        let zone = Some(record.zone.as_str()).filter(|z| !z.is_empty());
        let records = self.get_dns_zone_records(&record.domain, zone).await?;
        Ok(records.into_iter().find(|r| same_record(r, record)))
    }

    /// Add a record. `records/add` cannot create a disabled record, so a
    /// disabled one is added and then updated with `disable=true`.
    pub async fn create_dns_zone_record(&self, record: &DnsZoneRecord) -> Result<(), ClientError> {
        let params = add_record_params(record)?;
        debug!("Adding {} record {}", record.record_type(), record.domain);
        self.call::<IgnoredAny>("/api/zones/records/add", &params)
            .await?;
        if record.disabled == Some(true) {
            debug!("Disabling {} record {}", record.record_type(), record.domain);
            self.update_dns_zone_record(record, None).await?;
        }
        Ok(())
    }

    /// Update `desired` in place. `prior` identifies the stored record when
    /// the domain or a type-specific value changes; without it `desired`
    /// identifies itself.
    pub async fn update_dns_zone_record(
        &self,
        desired: &DnsZoneRecord,
        prior: Option<&DnsZoneRecord>,
    ) -> Result<(), ClientError> {
        let params = update_record_params(prior.unwrap_or(desired), desired)?;
        if let Some(new_domain) = params.get("newDomain") {
            debug!(
                "Renaming {} record {} to {new_domain}",
                desired.record_type(),
                params.get("domain").unwrap_or_default()
            );
        }
        self.call::<IgnoredAny>("/api/zones/records/update", &params)
            .await?;
        Ok(())
    }

    /// Add when there is no prior record, otherwise update from it.
    pub async fn upsert_dns_zone_record(
        &self,
        desired: &DnsZoneRecord,
        prior: Option<&DnsZoneRecord>,
    ) -> Result<(), ClientError> {
        match prior {
            Some(prior) => self.update_dns_zone_record(desired, Some(prior)).await,
            None => self.create_dns_zone_record(desired).await,
        }
    }

    /// Delete a record. A record that no longer exists counts as deleted.
    pub async fn delete_dns_zone_record(&self, record: &DnsZoneRecord) -> Result<(), ClientError> {
        let params = delete_record_params(record);
        match self
            .call::<IgnoredAny>("/api/zones/records/delete", &params)
            .await
        {
            Ok(_) => Ok(()),
            Err(ClientError::Api { message, .. }) if message.contains(NO_SUCH_RECORD) => {
                warn!("record {} already absent: {message}", record.domain);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

/// Records match on domain, type and, where the type has one, discriminator.
pub fn same_record(a: &DnsZoneRecord, b: &DnsZoneRecord) -> bool {
    if !same_name(&a.domain, &b.domain) || !a.record_type().eq_ignore_ascii_case(b.record_type()) {
        return false;
    }
    match (a.data.discriminator(), b.data.discriminator()) {
        (Some(x), Some(y)) => match a.data {
            RecordData::Ns { .. } | RecordData::Ptr { .. } | RecordData::Mx { .. } => {
                same_name(x, y)
            }
            _ => x == y,
        },
        _ => true,
    }
}

fn writable(record: &DnsZoneRecord) -> Result<(), ClientError> {
    match &record.data {
        RecordData::Other { record_type, .. } => Err(ClientError::invalid_request(format!(
            "{record_type} records are read-only"
        ))),
        _ => Ok(()),
    }
}

fn push_common(params: &mut Params, record: &DnsZoneRecord) {
    params
        .push("domain", &record.domain)
        .push("zone", &record.zone)
        .push("type", record.record_type());
}

pub fn add_record_params(record: &DnsZoneRecord) -> Result<Params, ClientError> {
    writable(record)?;
    let mut params = Params::new();
    push_common(&mut params, record);
    params
        .push_opt("ttl", record.ttl)
        .push_opt("comments", record.comments.as_deref())
        .push_opt("expiryTtl", record.expiry_ttl);

    match &record.data {
        RecordData::A(a) | RecordData::Aaaa(a) => {
            params.push("ipAddress", &a.ip_address);
            push_address_flags(&mut params, a);
        }
        RecordData::Cname { cname } => {
            params.push("cname", cname);
        }
        RecordData::Ns { name_server, glue } => {
            params
                .push("nameServer", name_server)
                .push_opt("glue", glue.as_deref());
        }
        RecordData::Ptr { ptr_name } => {
            params.push("ptrName", ptr_name);
        }
        RecordData::Mx {
            exchange,
            preference,
        } => {
            params
                .push("exchange", exchange)
                .push("preference", preference);
        }
        RecordData::Txt { text, split_text } => {
            params.push("text", text).push_opt("splitText", *split_text);
        }
        RecordData::Fwd(f) => {
            params
                .push_opt("protocol", f.protocol.as_deref())
                .push("forwarder", &f.forwarder);
            push_forwarder_settings(&mut params, f);
        }
        RecordData::App {
            app_name,
            class_path,
            record_data,
        } => {
            params
                .push("appName", app_name)
                .push("classPath", class_path)
                .push("recordData", record_data);
        }
        RecordData::Other { .. } => {}
    }
    Ok(params)
}

/// `/api/zones/records/update` parameters: `current` locates the stored
/// record, `desired` supplies the new values. `new<Field>` is only emitted
/// for identifying values that actually change.
pub fn update_record_params(
    current: &DnsZoneRecord,
    desired: &DnsZoneRecord,
) -> Result<Params, ClientError> {
    writable(desired)?;
    if current.record_type() != desired.record_type() {
        return Err(ClientError::invalid_request(format!(
            "cannot change record type from {} to {} in place",
            current.record_type(),
            desired.record_type()
        )));
    }

    let mut params = Params::new();
    push_renamed(&mut params, "domain", "newDomain", &current.domain, &desired.domain);
    params
        .push("zone", &current.zone)
        .push("type", desired.record_type())
        .push_opt("ttl", desired.ttl)
        .push_opt("disable", desired.disabled)
        .push_opt("comments", desired.comments.as_deref())
        .push_opt("expiryTtl", desired.expiry_ttl);

    match (&current.data, &desired.data) {
        (RecordData::A(cur), RecordData::A(new))
        | (RecordData::Aaaa(cur), RecordData::Aaaa(new)) => {
            push_renamed(
                &mut params,
                "ipAddress",
                "newIpAddress",
                &cur.ip_address,
                &new.ip_address,
            );
            push_address_flags(&mut params, new);
        }
        (RecordData::Cname { .. }, RecordData::Cname { cname }) => {
            params.push("cname", cname);
        }
        (
            RecordData::Ns { name_server: cur, .. },
            RecordData::Ns { name_server: new, glue },
        ) => {
            push_renamed(&mut params, "nameServer", "newNameServer", cur, new);
            params.push_opt("glue", glue.as_deref());
        }
        (RecordData::Ptr { ptr_name: cur }, RecordData::Ptr { ptr_name: new }) => {
            push_renamed(&mut params, "ptrName", "newPtrName", cur, new);
        }
        (
            RecordData::Mx { exchange: cur_exchange, preference: cur_preference },
            RecordData::Mx { exchange, preference },
        ) => {
            push_renamed(&mut params, "preference", "newPreference", cur_preference, preference);
            push_renamed(&mut params, "exchange", "newExchange", cur_exchange, exchange);
        }
        (
            RecordData::Txt { text: cur_text, split_text: cur_split },
            RecordData::Txt { text, split_text },
        ) => {
            push_renamed(&mut params, "text", "newText", cur_text, text);
            if let (Some(cur_split), Some(split)) = (cur_split, split_text) {
                push_renamed(&mut params, "splitText", "newSplitText", cur_split, split);
            } else {
                params.push_opt("splitText", *split_text);
            }
        }
        (RecordData::Fwd(cur), RecordData::Fwd(new)) => {
            match (&cur.protocol, &new.protocol) {
                (Some(cur_protocol), Some(protocol)) => {
                    push_renamed(&mut params, "protocol", "newProtocol", cur_protocol, protocol)
                }
                (_, protocol) => {
                    params.push_opt("protocol", protocol.as_deref());
                }
            }
            push_renamed(&mut params, "forwarder", "newForwarder", &cur.forwarder, &new.forwarder);
            push_forwarder_settings(&mut params, new);
        }
        (RecordData::App { .. }, RecordData::App { app_name, class_path, record_data }) => {
            params
                .push("appName", app_name)
                .push("classPath", class_path)
                .push("recordData", record_data);
        }
        _ => {
            return Err(ClientError::invalid_request(format!(
                "unsupported update for {} record",
                desired.record_type()
            )));
        }
    }
    Ok(params)
}

/// Parameters identifying exactly one record for `/api/zones/records/delete`.
pub fn delete_record_params(record: &DnsZoneRecord) -> Params {
    let mut params = Params::new();
    push_common(&mut params, record);
    match &record.data {
        RecordData::A(a) | RecordData::Aaaa(a) => {
            params.push("ipAddress", &a.ip_address);
        }
        RecordData::Ns { name_server, .. } => {
            params.push("nameServer", name_server);
        }
        RecordData::Ptr { ptr_name } => {
            params.push("ptrName", ptr_name);
        }
        RecordData::Mx {
            exchange,
            preference,
        } => {
            params
                .push("preference", preference)
                .push("exchange", exchange);
        }
        RecordData::Txt { text, split_text } => {
            params.push("text", text).push_opt("splitText", *split_text);
        }
        RecordData::Fwd(f) => {
            params
                .push_opt("protocol", f.protocol.as_deref())
                .push("forwarder", &f.forwarder);
        }
        RecordData::Cname { .. } | RecordData::App { .. } | RecordData::Other { .. } => {}
    }
    params
}

fn push_address_flags(params: &mut Params, a: &AddressData) {
    params
        .push_opt("ptr", a.ptr)
        .push_opt("createPtrZone", a.create_ptr_zone)
        .push_opt("updateSvcbHints", a.update_svcb_hints);
}

fn push_forwarder_settings(params: &mut Params, f: &ForwarderData) {
    params
        .push_opt("forwarderPriority", f.forwarder_priority)
        .push_opt("dnssecValidation", f.dnssec_validation);
    if let Some(proxy) = &f.proxy {
        params
            .push("proxyType", &proxy.proxy_type)
            .push_opt("proxyAddress", proxy.address.as_deref())
            .push_opt("proxyPort", proxy.port)
            .push_opt("proxyUsername", proxy.username.as_deref())
            .push_opt("proxyPassword", proxy.password.as_deref());
    }
}

/// Turn the appliance's flat `rData` into the typed variant for `record_type`.
pub(crate) fn record_from_wire(zone: &str, wire: RecordWire) -> DnsZoneRecord {
    let r = wire.r_data;
    let data = match wire.record_type.to_ascii_uppercase().as_str() {
        "A" | "AAAA" => {
            let address = AddressData {
                ip_address: r.ip_address.unwrap_or_default(),
                ..Default::default()
            };
            if wire.record_type.eq_ignore_ascii_case("A") {
                RecordData::A(address)
            } else {
                RecordData::Aaaa(address)
            }
        }
        "CNAME" => RecordData::Cname {
            cname: r.cname.unwrap_or_default(),
        },
        "NS" => RecordData::Ns {
            name_server: r.name_server.unwrap_or_default(),
            glue: r.glue,
        },
        "PTR" => RecordData::Ptr {
            ptr_name: r.ptr_name.unwrap_or_default(),
        },
        "MX" => RecordData::Mx {
            exchange: r.exchange.unwrap_or_default(),
            preference: r.preference.unwrap_or_default(),
        },
        "TXT" => RecordData::Txt {
            text: r.text.unwrap_or_default(),
            split_text: r.split_text,
        },
        "FWD" => RecordData::Fwd(ForwarderData {
            protocol: r.protocol,
            forwarder: r.forwarder.unwrap_or_default(),
            forwarder_priority: r.forwarder_priority,
            dnssec_validation: r.dnssec_validation,
            proxy: r.proxy_type.map(|proxy_type| ProxySettings {
                proxy_type,
                address: r.proxy_address,
                port: r.proxy_port,
                username: r.proxy_username,
                password: r.proxy_password,
            }),
        }),
        "APP" => RecordData::App {
            app_name: r.app_name.unwrap_or_default(),
            class_path: r.class_path.unwrap_or_default(),
            record_data: r.data.unwrap_or_default(),
        },
        _ => RecordData::Other {
            record_type: wire.record_type.clone(),
            rdata: r.rest,
        },
    };

    DnsZoneRecord {
        domain: wire.name,
        zone: zone.to_string(),
        ttl: wire.ttl,
        disabled: Some(wire.disabled),
        comments: wire.comments.filter(|c| !c.is_empty()),
        expiry_ttl: wire.expiry_ttl,
        data,
    }
}
