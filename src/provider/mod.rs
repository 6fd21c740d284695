//! Resources and data sources on top of [`TechnitiumClient`].
//!
//! Each adapter owns a clone of the client handed out by
//! [`TechnitiumProvider`]; nothing is shared through globals.
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{Credentials, ProviderConfig};
use crate::error::{ProviderResult, Summarize};
use crate::technitium::TechnitiumClient;

pub mod data_sources;
pub mod dhcp_reserved_lease;
pub mod dhcp_scope;
pub mod dns_zone;
pub mod dns_zone_record;
pub mod lifecycle;

pub use data_sources::{
    DhcpScopeDataSource, DhcpScopesDataSource, DnsZoneDataSource, DnsZoneRecordDataSource,
    DnsZoneRecordsDataSource, DnsZonesDataSource,
};
pub use dhcp_reserved_lease::{DhcpReservedLeaseModel, DhcpReservedLeaseResource};
pub use dhcp_scope::{DhcpScopeModel, DhcpScopeResource};
pub use dns_zone::{DnsZoneModel, DnsZoneResource};
pub use dns_zone_record::{DnsZoneRecordModel, DnsZoneRecordResource};
pub use lifecycle::PlannedAction;

/// A managed entity with a create/read/update/delete lifecycle.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Plan and state share one shape.
    type Model: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    const TYPE_NAME: &'static str;

    /// Attributes whose change in `plan` cannot be applied in place.
    fn replace_triggers(plan: &Self::Model, state: &Self::Model) -> Vec<&'static str>;

    /// Fill computed attributes of `plan` from `state` before comparing them.
    fn normalize_plan(plan: Self::Model, _state: &Self::Model) -> Self::Model {
        plan
    }

    async fn create(&self, plan: &Self::Model) -> ProviderResult<Self::Model>;

    /// `Ok(None)` when the entity is gone from the appliance.
    async fn read(&self, state: &Self::Model) -> ProviderResult<Option<Self::Model>>;

    async fn update(&self, plan: &Self::Model, state: &Self::Model)
    -> ProviderResult<Self::Model>;

    async fn delete(&self, state: &Self::Model) -> ProviderResult<()>;
}

/// Read-only lookup.
#[async_trait]
pub trait DataSource: Send + Sync {
    type Query: DeserializeOwned + Send + Sync;
    type Output: Serialize + Send;

    const TYPE_NAME: &'static str;

    async fn read(&self, query: &Self::Query) -> ProviderResult<Self::Output>;
}

/// Configured entry point handing out resources and data sources.
#[derive(Debug, Clone)]
pub struct TechnitiumProvider {
    client: TechnitiumClient,
}

impl TechnitiumProvider {
    /// Resolve credentials (logging in when no token is configured) and
    /// verify the session.
    pub async fn configure(config: &ProviderConfig) -> ProviderResult<Self> {
        let host = config.host()?;
        let token = match config.credentials()? {
            Credentials::Token(token) => token.to_string(),
            Credentials::Login { username, password } => {
                debug!("Logging in to {host} as {username}");
                TechnitiumClient::login(host, username, password)
                    .await
                    .summarize(|| "Unable to obtain Technitium API token".to_string())?
            }
        };

        let client = TechnitiumClient::connect(host, token)
            .await
            .summarize(|| "Unable to create Technitium API client".to_string())?;
        Ok(Self { client })
    }

    pub fn from_client(client: TechnitiumClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &TechnitiumClient {
        &self.client
    }

    pub fn dhcp_scope(&self) -> DhcpScopeResource {
        DhcpScopeResource::new(self.client.clone())
    }

    pub fn dhcp_reserved_lease(&self) -> DhcpReservedLeaseResource {
        DhcpReservedLeaseResource::new(self.client.clone())
    }

    pub fn dns_zone(&self) -> DnsZoneResource {
        DnsZoneResource::new(self.client.clone())
    }

    pub fn dns_zone_record(&self) -> DnsZoneRecordResource {
        DnsZoneRecordResource::new(self.client.clone())
    }

    pub fn dhcp_scope_data_source(&self) -> DhcpScopeDataSource {
        DhcpScopeDataSource::new(self.client.clone())
    }

    pub fn dhcp_scopes_data_source(&self) -> DhcpScopesDataSource {
        DhcpScopesDataSource::new(self.client.clone())
    }

    pub fn dns_zone_data_source(&self) -> DnsZoneDataSource {
        DnsZoneDataSource::new(self.client.clone())
    }

    pub fn dns_zones_data_source(&self) -> DnsZonesDataSource {
        DnsZonesDataSource::new(self.client.clone())
    }

    pub fn dns_zone_record_data_source(&self) -> DnsZoneRecordDataSource {
        DnsZoneRecordDataSource::new(self.client.clone())
    }

    pub fn dns_zone_records_data_source(&self) -> DnsZoneRecordsDataSource {
        DnsZoneRecordsDataSource::new(self.client.clone())
    }
}

/// Refresh rule for optional attributes: what the prior model left unset
/// stays unset, everything else follows the appliance.
pub(crate) fn tracked<T>(prior: &Option<T>, observed: Option<T>) -> Option<T> {
    prior.as_ref().and(observed)
}

/// Like [`tracked`], but a managed list the appliance omits reads back empty.
pub(crate) fn tracked_list<T>(prior: &Option<Vec<T>>, observed: Option<Vec<T>>) -> Option<Vec<T>> {
    prior.as_ref().map(|_| observed.unwrap_or_default())
}

/// Names of the attributes flagged as changed.
pub(crate) fn changed(attributes: &[(&'static str, bool)]) -> Vec<&'static str> {
    attributes
        .iter()
        .filter(|(_, changed)| *changed)
        .map(|(name, _)| *name)
        .collect()
}
