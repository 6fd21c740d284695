use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderResult, Summarize};
use crate::provider::{Resource, changed, tracked};
use crate::technitium::{DhcpReservedLease, TechnitiumClient};
use crate::validation::{validate_hardware_address, validate_ip_address, validate_required};

/// `technitium_dhcp_reserved_lease` plan/state. `name` is the scope name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpReservedLeaseModel {
    pub name: String,
    pub hardware_address: String,
    pub ip_address: String,
    pub host_name: Option<String>,
    pub comments: Option<String>,
}

impl From<&DhcpReservedLeaseModel> for DhcpReservedLease {
    fn from(m: &DhcpReservedLeaseModel) -> Self {
        DhcpReservedLease {
            scope_name: m.name.clone(),
            hardware_address: m.hardware_address.clone(),
            ip_address: m.ip_address.clone(),
            host_name: m.host_name.clone(),
            comments: m.comments.clone(),
        }
    }
}

impl DhcpReservedLeaseModel {
    fn refreshed(lease: DhcpReservedLease, prior: &DhcpReservedLeaseModel) -> Self {
        DhcpReservedLeaseModel {
            name: lease.scope_name,
            // keep the notation the user wrote; the appliance normalizes it
            hardware_address: prior.hardware_address.clone(),
            ip_address: lease.ip_address,
            host_name: tracked(&prior.host_name, lease.host_name),
            comments: tracked(&prior.comments, lease.comments),
        }
    }

    pub fn validate(&self) -> ProviderResult<()> {
        validate_required("name", &self.name)?;
        validate_hardware_address(&self.hardware_address)?;
        validate_ip_address("ip_address", &self.ip_address)?;
        Ok(())
    }
}

/// `technitium_dhcp_reserved_lease`. The appliance has no in-place update,
/// so every attribute forces replacement.
#[derive(Debug, Clone)]
pub struct DhcpReservedLeaseResource {
    client: TechnitiumClient,
}

impl DhcpReservedLeaseResource {
    pub fn new(client: TechnitiumClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for DhcpReservedLeaseResource {
    type Model = DhcpReservedLeaseModel;
    const TYPE_NAME: &'static str = "technitium_dhcp_reserved_lease";

    fn replace_triggers(
        plan: &DhcpReservedLeaseModel,
        state: &DhcpReservedLeaseModel,
    ) -> Vec<&'static str> {
        changed(&[
            ("name", plan.name != state.name),
            ("hardware_address", plan.hardware_address != state.hardware_address),
            ("ip_address", plan.ip_address != state.ip_address),
            ("host_name", plan.host_name != state.host_name),
            ("comments", plan.comments != state.comments),
        ])
    }

    async fn create(
        &self,
        plan: &DhcpReservedLeaseModel,
    ) -> ProviderResult<DhcpReservedLeaseModel> {
        plan.validate()?;
        self.client
            .add_reserved_lease(&DhcpReservedLease::from(plan))
            .await
            .summarize(|| {
                format!(
                    "Could not create DHCP reserved lease {} in scope {}",
                    plan.hardware_address, plan.name
                )
            })?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        state: &DhcpReservedLeaseModel,
    ) -> ProviderResult<Option<DhcpReservedLeaseModel>> {
        let scopes = self
            .client
            .list_scopes()
            .await
            .summarize(|| "Could not list DHCP scopes".to_string())?;
        if !scopes.iter().any(|s| s.name == state.name) {
            debug!("DHCP scope {} no longer exists", state.name);
            return Ok(None);
        }

        let lease = self
            .client
            .get_reserved_lease(&state.name, &state.hardware_address)
            .await
            .summarize(|| {
                format!(
                    "Could not read DHCP reserved lease {} in scope {}",
                    state.hardware_address, state.name
                )
            })?;
        Ok(lease.map(|l| DhcpReservedLeaseModel::refreshed(l, state)))
    }

    /// Delete the old reservation, then add the new one.
    async fn update(
        &self,
        plan: &DhcpReservedLeaseModel,
        state: &DhcpReservedLeaseModel,
    ) -> ProviderResult<DhcpReservedLeaseModel> {
        plan.validate()?;
        self.delete(state).await?;
        self.create(plan).await
    }

    async fn delete(&self, state: &DhcpReservedLeaseModel) -> ProviderResult<()> {
        self.client
            .remove_reserved_lease(&state.name, &state.hardware_address)
            .await
            .summarize(|| {
                format!(
                    "Could not delete DHCP reserved lease {} in scope {}",
                    state.hardware_address, state.name
                )
            })
    }
}
