use serde::de::IgnoredAny;

use crate::technitium::client::TechnitiumClient;
use crate::technitium::error::ClientError;
use crate::technitium::params::Params;
use crate::technitium::types::{DhcpReservedLease, ReservedLease};

impl TechnitiumClient {
    pub async fn add_reserved_lease(&self, lease: &DhcpReservedLease) -> Result<(), ClientError> {
        let mut params = Params::new();
        params
            .push("name", &lease.scope_name)
            .push("hardwareAddress", &lease.hardware_address)
            .push("ipAddress", &lease.ip_address)
            .push_opt("hostName", lease.host_name.as_deref())
            .push_opt("comments", lease.comments.as_deref());

        self.call::<IgnoredAny>("/api/dhcp/scopes/addReservedLease", &params)
            .await?;
        Ok(())
    }

    pub async fn remove_reserved_lease(
        &self,
        scope_name: &str,
        hardware_address: &str,
    ) -> Result<(), ClientError> {
        let mut params = Params::new();
        params
            .push("name", scope_name)
            .push("hardwareAddress", hardware_address);

        self.call::<IgnoredAny>("/api/dhcp/scopes/removeReservedLease", &params)
            .await?;
        Ok(())
    }

    /// Look a reservation up inside its scope. `Ok(None)` if the scope has no
    /// reservation for that hardware address.
    pub async fn get_reserved_lease(
        &self,
        scope_name: &str,
        hardware_address: &str,
    ) -> Result<Option<DhcpReservedLease>, ClientError> {
        let scope = self.get_scope(scope_name).await?;
        Ok(scope
            .reserved_leases
            .unwrap_or_default()
            .into_iter()
            .find(|l| same_hardware_address(&l.hardware_address, hardware_address))
            .map(|l| from_embedded(scope_name, l)))
    }
}

fn from_embedded(scope_name: &str, lease: ReservedLease) -> DhcpReservedLease {
    DhcpReservedLease {
        scope_name: scope_name.to_string(),
        hardware_address: lease.hardware_address,
        ip_address: lease.address,
        host_name: lease.host_name,
        comments: lease.comments,
    }
}

/// MAC addresses compare equal regardless of separator style and case.
pub fn same_hardware_address(a: &str, b: &str) -> bool {
    let canonical = |s: &str| {
        s.chars()
            .filter(|c| c.is_ascii_hexdigit())
            .map(|c| c.to_ascii_uppercase())
            .collect::<String>()
    };
    canonical(a) == canonical(b)
}
