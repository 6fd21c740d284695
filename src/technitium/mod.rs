//! Typed client for the Technitium DNS Server HTTP API.
pub mod client;
pub mod dhcp_lease;
pub mod dhcp_scope;
pub mod dns_record;
pub mod dns_zone;
pub mod error;
pub mod params;
pub mod types;

pub use client::TechnitiumClient;
pub use error::ClientError;
pub use types::*;
