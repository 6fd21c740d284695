//! Crate entrypoint wiring together configuration, the Technitium API client
//! and the resource adapters built on it.

pub mod config;
pub mod error;
pub mod provider;
pub mod technitium;
pub mod validation;

pub use config::ProviderConfig;
pub use error::{ProviderError, ProviderResult};
pub use provider::{DataSource, Resource, TechnitiumProvider};
pub use technitium::{ClientError, TechnitiumClient};
