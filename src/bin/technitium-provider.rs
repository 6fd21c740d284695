use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Serialize, de::DeserializeOwned};
use technitium_provider::{
    DataSource, ProviderConfig, Resource, TechnitiumProvider,
    provider::{
        DhcpReservedLeaseResource, DhcpScopeResource, DnsZoneRecordResource, DnsZoneResource,
        lifecycle,
    },
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// Technitium server URL (defaults to $TECHNITIUM_HOST)
    #[arg(long, global = true, value_name = "URL")]
    host: Option<String>,
    /// API token (defaults to $TECHNITIUM_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,
    /// Login user when no token is given (defaults to $TECHNITIUM_USERNAME)
    #[arg(long, global = true, value_name = "USER")]
    username: Option<String>,
    /// Login password (defaults to $TECHNITIUM_PASSWORD)
    #[arg(long, global = true, value_name = "PASSWORD")]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the action apply would take, without contacting the server
    Plan {
        kind: ResourceKind,
        #[command(flatten)]
        documents: Documents,
    },
    /// Reconcile the stored state with the plan and print the new state
    Apply {
        kind: ResourceKind,
        #[command(flatten)]
        documents: Documents,
    },
    /// Refresh the stored state from the server
    Read {
        kind: ResourceKind,
        #[command(flatten)]
        documents: Documents,
    },
    /// Delete the resource described by the stored state
    Destroy {
        kind: ResourceKind,
        #[command(flatten)]
        documents: Documents,
    },
    /// Look something up through a data source
    Query {
        source: DataSourceKind,
        /// Query arguments as a JSON object, e.g. '{"name":"LAN"}'
        #[arg(long, value_name = "JSON", default_value = "{}")]
        args: String,
    },
}

#[derive(Args, Debug)]
struct Documents {
    /// JSON file with the desired attributes (omit to destroy)
    #[arg(long, value_name = "FILE")]
    plan: Option<PathBuf>,
    /// JSON file with the stored state (omit if nothing exists yet)
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResourceKind {
    DhcpScope,
    DhcpReservedLease,
    DnsZone,
    DnsZoneRecord,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DataSourceKind {
    DhcpScope,
    DhcpScopes,
    DnsZone,
    DnsZones,
    DnsZoneRecord,
    DnsZoneRecords,
}

#[derive(Clone, Copy, Debug)]
enum Operation {
    Apply,
    Read,
    Destroy,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = match &cli.command {
        Command::Plan { kind, documents } => match kind {
            ResourceKind::DhcpScope => plan::<DhcpScopeResource>(documents)?,
            ResourceKind::DhcpReservedLease => plan::<DhcpReservedLeaseResource>(documents)?,
            ResourceKind::DnsZone => plan::<DnsZoneResource>(documents)?,
            ResourceKind::DnsZoneRecord => plan::<DnsZoneRecordResource>(documents)?,
        },
        Command::Apply { kind, documents } => {
            run(&connect(&cli).await?, *kind, Operation::Apply, documents).await?
        }
        Command::Read { kind, documents } => {
            run(&connect(&cli).await?, *kind, Operation::Read, documents).await?
        }
        Command::Destroy { kind, documents } => {
            run(&connect(&cli).await?, *kind, Operation::Destroy, documents).await?
        }
        Command::Query { source, args } => query(&connect(&cli).await?, *source, args).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn connect(cli: &Cli) -> Result<TechnitiumProvider> {
    let config = ProviderConfig::from_env().with_overrides(ProviderConfig {
        host: cli.host.clone(),
        token: cli.token.clone(),
        username: cli.username.clone(),
        password: cli.password.clone(),
    });
    let provider = TechnitiumProvider::configure(&config)
        .await
        .context("failed to configure provider")?;
    info!("connected to {}", provider.client().base_url());
    Ok(provider)
}

fn plan<R: Resource>(documents: &Documents) -> Result<serde_json::Value> {
    let plan: Option<R::Model> = load(documents.plan.as_deref())?;
    let state: Option<R::Model> = load(documents.state.as_deref())?;
    let action = lifecycle::decide::<R>(plan.as_ref(), state.as_ref());
    Ok(serde_json::to_value(action)?)
}

async fn run(
    provider: &TechnitiumProvider,
    kind: ResourceKind,
    operation: Operation,
    documents: &Documents,
) -> Result<serde_json::Value> {
    match kind {
        ResourceKind::DhcpScope => drive(&provider.dhcp_scope(), operation, documents).await,
        ResourceKind::DhcpReservedLease => {
            drive(&provider.dhcp_reserved_lease(), operation, documents).await
        }
        ResourceKind::DnsZone => drive(&provider.dns_zone(), operation, documents).await,
        ResourceKind::DnsZoneRecord => {
            drive(&provider.dns_zone_record(), operation, documents).await
        }
    }
}

async fn drive<R: Resource>(
    resource: &R,
    operation: Operation,
    documents: &Documents,
) -> Result<serde_json::Value> {
    let plan: Option<R::Model> = load(documents.plan.as_deref())?;
    let state: Option<R::Model> = load(documents.state.as_deref())?;

    let new_state = match operation {
        Operation::Apply => lifecycle::apply(resource, plan.as_ref(), state.as_ref()).await,
        Operation::Read => {
            let Some(state) = state else {
                bail!("read needs --state");
            };
            lifecycle::refresh(resource, &state).await
        }
        Operation::Destroy => {
            if state.is_none() {
                bail!("destroy needs --state");
            }
            lifecycle::apply(resource, None, state.as_ref()).await
        }
    }
    .with_context(|| format!("{} {operation:?} failed", R::TYPE_NAME))?;

    to_json(&new_state)
}

async fn query(
    provider: &TechnitiumProvider,
    source: DataSourceKind,
    args: &str,
) -> Result<serde_json::Value> {
    match source {
        DataSourceKind::DhcpScope => lookup(&provider.dhcp_scope_data_source(), args).await,
        DataSourceKind::DhcpScopes => lookup(&provider.dhcp_scopes_data_source(), args).await,
        DataSourceKind::DnsZone => lookup(&provider.dns_zone_data_source(), args).await,
        DataSourceKind::DnsZones => lookup(&provider.dns_zones_data_source(), args).await,
        DataSourceKind::DnsZoneRecord => {
            lookup(&provider.dns_zone_record_data_source(), args).await
        }
        DataSourceKind::DnsZoneRecords => {
            lookup(&provider.dns_zone_records_data_source(), args).await
        }
    }
}

async fn lookup<D: DataSource>(source: &D, args: &str) -> Result<serde_json::Value> {
    let query: D::Query = serde_json::from_str(args)
        .with_context(|| format!("invalid arguments for {}: {args}", D::TYPE_NAME))?;
    let output = source
        .read(&query)
        .await
        .with_context(|| format!("{} lookup failed", D::TYPE_NAME))?;
    to_json(&output)
}

/// Read a JSON document; a missing path or a literal `null` means absent.
fn load<T: DeserializeOwned>(path: Option<&Path>) -> Result<Option<T>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Option<T> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(value)
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).context("failed to serialize output")
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
