mod maps;
mod records;

use clap::{CommandFactory, Parser, Subcommand};
use tenantdesk_core::Coordinate;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tenantdesk")]
#[command(about = "Tenant and vendor administration")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List tenants with an active count
    Tenants,
    /// List the visible vendors of a tenant
    Vendors {
        /// Tenant id
        #[arg(long)]
        tenant: String,
        /// Only show vendors on this domain (case-insensitive)
        #[arg(long)]
        domain: Option<String>,
    },
    /// Create a vendor through the single-flight submit
    CreateVendor(records::CreateVendorArgs),
    /// Edit a tenant's details; unset fields are left unchanged
    EditTenant(records::EditTenantArgs),
    /// Edit a vendor's details; unset fields are left unchanged
    EditVendor(records::EditVendorArgs),
    /// Reverse-geocode a coordinate
    Geocode {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Open a headless map session, move the marker, print the confirmed location
    Pick {
        /// Starting latitude (defaults to the picker's default centre)
        #[arg(long, allow_negative_numbers = true, requires = "lng")]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lng: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        to_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        to_lng: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = tenantdesk_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Some(Commands::Tenants) => records::run_tenants(&config).await?,
        Some(Commands::Vendors { tenant, domain }) => {
            records::run_vendors(&config, &tenant, domain.as_deref()).await?;
        }
        Some(Commands::CreateVendor(args)) => records::run_create_vendor(&config, args).await?,
        Some(Commands::EditTenant(args)) => records::run_edit_tenant(&config, args).await?,
        Some(Commands::EditVendor(args)) => records::run_edit_vendor(&config, args).await?,
        Some(Commands::Geocode { lat, lng }) => {
            maps::run_geocode(&config, Coordinate::new(lat, lng)).await?;
        }
        Some(Commands::Pick {
            lat,
            lng,
            to_lat,
            to_lng,
        }) => {
            let from = match (lat, lng) {
                (Some(lat), Some(lng)) => Coordinate::new(lat, lng),
                _ => Coordinate::DEFAULT,
            };
            maps::run_pick(&config, from, Coordinate::new(to_lat, to_lng)).await?;
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}
