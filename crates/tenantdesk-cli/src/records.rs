//! Record service command handlers for the CLI.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tenantdesk_core::{AppConfig, Coordinate, DraftDefaults};
use tenantdesk_records::{
    active_tenant_count, visible_vendors, ClientOptions, EditResponse, MutationGuard,
    RecordsClient, SubmitError, TenantRef, TenantUpdate, VendorUpdate,
};

#[derive(Debug, Args)]
pub struct CreateVendorArgs {
    /// Owning tenant id; must be listed by the record service
    #[arg(long)]
    pub tenant: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    /// Ten digits starting with 6-9
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    pub lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lng: Option<f64>,
    #[arg(long)]
    pub vendor_address: Option<String>,
    #[arg(long)]
    pub address_name: Option<String>,
}

/// Fields shared by the edit commands. Unset fields keep the stored value.
#[derive(Debug, Args)]
pub struct EditFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditTenantArgs {
    #[arg(long)]
    pub tenant: String,
    #[command(flatten)]
    pub fields: EditFields,
}

#[derive(Debug, Args)]
pub struct EditVendorArgs {
    /// Tenant the vendor belongs to
    #[arg(long)]
    pub tenant: String,
    #[arg(long)]
    pub vendor: String,
    #[command(flatten)]
    pub fields: EditFields,
}

fn apply(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value.trim().to_owned();
    }
}

fn print_edit(kind: &str, id: &str, reply: &EditResponse) {
    match &reply.message {
        Some(message) => println!("{kind} {id} updated: {message}"),
        None => println!("{kind} {id} updated"),
    }
}

pub(crate) fn records_client(config: &AppConfig) -> anyhow::Result<RecordsClient> {
    let options = ClientOptions {
        timeout_secs: config.request_timeout_secs,
        user_agent: config.user_agent.clone(),
        max_retries: config.max_retries,
        retry_backoff_base_ms: config.retry_backoff_base_ms,
    };
    Ok(RecordsClient::with_base_url(
        &config.records_base_url,
        &options,
    )?)
}

pub(crate) async fn run_tenants(config: &AppConfig) -> anyhow::Result<()> {
    let tenants = records_client(config)?.list_tenants().await?;

    for tenant in &tenants {
        println!(
            "{}\t{}\t{}\t{}",
            tenant.tenant_id, tenant.tenant_name, tenant.status, tenant.domain
        );
    }
    println!(
        "{} tenants, {} active",
        tenants.len(),
        active_tenant_count(&tenants)
    );
    Ok(())
}

pub(crate) async fn run_vendors(
    config: &AppConfig,
    tenant_id: &str,
    domain: Option<&str>,
) -> anyhow::Result<()> {
    let vendors = records_client(config)?.list_vendors(tenant_id).await?;
    let visible = visible_vendors(&vendors, domain);

    for vendor in &visible {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            vendor.vendor_id, vendor.vendor_name, vendor.email, vendor.status, vendor.address
        );
    }
    println!("{} of {} vendors shown", visible.len(), vendors.len());
    Ok(())
}

/// Resolves the tenant from the service listing, drafts a vendor from the
/// arguments and submits it once, then waits for the reconciliation fetch
/// and prints the refreshed listing.
///
/// # Errors
///
/// Returns an error carrying the user-facing message when the submit fails.
pub(crate) async fn run_create_vendor(
    config: &AppConfig,
    args: CreateVendorArgs,
) -> anyhow::Result<()> {
    let client = Arc::new(records_client(config)?);
    let tenants = client.list_tenants().await?;
    let tenant = match TenantRef::lookup(&tenants, &args.tenant) {
        Ok(tenant) => tenant,
        Err(e) => {
            let message = SubmitError::from(e)
                .user_message()
                .unwrap_or_else(|| format!("tenant {} not found", args.tenant));
            anyhow::bail!("{message}");
        }
    };
    tracing::debug!(tenant_id = %tenant.tenant_id, status = ?tenant.status, "tenant resolved");
    let defaults = DraftDefaults::for_tenant(args.tenant, args.domain.unwrap_or_default());
    let guard = MutationGuard::new(
        client,
        tenant,
        defaults,
        Duration::from_millis(config.reconcile_delay_ms),
    );

    guard.open();
    guard.update(|draft| {
        draft.name = args.name;
        draft.email = args.email;
        draft.phone = args.phone;
        draft.address = args.address;
        if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
            let location = draft.location_mut();
            location.set_coordinate(Coordinate::new(lat, lng));
            location.vendor_address = args.vendor_address.unwrap_or_default();
            location.address_name = args.address_name.unwrap_or_default();
        }
    });

    let mut listing = guard.subscribe();
    let created = match guard.submit().await {
        Ok(created) => created,
        Err(e) => {
            let message = e.user_message().unwrap_or_else(|| e.to_string());
            anyhow::bail!("{message}");
        }
    };

    println!(
        "created {} for tenant {} at {}",
        created.payload.vendor_name,
        created.payload.tenant_id,
        created.submitted_at.to_rfc3339()
    );
    if let Some(message) = &created.message {
        println!("{message}");
    }

    created.reconciliation.await?;
    if listing.has_changed().unwrap_or(false) {
        let vendors = listing.borrow_and_update().clone();
        let visible = visible_vendors(&vendors, None);
        println!("tenant now has {} vendors:", visible.len());
        for vendor in &visible {
            println!("  {}\t{}", vendor.vendor_id, vendor.vendor_name);
        }
    } else {
        tracing::warn!("vendor listing was not refreshed");
    }
    Ok(())
}

pub(crate) async fn run_edit_tenant(config: &AppConfig, args: EditTenantArgs) -> anyhow::Result<()> {
    let client = records_client(config)?;
    let tenants = client.list_tenants().await?;
    let Some(record) = tenants.iter().find(|t| t.tenant_id == args.tenant) else {
        anyhow::bail!("tenant {} not found", args.tenant);
    };

    let mut update = TenantUpdate::from(record);
    let fields = args.fields;
    apply(&mut update.tenant_name, fields.name);
    apply(&mut update.email, fields.email);
    apply(&mut update.phone_number, fields.phone);
    apply(&mut update.address, fields.address);
    apply(&mut update.domain, fields.domain);
    apply(&mut update.status, fields.status);

    let reply = client.update_tenant(&update).await?;
    print_edit("tenant", &update.tenant_id, &reply);
    Ok(())
}

pub(crate) async fn run_edit_vendor(config: &AppConfig, args: EditVendorArgs) -> anyhow::Result<()> {
    let client = records_client(config)?;
    let vendors = client.list_vendors(&args.tenant).await?;
    let Some(record) = vendors.iter().find(|v| v.vendor_id == args.vendor) else {
        anyhow::bail!("vendor {} not found for tenant {}", args.vendor, args.tenant);
    };

    let mut update = VendorUpdate::from(record);
    let fields = args.fields;
    apply(&mut update.vendor_name, fields.name);
    apply(&mut update.email, fields.email);
    apply(&mut update.phone_number, fields.phone);
    apply(&mut update.address, fields.address);
    apply(&mut update.domain, fields.domain);
    apply(&mut update.status, fields.status);

    let reply = client.update_vendor(&update).await?;
    print_edit("vendor", &update.vendor_id, &reply);
    Ok(())
}
