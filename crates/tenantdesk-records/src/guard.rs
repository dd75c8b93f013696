//! Vendor creation form with a single-flight submit.
//!
//! [`MutationGuard`] owns the draft being composed for one tenant and makes
//! sure at most one create call is in flight. A second `submit` while the
//! first is pending is rejected without side effects. The submission lock is
//! released by a drop guard, so every exit path (including a cancelled
//! `submit` future) returns it to `Idle`.
//!
//! After a successful create the guard schedules exactly one delayed
//! re-fetch of the tenant's vendors and publishes the result on a watch
//! channel that listings subscribe to.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tenantdesk_core::{
    validate_draft, DraftDefaults, TenantRecord, TenantStatus, ValidationError, VendorDraft,
    VendorRecord,
};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::RecordsClient;
use crate::error::RecordsError;
use crate::types::VendorPayload;

const GENERIC_FAILURE: &str = "Failed to create vendor. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionLock {
    Idle,
    Submitting,
}

/// The tenant a form creates vendors for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantRef {
    pub tenant_id: String,
    pub status: TenantStatus,
}

impl TenantRef {
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, status: TenantStatus) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            status,
        }
    }
}

impl TenantRef {
    /// Finds `tenant_id` in a tenant listing from the record service.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::MissingTenant`] when no record has that
    /// id. An inactive tenant is returned as-is and refused at submit time.
    pub fn lookup(tenants: &[TenantRecord], tenant_id: &str) -> Result<Self, PreconditionError> {
        tenants
            .iter()
            .find(|t| t.tenant_id == tenant_id)
            .map(Self::from)
            .ok_or(PreconditionError::MissingTenant)
    }
}

impl From<&TenantRecord> for TenantRef {
    fn from(record: &TenantRecord) -> Self {
        Self::new(record.tenant_id.clone(), record.status())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("no valid tenant selected")]
    MissingTenant,

    #[error("tenant {tenant_id} is inactive")]
    InactiveTenant { tenant_id: String },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("vendor creation failed: {message}")]
    Transport { code: Option<u16>, message: String },

    /// Another submit was already in flight. Never shown to users.
    #[error("a vendor submission is already in progress")]
    IdempotencyRejection,
}

impl SubmitError {
    /// Text for the person filling in the form. `None` for rejections,
    /// which stay silent.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            SubmitError::Validation(_) => {
                Some("Please fill in all required fields with valid data".to_owned())
            }
            SubmitError::Precondition(PreconditionError::MissingTenant) => Some(
                "No valid tenant selected. Please go back and select a tenant.".to_owned(),
            ),
            SubmitError::Precondition(PreconditionError::InactiveTenant { .. }) => Some(
                "Cannot add vendors to an inactive tenant. Please activate the tenant first."
                    .to_owned(),
            ),
            SubmitError::Transport { message, .. } => Some(message.clone()),
            SubmitError::IdempotencyRejection => None,
        }
    }
}

impl From<RecordsError> for SubmitError {
    fn from(err: RecordsError) -> Self {
        let code = err.status_code();
        let message = match &err {
            RecordsError::Http(e) => match e.status() {
                Some(status) => format!("HTTP error! status: {}", status.as_u16()),
                None => GENERIC_FAILURE.to_owned(),
            },
            RecordsError::Api { message, .. } => format!("API error: {message}"),
            RecordsError::Deserialize { .. } | RecordsError::InvalidBaseUrl { .. } => {
                GENERIC_FAILURE.to_owned()
            }
        };
        SubmitError::Transport { code, message }
    }
}

/// A successful create.
#[derive(Debug)]
pub struct CreatedVendor {
    pub payload: VendorPayload,
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
    /// The scheduled re-fetch; resolves once the listing has been published
    /// (or the fetch failed and was logged).
    pub reconciliation: JoinHandle<()>,
}

struct FormState {
    draft: VendorDraft,
    open: bool,
}

pub struct MutationGuard {
    client: Arc<RecordsClient>,
    tenant: TenantRef,
    defaults: DraftDefaults,
    form: Mutex<FormState>,
    lock: Mutex<SubmissionLock>,
    reconcile_delay: Duration,
    rejections: AtomicUsize,
    reconciliations: AtomicUsize,
    listing: Arc<watch::Sender<Vec<VendorRecord>>>,
}

impl MutationGuard {
    #[must_use]
    pub fn new(
        client: Arc<RecordsClient>,
        tenant: TenantRef,
        defaults: DraftDefaults,
        reconcile_delay: Duration,
    ) -> Self {
        let (listing, _rx) = watch::channel(Vec::new());
        Self {
            client,
            form: Mutex::new(FormState {
                draft: VendorDraft::new(&defaults),
                open: false,
            }),
            tenant,
            defaults,
            lock: Mutex::new(SubmissionLock::Idle),
            reconcile_delay,
            rejections: AtomicUsize::new(0),
            reconciliations: AtomicUsize::new(0),
            listing: Arc::new(listing),
        }
    }

    /// Opens the form with a fresh draft.
    pub fn open(&self) {
        let mut form = self.form();
        form.draft = VendorDraft::new(&self.defaults);
        form.open = true;
    }

    /// Discards the draft and closes the form.
    pub fn cancel(&self) {
        let mut form = self.form();
        form.draft = VendorDraft::new(&self.defaults);
        form.open = false;
    }

    /// Edits the draft in place.
    pub fn update<F>(&self, edit: F)
    where
        F: FnOnce(&mut VendorDraft),
    {
        edit(&mut self.form().draft);
    }

    #[must_use]
    pub fn draft(&self) -> VendorDraft {
        self.form().draft.clone()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.form().open
    }

    #[must_use]
    pub fn state(&self) -> SubmissionLock {
        *self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn tenant(&self) -> &TenantRef {
        &self.tenant
    }

    /// Submits rejected because another was in flight.
    #[must_use]
    pub fn rejections(&self) -> usize {
        self.rejections.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn reconciliations_scheduled(&self) -> usize {
        self.reconciliations.load(Ordering::SeqCst)
    }

    /// Receives every reconciled vendor listing.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<VendorRecord>> {
        self.listing.subscribe()
    }

    /// Validates and creates the drafted vendor.
    ///
    /// On success the draft is reset, the form closed, and one delayed
    /// reconciliation scheduled. On any failure the draft is left untouched.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::IdempotencyRejection`] if a submit is already in
    ///   flight; nothing else happens.
    /// - [`SubmitError::Validation`] for the first failing field rule.
    /// - [`SubmitError::Precondition`] when the tenant is missing or inactive.
    /// - [`SubmitError::Transport`] when the create call fails or the service
    ///   reports a non-200 `statusCode`.
    pub async fn submit(&self) -> Result<CreatedVendor, SubmitError> {
        let Some(_held) = SubmissionPermit::acquire(&self.lock) else {
            let total = self.rejections.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::debug!(
                tenant_id = %self.tenant.tenant_id,
                rejections = total,
                "submit ignored; another submission is in flight"
            );
            return Err(SubmitError::IdempotencyRejection);
        };

        let draft = self.draft();
        if let Err(e) = validate_draft(&draft) {
            tracing::debug!(field = e.field(), error = %e, "vendor draft rejected");
            return Err(e.into());
        }
        self.check_tenant()?;

        let payload = VendorPayload::from_draft(&draft, &self.tenant.tenant_id);
        let response = self.client.create_vendor(&payload).await.map_err(|e| {
            tracing::warn!(
                tenant_id = %self.tenant.tenant_id,
                error = %e,
                "vendor creation failed"
            );
            SubmitError::from(e)
        })?;

        tracing::info!(
            tenant_id = %self.tenant.tenant_id,
            vendor_name = %payload.vendor_name,
            "vendor created"
        );
        self.cancel();
        let reconciliation = self.schedule_reconciliation();

        Ok(CreatedVendor {
            payload,
            message: response.message,
            submitted_at: Utc::now(),
            reconciliation,
        })
    }

    fn check_tenant(&self) -> Result<(), PreconditionError> {
        if self.tenant.tenant_id.trim().is_empty() {
            return Err(PreconditionError::MissingTenant);
        }
        if !self.tenant.status.accepts_vendors() {
            return Err(PreconditionError::InactiveTenant {
                tenant_id: self.tenant.tenant_id.clone(),
            });
        }
        Ok(())
    }

    fn schedule_reconciliation(&self) -> JoinHandle<()> {
        self.reconciliations.fetch_add(1, Ordering::SeqCst);
        let client = Arc::clone(&self.client);
        let listing = Arc::clone(&self.listing);
        let tenant_id = self.tenant.tenant_id.clone();
        let delay = self.reconcile_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match client.list_vendors(&tenant_id).await {
                Ok(vendors) => {
                    tracing::info!(
                        tenant_id = %tenant_id,
                        count = vendors.len(),
                        "vendor listing reconciled"
                    );
                    listing.send_replace(vendors);
                }
                Err(e) => {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        error = %e,
                        "vendor listing reconciliation failed"
                    );
                }
            }
        })
    }

    fn form(&self) -> MutexGuard<'_, FormState> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the lock in `Submitting` and puts it back to `Idle` on drop.
struct SubmissionPermit<'a> {
    lock: &'a Mutex<SubmissionLock>,
}

impl<'a> SubmissionPermit<'a> {
    fn acquire(lock: &'a Mutex<SubmissionLock>) -> Option<Self> {
        let mut state = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == SubmissionLock::Submitting {
            return None;
        }
        *state = SubmissionLock::Submitting;
        Some(Self { lock })
    }
}

impl Drop for SubmissionPermit<'_> {
    fn drop(&mut self) {
        *self.lock.lock().unwrap_or_else(PoisonError::into_inner) = SubmissionLock::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientOptions;

    fn offline_guard(tenant: TenantRef) -> MutationGuard {
        let client = RecordsClient::with_base_url("http://127.0.0.1:1", &ClientOptions::default())
            .expect("client construction should not fail");
        MutationGuard::new(
            Arc::new(client),
            tenant,
            DraftDefaults::for_tenant("t-1", "shop.example"),
            Duration::from_millis(10),
        )
    }

    #[test]
    fn permit_releases_on_drop() {
        let lock = Mutex::new(SubmissionLock::Idle);
        let permit = SubmissionPermit::acquire(&lock).expect("idle lock");
        assert_eq!(*lock.lock().unwrap(), SubmissionLock::Submitting);
        assert!(SubmissionPermit::acquire(&lock).is_none());
        drop(permit);
        assert_eq!(*lock.lock().unwrap(), SubmissionLock::Idle);
    }

    #[test]
    fn open_cancel_and_update_manage_the_draft() {
        let guard = offline_guard(TenantRef::new("t-1", TenantStatus::Active));
        assert!(!guard.is_open());

        guard.open();
        guard.update(|d| d.name = "Corner Store".to_owned());
        assert!(guard.is_open());
        assert_eq!(guard.draft().name, "Corner Store");

        guard.cancel();
        assert!(!guard.is_open());
        assert!(guard.draft().name.is_empty());
        assert_eq!(guard.draft().tenant_id, "t-1");
    }

    #[tokio::test]
    async fn validation_failure_keeps_draft_and_releases_lock() {
        let guard = offline_guard(TenantRef::new("t-1", TenantStatus::Active));
        guard.update(|d| {
            d.name = "Corner Store".to_owned();
            d.email = "not-an-email".to_owned();
            d.phone = "9123456789".to_owned();
            d.address = "1 Main Rd".to_owned();
        });

        let err = guard.submit().await.unwrap_err();

        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::InvalidEmail)
        ));
        assert_eq!(guard.state(), SubmissionLock::Idle);
        assert_eq!(guard.draft().email, "not-an-email");
        assert_eq!(guard.reconciliations_scheduled(), 0);
    }

    #[test]
    fn user_messages() {
        assert_eq!(SubmitError::IdempotencyRejection.user_message(), None);
        assert_eq!(
            SubmitError::from(PreconditionError::InactiveTenant {
                tenant_id: "t-1".to_owned()
            })
            .user_message()
            .as_deref(),
            Some("Cannot add vendors to an inactive tenant. Please activate the tenant first.")
        );
        let api = SubmitError::from(RecordsError::Api {
            status_code: 409,
            message: "duplicate email".to_owned(),
        });
        assert!(matches!(api, SubmitError::Transport { code: Some(409), .. }));
        assert_eq!(api.user_message().as_deref(), Some("API error: duplicate email"));
    }

    #[test]
    fn lookup_finds_tenant_by_id() {
        let tenants = vec![
            TenantRecord {
                tenant_id: "t-1".to_owned(),
                status: "active".to_owned(),
                ..TenantRecord::default()
            },
            TenantRecord {
                tenant_id: "t-2".to_owned(),
                status: "inactive".to_owned(),
                ..TenantRecord::default()
            },
        ];

        let tenant = TenantRef::lookup(&tenants, "t-2").expect("tenant listed");
        assert_eq!(tenant, TenantRef::new("t-2", TenantStatus::Inactive));
        assert_eq!(
            TenantRef::lookup(&tenants, "t-9"),
            Err(PreconditionError::MissingTenant)
        );
    }

    #[test]
    fn tenant_ref_reads_record_status() {
        let record = TenantRecord {
            tenant_id: "t-7".to_owned(),
            status: "Inactive".to_owned(),
            ..TenantRecord::default()
        };
        let tenant = TenantRef::from(&record);
        assert_eq!(tenant.status, TenantStatus::Inactive);
    }
}
