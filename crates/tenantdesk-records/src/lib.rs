//! Client and single-flight vendor creation for the tenant/vendor record
//! service.

pub mod client;
pub mod error;
pub mod guard;
pub mod listing;
pub(crate) mod retry;
pub mod types;

pub use client::{ClientOptions, RecordsClient};
pub use error::RecordsError;
pub use guard::{
    CreatedVendor, MutationGuard, PreconditionError, SubmissionLock, SubmitError, TenantRef,
};
pub use listing::{active_tenant_count, visible_vendors};
pub use types::{EditResponse, MutationResponse, TenantUpdate, VendorPayload, VendorUpdate};
