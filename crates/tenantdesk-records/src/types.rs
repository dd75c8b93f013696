//! Record service request and response types.
//!
//! Every response is wrapped in a `{"statusCode": 200, ...}` envelope; the
//! HTTP status is 200 even when `statusCode` reports a failure, so both are
//! checked by the client.

use serde::{Deserialize, Serialize};
use tenantdesk_core::{TenantRecord, VendorDraft, VendorLocation, VendorRecord};

/// The only envelope `statusCode` that means success.
pub const STATUS_OK: i64 = 200;

// ---------------------------------------------------------------------------
// tenantandvendor
// ---------------------------------------------------------------------------

/// Body of a list request: `{"type": "tenant"}` or
/// `{"type": "vendor", "tenant_id": ".."}`.
#[derive(Debug, Serialize)]
pub(crate) struct ListRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<&'a str>,
}

/// `{statusCode, body: {type, count, data: [...]}}`.
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(rename = "statusCode")]
    pub status_code: i64,
    #[serde(default = "Option::default")]
    pub body: Option<ListBody<T>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListBody<T> {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default = "Option::default")]
    pub data: Option<Vec<T>>,
}

// ---------------------------------------------------------------------------
// create_vendor / edit_detail
// ---------------------------------------------------------------------------

/// `{statusCode, message?}` returned by `create_vendor`.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// `edit_detail` reply. Any 2xx is accepted: `statusCode` is optional and
/// only a present value other than 200 is a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EditResponse {
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Normalized create-vendor body.
///
/// Built from a [`VendorDraft`]: every string trimmed and `vendor_location`
/// always present, with empty strings when the draft has no location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorPayload {
    pub vendor_name: String,
    pub app_type: String,
    pub domain: String,
    pub address: String,
    pub email: String,
    pub phone_number: String,
    pub language: String,
    pub timezone: String,
    pub status: String,
    pub plan_type: String,
    pub tenant_id: String,
    pub vendor_location: VendorLocation,
}

impl VendorPayload {
    /// `tenant_id` is the owning tenant's id, which wins over the draft's.
    #[must_use]
    pub fn from_draft(draft: &VendorDraft, tenant_id: &str) -> Self {
        let vendor_location = draft
            .location
            .as_ref()
            .map(|l| VendorLocation {
                latitude: l.latitude.trim().to_owned(),
                longitude: l.longitude.trim().to_owned(),
                vendor_address: l.vendor_address.trim().to_owned(),
                address_name: l.address_name.trim().to_owned(),
            })
            .unwrap_or_default();

        Self {
            vendor_name: draft.name.trim().to_owned(),
            app_type: draft.app_type.trim().to_owned(),
            domain: draft.domain.trim().to_owned(),
            address: draft.address.trim().to_owned(),
            email: draft.email.trim().to_owned(),
            phone_number: draft.phone.trim().to_owned(),
            language: draft.language.trim().to_owned(),
            timezone: draft.timezone.trim().to_owned(),
            status: draft.status.trim().to_owned(),
            plan_type: draft.plan_type.trim().to_owned(),
            tenant_id: tenant_id.trim().to_owned(),
            vendor_location,
        }
    }
}

/// Body of `edit_detail` with `"type": "vendor"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorUpdate {
    pub vendor_id: String,
    pub vendor_name: String,
    pub app_type: String,
    pub domain: String,
    pub address: String,
    pub email: String,
    pub phone_number: String,
    pub primary_color: String,
    pub vendor_location: VendorLocation,
    pub language: String,
    pub timezone: String,
    pub status: String,
    pub plan_type: String,
    pub tenant_id: String,
}

impl From<&VendorRecord> for VendorUpdate {
    fn from(record: &VendorRecord) -> Self {
        Self {
            vendor_id: record.vendor_id.clone(),
            vendor_name: record.vendor_name.clone(),
            app_type: record.app_type.clone(),
            domain: record.domain.clone(),
            address: record.address.clone(),
            email: record.email.clone(),
            phone_number: record.phone_number.clone(),
            primary_color: record.primary_color.clone(),
            vendor_location: record.vendor_location.clone().unwrap_or_default(),
            language: record.language.clone(),
            timezone: record.timezone.clone(),
            status: record.status.clone(),
            plan_type: record.plan_type.clone(),
            tenant_id: record.tenant_id.clone(),
        }
    }
}

/// Body of `edit_detail` with `"type": "tenant"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantUpdate {
    pub tenant_id: String,
    pub tenant_name: String,
    pub app_type: String,
    pub domain: String,
    pub address: String,
    pub email: String,
    pub phone_number: String,
    pub primary_color: String,
    pub language: String,
    pub timezone: String,
    pub status: String,
    pub plan_type: String,
}

impl From<&TenantRecord> for TenantUpdate {
    fn from(record: &TenantRecord) -> Self {
        Self {
            tenant_id: record.tenant_id.clone(),
            tenant_name: record.tenant_name.clone(),
            app_type: record.app_type.clone(),
            domain: record.domain.clone(),
            address: record.address.clone(),
            email: record.email.clone(),
            phone_number: record.phone_number.clone(),
            primary_color: record.primary_color.clone(),
            language: record.language.clone(),
            timezone: record.timezone.clone(),
            status: record.status.clone(),
            plan_type: record.plan_type.clone(),
        }
    }
}

/// Wraps an update body with the `type` discriminator `edit_detail` expects.
#[derive(Debug, Serialize)]
pub(crate) struct EditRequest<'a, T> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    #[serde(flatten)]
    pub detail: &'a T,
}
