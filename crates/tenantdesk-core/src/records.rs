//! Tenant and vendor records as served by the record service's list endpoint.
//!
//! The service omits fields freely, so every string defaults to empty.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Inactive,
    Suspended,
    #[serde(other)]
    Other,
}

impl TenantStatus {
    /// Case-insensitive parse; anything unrecognised maps to `Other`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => TenantStatus::Active,
            "inactive" => TenantStatus::Inactive,
            "suspended" => TenantStatus::Suspended,
            _ => TenantStatus::Other,
        }
    }

    /// Only an explicitly inactive tenant refuses new vendors.
    #[must_use]
    pub fn accepts_vendors(&self) -> bool {
        !matches!(self, TenantStatus::Inactive)
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenantStatus::Active => write!(f, "active"),
            TenantStatus::Inactive => write!(f, "inactive"),
            TenantStatus::Suspended => write!(f, "suspended"),
            TenantStatus::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantRecord {
    pub tenant_id: String,
    pub tenant_name: String,
    pub domain: String,
    pub address: String,
    pub email: String,
    pub phone_number: String,
    pub primary_color: String,
    pub language: String,
    pub timezone: String,
    pub status: String,
    pub plan_type: String,
    pub app_type: String,
    pub time: String,
}

impl TenantRecord {
    #[must_use]
    pub fn status(&self) -> TenantStatus {
        TenantStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorLocation {
    pub latitude: String,
    pub longitude: String,
    pub vendor_address: String,
    pub address_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorRecord {
    pub vendor_id: String,
    pub vendor_name: String,
    pub domain: String,
    pub address: String,
    pub email: String,
    pub phone_number: String,
    pub primary_color: String,
    pub language: String,
    pub timezone: String,
    pub status: String,
    pub plan_type: String,
    pub app_type: String,
    pub time: String,
    pub tenant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_location: Option<VendorLocation>,
}
