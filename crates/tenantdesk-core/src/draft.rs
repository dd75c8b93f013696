//! The vendor record under composition in the creation form.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Optional location block of a draft. Values stay as typed strings until
/// the payload is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: String,
    pub longitude: String,
    pub vendor_address: String,
    pub address_name: String,
}

impl Location {
    /// Stores a picked coordinate. The vendor address is left for the user
    /// to type, matching what the form does after a map pick.
    pub fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.latitude = coordinate.latitude.to_string();
        self.longitude = coordinate.longitude.to_string();
    }

    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_location_strings(&self.latitude, &self.longitude)
    }
}

/// Values a fresh draft starts from. A draft is reset to these after a
/// successful submit or a cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftDefaults {
    pub tenant_id: String,
    pub domain: String,
    pub app_type: String,
    pub language: String,
    pub timezone: String,
    pub status: String,
    pub plan_type: String,
}

impl DraftDefaults {
    #[must_use]
    pub fn for_tenant(tenant_id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }
}

impl Default for DraftDefaults {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            domain: String::new(),
            app_type: "Vendor".to_string(),
            language: "en".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            status: "active".to_string(),
            plan_type: "demo".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub tenant_id: String,
    pub domain: String,
    pub app_type: String,
    pub language: String,
    pub timezone: String,
    pub status: String,
    pub plan_type: String,
    pub location: Option<Location>,
}

impl VendorDraft {
    #[must_use]
    pub fn new(defaults: &DraftDefaults) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            tenant_id: defaults.tenant_id.clone(),
            domain: defaults.domain.clone(),
            app_type: defaults.app_type.clone(),
            language: defaults.language.clone(),
            timezone: defaults.timezone.clone(),
            status: defaults.status.clone(),
            plan_type: defaults.plan_type.clone(),
            location: None,
        }
    }

    /// Returns the location block, creating an empty one on first use.
    pub fn location_mut(&mut self) -> &mut Location {
        self.location.get_or_insert_with(Location::default)
    }

    /// Keeps only digits and caps the phone at ten of them, as the phone
    /// input does on every keystroke.
    pub fn set_phone_input(&mut self, raw: &str) {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() <= 10 {
            self.phone = digits;
        }
    }
}
