//! Filters applied to fetched listings before display.

use tenantdesk_core::{TenantRecord, TenantStatus, VendorRecord};

/// Vendors worth showing: name, email and address present, and the domain
/// matching `domain` case-insensitively when one is given. Status is not
/// filtered.
#[must_use]
pub fn visible_vendors(records: &[VendorRecord], domain: Option<&str>) -> Vec<VendorRecord> {
    let domain = domain.map(str::trim).filter(|d| !d.is_empty());
    records
        .iter()
        .filter(|v| {
            !v.vendor_name.trim().is_empty()
                && !v.email.trim().is_empty()
                && !v.address.trim().is_empty()
        })
        .filter(|v| domain.is_none_or(|d| v.domain.trim().eq_ignore_ascii_case(d)))
        .cloned()
        .collect()
}

#[must_use]
pub fn active_tenant_count(tenants: &[TenantRecord]) -> usize {
    tenants
        .iter()
        .filter(|t| t.status() == TenantStatus::Active)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor(name: &str, email: &str, address: &str, domain: &str) -> VendorRecord {
        VendorRecord {
            vendor_name: name.to_owned(),
            email: email.to_owned(),
            address: address.to_owned(),
            domain: domain.to_owned(),
            status: "inactive".to_owned(),
            ..VendorRecord::default()
        }
    }

    #[test]
    fn drops_incomplete_records() {
        let records = vec![
            vendor("Corner Store", "a@b.com", "1 Main Rd", "shop.example"),
            vendor("", "a@b.com", "1 Main Rd", "shop.example"),
            vendor("No Email", "  ", "1 Main Rd", "shop.example"),
            vendor("No Address", "a@b.com", "", "shop.example"),
        ];
        let visible = visible_vendors(&records, None);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].vendor_name, "Corner Store");
    }

    #[test]
    fn domain_filter_is_case_insensitive_and_keeps_all_statuses() {
        let records = vec![
            vendor("A", "a@b.com", "x", "Shop.Example"),
            vendor("B", "b@b.com", "y", "other.example"),
        ];
        let visible = visible_vendors(&records, Some("shop.example"));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].vendor_name, "A");
        assert_eq!(visible[0].status, "inactive");
    }

    #[test]
    fn blank_domain_means_no_filter() {
        let records = vec![
            vendor("A", "a@b.com", "x", "one"),
            vendor("B", "b@b.com", "y", "two"),
        ];
        assert_eq!(visible_vendors(&records, Some("  ")).len(), 2);
    }

    #[test]
    fn counts_active_tenants_case_insensitively() {
        let tenants: Vec<TenantRecord> = ["active", "ACTIVE", "inactive", "suspended", ""]
            .into_iter()
            .map(|status| TenantRecord {
                status: status.to_owned(),
                ..TenantRecord::default()
            })
            .collect();
        assert_eq!(active_tenant_count(&tenants), 2);
    }
}
