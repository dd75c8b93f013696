pub mod app_config;
pub mod config;
pub mod draft;
pub mod geo;
pub mod records;
pub mod validation;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use draft::{DraftDefaults, Location, VendorDraft};
pub use geo::Coordinate;
pub use records::{TenantRecord, TenantStatus, VendorLocation, VendorRecord};
pub use validation::{validate_draft, ValidationError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
