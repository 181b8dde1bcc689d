//! Shared domain types and configuration for the emergency resource
//! dispatch workspace.
//!
//! Warehouses are loaded once per session from a persisted dataset and stay
//! read-only afterwards; every other crate borrows them from here.

pub mod app_config;
pub mod assessment;
pub mod config;
pub mod dataset;
pub mod error;
pub mod location;
pub mod warehouse;

pub use app_config::{AppConfig, Environment};
pub use assessment::{
    assess_equipment, assess_incident, EquipmentAssessment, IncidentAssessment, RiskLevel,
    Sufficiency,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{load_dataset, save_dataset, DatasetMetadata, WarehouseDataset};
pub use error::{ConfigError, DatasetError};
pub use location::{Coordinates, Location};
pub use warehouse::{
    category_label, resource_totals, Capacity, Contact, DistanceStatus, ResourceItem,
    ResourceTotal, StoredDistance, Warehouse, WarehouseSite,
};
