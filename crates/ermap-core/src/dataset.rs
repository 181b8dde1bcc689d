//! Loading and saving the persisted warehouse dataset.
//!
//! The dataset is read once at session start and treated as an immutable
//! snapshot. JSON is the native format; files ending in `.yaml`/`.yml` are
//! read as YAML.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::location::Coordinates;
use crate::warehouse::{resource_totals, ResourceTotal, StoredDistance, Warehouse};
use crate::DatasetError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub coordinate_system: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseDataset {
    #[serde(default)]
    pub metadata: DatasetMetadata,
    pub warehouses: Vec<Warehouse>,
    /// Precomputed inter-warehouse distances, one row per unordered pair.
    #[serde(default)]
    pub distances: Vec<StoredDistance>,
}

impl WarehouseDataset {
    #[must_use]
    pub fn warehouse(&self, id: &str) -> Option<&Warehouse> {
        self.warehouses.iter().find(|w| w.id == id)
    }

    /// Looks up the stored row for `a`–`b` regardless of direction.
    #[must_use]
    pub fn stored_distance(&self, a: &str, b: &str) -> Option<&StoredDistance> {
        self.distances.iter().find(|d| d.connects(a, b))
    }

    #[must_use]
    pub fn resource_totals(&self) -> Vec<ResourceTotal> {
        resource_totals(&self.warehouses)
    }
}

/// Load and validate a warehouse dataset.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, does not parse, or
/// fails validation. Nothing is returned on partial success.
pub fn load_dataset(path: &Path) -> Result<WarehouseDataset, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let dataset = parse_dataset(path, &content)?;
    validate_dataset(&dataset)?;

    tracing::info!(
        path = %path.display(),
        warehouses = dataset.warehouses.len(),
        stored_distances = dataset.distances.len(),
        "loaded warehouse dataset"
    );

    Ok(dataset)
}

/// Write `dataset` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`DatasetError::Json`] if serialization fails or
/// [`DatasetError::Io`] if the file cannot be written.
pub fn save_dataset(path: &Path, dataset: &WarehouseDataset) -> Result<(), DatasetError> {
    let body = serde_json::to_string_pretty(dataset).map_err(|e| DatasetError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    std::fs::write(path, body).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn parse_dataset(path: &Path, content: &str) -> Result<WarehouseDataset, DatasetError> {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(content).map_err(|e| DatasetError::Yaml {
            path: path.display().to_string(),
            source: e,
        })
    } else {
        serde_json::from_str(content).map_err(|e| DatasetError::Json {
            path: path.display().to_string(),
            source: e,
        })
    }
}

fn validate_dataset(dataset: &WarehouseDataset) -> Result<(), DatasetError> {
    if dataset.warehouses.is_empty() {
        return Err(DatasetError::Validation(
            "dataset contains no warehouses".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for warehouse in &dataset.warehouses {
        if warehouse.id.trim().is_empty() {
            return Err(DatasetError::Validation(format!(
                "warehouse '{}' has an empty id",
                warehouse.name
            )));
        }
        if warehouse.name.trim().is_empty() {
            return Err(DatasetError::Validation(format!(
                "warehouse '{}' has an empty name",
                warehouse.id
            )));
        }
        if !seen_ids.insert(warehouse.id.as_str()) {
            return Err(DatasetError::Validation(format!(
                "duplicate warehouse id: '{}'",
                warehouse.id
            )));
        }
        let coords = Coordinates::new(warehouse.location.longitude, warehouse.location.latitude);
        if !coords.in_range() {
            return Err(DatasetError::Validation(format!(
                "warehouse '{}' has out-of-range coordinates {coords}",
                warehouse.id
            )));
        }
    }

    let mut seen_pairs = HashSet::new();
    for row in &dataset.distances {
        for id in [&row.from_id, &row.to_id] {
            if !seen_ids.contains(id.as_str()) {
                return Err(DatasetError::Validation(format!(
                    "distance row references unknown warehouse '{id}'"
                )));
            }
        }
        if row.from_id == row.to_id {
            return Err(DatasetError::Validation(format!(
                "distance row joins warehouse '{}' to itself",
                row.from_id
            )));
        }
        let key = if row.from_id < row.to_id {
            (row.from_id.as_str(), row.to_id.as_str())
        } else {
            (row.to_id.as_str(), row.from_id.as_str())
        };
        if !seen_pairs.insert(key) {
            return Err(DatasetError::Validation(format!(
                "duplicate distance row for '{}'-'{}'",
                key.0, key.1
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
