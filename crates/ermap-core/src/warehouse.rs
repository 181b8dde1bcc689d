use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::location::Coordinates;

/// An emergency supply warehouse and its inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub location: WarehouseSite,
    pub capacity: Capacity,
    pub contact: Contact,
    /// Resource category → items in the order they were recorded.
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<ResourceItem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseSite {
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capacity {
    /// Square metres.
    pub total_area: f64,
    /// Square metres.
    pub available_area: f64,
    /// Tonnes.
    pub max_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub manager: String,
    pub phone: String,
    #[serde(default)]
    pub emergency_phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    #[serde(alias = "type")]
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    #[serde(default)]
    pub specification: String,
}

impl Warehouse {
    /// Stored coordinates; these are authoritative and never geocoded again.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.location.longitude, self.location.latitude)
    }

    /// Iterates `(category, item)` pairs in category order, items in recorded order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &ResourceItem)> {
        self.resources
            .iter()
            .flat_map(|(category, items)| items.iter().map(move |item| (category.as_str(), item)))
    }
}

/// Display name for a resource category key.
///
/// Datasets exported from the inventory system use snake_case English keys;
/// the planner and reports show the Chinese label. Unknown keys pass through.
#[must_use]
pub fn category_label(key: &str) -> &str {
    match key {
        "fire_extinguishing" => "灭火设备",
        "rescue_equipment" => "救援装备",
        "medical_supplies" => "医疗用品",
        "communication" => "通信设备",
        "evacuation" => "疏散设备",
        "heavy_equipment" => "重型装备",
        "logistics" => "后勤保障",
        "command_center" => "指挥中心",
        other => other,
    }
}

/// Inventory total for one item name across every warehouse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceTotal {
    pub name: String,
    pub category: String,
    pub total_quantity: u64,
    pub unit: String,
}

/// Sums quantities per item name across `warehouses`.
///
/// The first occurrence of a name fixes its category and unit. Output is
/// sorted by category label, then item name.
#[must_use]
pub fn resource_totals(warehouses: &[Warehouse]) -> Vec<ResourceTotal> {
    let mut totals: BTreeMap<&str, ResourceTotal> = BTreeMap::new();

    for warehouse in warehouses {
        for (category, item) in warehouse.items() {
            totals
                .entry(item.name.as_str())
                .or_insert_with(|| ResourceTotal {
                    name: item.name.clone(),
                    category: category_label(category).to_string(),
                    total_quantity: 0,
                    unit: item.unit.clone(),
                })
                .total_quantity += u64::from(item.quantity);
        }
    }

    let mut out: Vec<ResourceTotal> = totals.into_values().collect();
    out.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Outcome flag of a precomputed inter-warehouse distance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceStatus {
    Success,
    Failure,
}

/// One row of the precomputed inter-warehouse distance table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDistance {
    pub from_id: String,
    pub to_id: String,
    pub distance_km: Option<f64>,
    pub duration_min: Option<u32>,
    pub status: DistanceStatus,
    #[serde(default)]
    pub attempts: Option<u32>,
}

impl StoredDistance {
    /// `true` when this row joins `a` and `b`, in either direction.
    #[must_use]
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from_id == a && self.to_id == b) || (self.from_id == b && self.to_id == a)
    }

    /// Usable for planning: flagged success with both values present.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.status == DistanceStatus::Success
            && self.distance_km.is_some()
            && self.duration_min.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: u32, unit: &str) -> ResourceItem {
        ResourceItem {
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            specification: String::new(),
        }
    }

    fn warehouse(id: &str, resources: BTreeMap<String, Vec<ResourceItem>>) -> Warehouse {
        Warehouse {
            id: id.to_string(),
            name: format!("仓库{id}"),
            location: WarehouseSite {
                address: "成都市".to_string(),
                longitude: 104.0,
                latitude: 30.6,
                city: "成都市".to_string(),
                district: "武侯区".to_string(),
            },
            capacity: Capacity {
                total_area: 1000.0,
                available_area: 800.0,
                max_weight: 50.0,
            },
            contact: Contact {
                manager: "张三".to_string(),
                phone: "028-0000".to_string(),
                emergency_phone: "119".to_string(),
            },
            resources,
        }
    }

    #[test]
    fn category_label_translates_known_keys() {
        assert_eq!(category_label("fire_extinguishing"), "灭火设备");
        assert_eq!(category_label("command_center"), "指挥中心");
        assert_eq!(category_label("自定义"), "自定义");
    }

    #[test]
    fn resource_totals_sum_across_warehouses() {
        let a = warehouse(
            "A",
            BTreeMap::from([(
                "rescue_equipment".to_string(),
                vec![item("空气呼吸器", 20, "套"), item("防护服", 30, "套")],
            )]),
        );
        let b = warehouse(
            "B",
            BTreeMap::from([(
                "rescue_equipment".to_string(),
                vec![item("空气呼吸器", 15, "套")],
            )]),
        );

        let totals = resource_totals(&[a, b]);
        let breathing = totals.iter().find(|t| t.name == "空气呼吸器").unwrap();
        assert_eq!(breathing.total_quantity, 35);
        assert_eq!(breathing.category, "救援装备");
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn stored_distance_connects_both_directions() {
        let row = StoredDistance {
            from_id: "A".to_string(),
            to_id: "B".to_string(),
            distance_km: Some(12.3),
            duration_min: Some(35),
            status: DistanceStatus::Success,
            attempts: Some(1),
        };
        assert!(row.connects("A", "B"));
        assert!(row.connects("B", "A"));
        assert!(!row.connects("A", "C"));
        assert!(row.is_usable());
    }

    #[test]
    fn failed_row_is_not_usable() {
        let row = StoredDistance {
            from_id: "A".to_string(),
            to_id: "B".to_string(),
            distance_km: Some(12.3),
            duration_min: None,
            status: DistanceStatus::Failure,
            attempts: Some(3),
        };
        assert!(!row.is_usable());
    }

    #[test]
    fn item_accepts_type_alias() {
        let parsed: ResourceItem = serde_json::from_str(
            r#"{"type": "消防水带", "quantity": 40, "unit": "盘", "specification": "65mm"}"#,
        )
        .unwrap();
        assert_eq!(parsed.name, "消防水带");
        assert_eq!(parsed.quantity, 40);
    }
}
