//! Equipment sufficiency and incident risk heuristics.
//!
//! Both are keyword scans over free text. They feed the CLI summary and the
//! planner prompt; nothing here talks to the network.

use serde::Serialize;

use crate::warehouse::Warehouse;

/// Item-name fragments that count as personal protective gear.
const PROTECTIVE_GEAR_KEYWORDS: &[&str] = &["呼吸器", "防护服", "面罩"];

/// Fraction of personnel that must be covered for a "basic" rating.
const BASIC_COVERAGE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sufficiency {
    /// Protective gear for every responder.
    Adequate,
    /// At least 70 % coverage.
    Basic,
    Insufficient,
}

impl std::fmt::Display for Sufficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sufficiency::Adequate => write!(f, "充足"),
            Sufficiency::Basic => write!(f, "基本满足"),
            Sufficiency::Insufficient => write!(f, "不足"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentAssessment {
    pub warehouse_id: String,
    /// Sum of protective-gear quantities.
    pub capacity: u64,
    /// `(item name, quantity)` for every matched item.
    pub details: Vec<(String, u32)>,
    pub sufficiency: Sufficiency,
}

/// Rates one warehouse's protective gear against `personnel`.
#[must_use]
pub fn assess_equipment(warehouse: &Warehouse, personnel: u32) -> EquipmentAssessment {
    let mut capacity = 0u64;
    let mut details = Vec::new();

    for (_, item) in warehouse.items() {
        if PROTECTIVE_GEAR_KEYWORDS
            .iter()
            .any(|kw| item.name.contains(kw))
        {
            capacity += u64::from(item.quantity);
            details.push((item.name.clone(), item.quantity));
        }
    }

    EquipmentAssessment {
        warehouse_id: warehouse.id.clone(),
        capacity,
        details,
        sufficiency: classify(capacity, personnel),
    }
}

#[allow(clippy::cast_precision_loss)]
fn classify(capacity: u64, personnel: u32) -> Sufficiency {
    if capacity >= u64::from(personnel) {
        Sufficiency::Adequate
    } else if capacity as f64 >= f64::from(personnel) * BASIC_COVERAGE {
        Sufficiency::Basic
    } else {
        Sufficiency::Insufficient
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "低危"),
            RiskLevel::Medium => write!(f, "中等"),
            RiskLevel::High => write!(f, "高危"),
        }
    }
}

/// Adjusted force sizing and extra considerations derived from an incident
/// description.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentAssessment {
    pub risk_level: RiskLevel,
    pub personnel: u32,
    pub vehicles: u32,
    pub recommended_equipment: Vec<String>,
    pub special_considerations: Vec<String>,
}

const SEVERE_KEYWORDS: &[&str] = &["大火", "重大", "严重", "高层"];
const MINOR_KEYWORDS: &[&str] = &["小火", "初期", "轻微"];
const CROWDED_KEYWORDS: &[&str] = &["人口密集", "医院", "学校", "商场"];
const HAZMAT_KEYWORDS: &[&str] = &["化学", "危险品", "油类"];

/// Scans an incident description for scale, occupancy, and hazmat cues.
///
/// Severe incidents raise the force to at least 30 responders and 5
/// vehicles; minor ones cap it at 15 and 2. Hazardous materials always
/// raise the risk to [`RiskLevel::High`].
#[must_use]
pub fn assess_incident(description: &str, personnel: u32, vehicles: u32) -> IncidentAssessment {
    let text = description.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|kw| text.contains(kw));

    let mut assessment = IncidentAssessment {
        risk_level: RiskLevel::Medium,
        personnel,
        vehicles,
        recommended_equipment: Vec::new(),
        special_considerations: Vec::new(),
    };

    if mentions(SEVERE_KEYWORDS) {
        assessment.risk_level = RiskLevel::High;
        assessment.personnel = personnel.max(30);
        assessment.vehicles = vehicles.max(5);
        assessment
            .recommended_equipment
            .extend(["重型消防车", "云梯车", "大功率水泵"].map(String::from));
        assessment
            .special_considerations
            .push("需要增派人员和重型设备".to_string());
    } else if mentions(MINOR_KEYWORDS) {
        assessment.risk_level = RiskLevel::Low;
        assessment.personnel = personnel.min(15);
        assessment.vehicles = vehicles.min(2);
    }

    if mentions(CROWDED_KEYWORDS) {
        assessment
            .special_considerations
            .push("人员疏散优先，需要救护车待命".to_string());
        assessment
            .recommended_equipment
            .extend(["救护车", "疏散设备"].map(String::from));
    }

    if mentions(HAZMAT_KEYWORDS) {
        assessment.risk_level = RiskLevel::High;
        assessment
            .recommended_equipment
            .extend(["化学防护服", "泡沫灭火剂"].map(String::from));
        assessment
            .special_considerations
            .push("需要化学防护措施".to_string());
    }

    assessment
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::warehouse::{Capacity, Contact, ResourceItem, WarehouseSite};

    fn warehouse_with(items: Vec<(&str, u32)>) -> Warehouse {
        Warehouse {
            id: "WH001".to_string(),
            name: "测试仓库".to_string(),
            location: WarehouseSite {
                address: String::new(),
                longitude: 104.0,
                latitude: 30.0,
                city: String::new(),
                district: String::new(),
            },
            capacity: Capacity {
                total_area: 1.0,
                available_area: 1.0,
                max_weight: 1.0,
            },
            contact: Contact {
                manager: String::new(),
                phone: String::new(),
                emergency_phone: String::new(),
            },
            resources: BTreeMap::from([(
                "rescue_equipment".to_string(),
                items
                    .into_iter()
                    .map(|(name, quantity)| ResourceItem {
                        name: name.to_string(),
                        quantity,
                        unit: "套".to_string(),
                        specification: String::new(),
                    })
                    .collect(),
            )]),
        }
    }

    #[test]
    fn counts_only_protective_gear() {
        let w = warehouse_with(vec![
            ("正压式空气呼吸器", 10),
            ("消防防护服", 8),
            ("消防水带", 50),
        ]);
        let a = assess_equipment(&w, 18);
        assert_eq!(a.capacity, 18);
        assert_eq!(a.details.len(), 2);
        assert_eq!(a.sufficiency, Sufficiency::Adequate);
    }

    #[test]
    fn seventy_percent_is_basic() {
        let w = warehouse_with(vec![("防毒面罩", 14)]);
        assert_eq!(assess_equipment(&w, 20).sufficiency, Sufficiency::Basic);
    }

    #[test]
    fn below_seventy_percent_is_insufficient() {
        let w = warehouse_with(vec![("防毒面罩", 13)]);
        assert_eq!(
            assess_equipment(&w, 20).sufficiency,
            Sufficiency::Insufficient
        );
    }

    #[test]
    fn zero_personnel_is_always_adequate() {
        let w = warehouse_with(vec![]);
        assert_eq!(assess_equipment(&w, 0).sufficiency, Sufficiency::Adequate);
    }

    #[test]
    fn severe_fire_raises_force() {
        let a = assess_incident("高层住宅发生大火", 20, 3);
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.personnel, 30);
        assert_eq!(a.vehicles, 5);
        assert!(a.recommended_equipment.contains(&"云梯车".to_string()));
    }

    #[test]
    fn minor_fire_caps_force() {
        let a = assess_incident("初期小火，无人员被困", 25, 4);
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert_eq!(a.personnel, 15);
        assert_eq!(a.vehicles, 2);
    }

    #[test]
    fn hospital_fire_prioritizes_evacuation() {
        let a = assess_incident("医院住院部3楼发生电气火灾，火势中等规模", 25, 3);
        assert_eq!(a.risk_level, RiskLevel::Medium);
        assert_eq!(a.personnel, 25);
        assert!(a
            .special_considerations
            .iter()
            .any(|s| s.contains("人员疏散优先")));
    }

    #[test]
    fn hazmat_forces_high_risk() {
        let a = assess_incident("初期火灾，涉及化学品仓库", 10, 2);
        assert_eq!(a.risk_level, RiskLevel::High);
        assert!(a.recommended_equipment.contains(&"泡沫灭火剂".to_string()));
    }
}
