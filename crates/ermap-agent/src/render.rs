//! Plain-text renderings of warehouses and distances for LLM prompts.

use std::fmt::Write as _;

use ermap_core::{category_label, WarehouseDataset};
use ermap_distance::OriginReport;

/// Inventory overview: per-warehouse details followed by totals per item.
#[must_use]
pub fn warehouse_overview(dataset: &WarehouseDataset) -> String {
    let mut out = String::from("应急物资仓库信息概览\n\n");
    let _ = writeln!(out, "总仓库数量: {}个\n", dataset.warehouses.len());
    out.push_str("=== 仓库详细信息 ===\n");

    for w in &dataset.warehouses {
        let _ = writeln!(out, "\n【{}】", w.name);
        let _ = writeln!(out, "- 仓库ID: {}", w.id);
        let _ = writeln!(out, "- 地址: {}", w.location.address);
        let _ = writeln!(out, "- 位置: {}{}", w.location.city, w.location.district);
        let _ = writeln!(
            out,
            "- 坐标: ({}, {})",
            w.location.longitude, w.location.latitude
        );
        let _ = writeln!(
            out,
            "- 容量: 总面积{}㎡, 可用面积{}㎡, 最大载重{}吨",
            w.capacity.total_area, w.capacity.available_area, w.capacity.max_weight
        );
        let _ = writeln!(
            out,
            "- 联系人: {} (电话: {}, 应急: {})",
            w.contact.manager, w.contact.phone, w.contact.emergency_phone
        );

        if w.resources.values().any(|items| !items.is_empty()) {
            out.push_str("- 主要物资:\n");
            for (category, items) in &w.resources {
                if items.is_empty() {
                    continue;
                }
                let _ = writeln!(out, "  * {}:", category_label(category));
                for item in items {
                    let _ = write!(out, "    - {}: {}{}", item.name, item.quantity, item.unit);
                    if !item.specification.is_empty() {
                        let _ = write!(out, " ({})", item.specification);
                    }
                    out.push('\n');
                }
            }
        }
    }

    out.push_str("\n=== 物资统计汇总 ===\n");
    let mut current_category: Option<String> = None;
    for total in dataset.resource_totals() {
        if current_category.as_deref() != Some(total.category.as_str()) {
            let _ = writeln!(out, "\n【{}】", total.category);
            current_category = Some(total.category.clone());
        }
        let _ = writeln!(out, "- {}: {}{}", total.name, total.total_quantity, total.unit);
    }

    out
}

/// `- 名称：X公里，预计Y分钟` per successful result.
#[must_use]
pub fn distance_lines(report: &OriginReport) -> String {
    let lines: Vec<String> = report
        .successes()
        .filter_map(|r| {
            let (km, minutes) = r.measured()?;
            Some(format!(
                "- {}：{km:.2}公里，预计{minutes}分钟",
                r.destination().name
            ))
        })
        .collect();

    if lines.is_empty() {
        "暂无距离信息".to_string()
    } else {
        lines.join("\n")
    }
}

/// `A-B：X公里, 预计时间: Y分钟` for each usable stored row.
#[must_use]
pub fn inter_warehouse_lines(dataset: &WarehouseDataset) -> String {
    let lines: Vec<String> = dataset
        .distances
        .iter()
        .filter(|d| d.is_usable())
        .filter_map(|d| {
            let from = dataset.warehouse(&d.from_id)?;
            let to = dataset.warehouse(&d.to_id)?;
            let km = d.distance_km?;
            let minutes = d.duration_min?;
            Some(format!(
                "{}-{}：{km:.2}公里, 预计时间: {minutes}分钟",
                from.name, to.name
            ))
        })
        .collect();

    if lines.is_empty() {
        "暂无仓库间距离信息".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use ermap_distance::{DistanceResult, Endpoint, ExtractionStatus};

    use super::*;

    const DATASET: &str = r#"{
        "warehouses": [
            {
                "id": "WH001",
                "name": "武侯仓库",
                "location": {"address": "武侯大道1号", "longitude": 104.03, "latitude": 30.64, "city": "成都市", "district": "武侯区"},
                "capacity": {"total_area": 2000, "available_area": 1500, "max_weight": 120},
                "contact": {"manager": "李明", "phone": "028-1", "emergency_phone": "119"},
                "resources": {
                    "rescue_equipment": [
                        {"name": "空气呼吸器", "quantity": 30, "unit": "套", "specification": "6.8L"}
                    ]
                }
            },
            {
                "id": "WH002",
                "name": "锦江仓库",
                "location": {"address": "东大街2号", "longitude": 104.09, "latitude": 30.65},
                "capacity": {"total_area": 1200, "available_area": 900, "max_weight": 80},
                "contact": {"manager": "王芳", "phone": "028-2"},
                "resources": {
                    "rescue_equipment": [
                        {"name": "空气呼吸器", "quantity": 12, "unit": "套"}
                    ]
                }
            }
        ],
        "distances": [
            {"from_id": "WH001", "to_id": "WH002", "distance_km": 7.4, "duration_min": 21, "status": "success"}
        ]
    }"#;

    fn dataset() -> WarehouseDataset {
        serde_json::from_str(DATASET).unwrap()
    }

    #[test]
    fn overview_includes_details_and_totals() {
        let text = warehouse_overview(&dataset());
        assert!(text.contains("总仓库数量: 2个"));
        assert!(text.contains("【武侯仓库】"));
        assert!(text.contains("- 位置: 成都市武侯区"));
        assert!(text.contains("  * 救援装备:"));
        assert!(text.contains("    - 空气呼吸器: 30套 (6.8L)"));
        assert!(text.contains("    - 空气呼吸器: 12套\n"));
        assert!(text.contains("【救援装备】\n- 空气呼吸器: 42套"));
    }

    #[test]
    fn inter_warehouse_lines_use_names() {
        assert_eq!(
            inter_warehouse_lines(&dataset()),
            "武侯仓库-锦江仓库：7.40公里, 预计时间: 21分钟"
        );
    }

    #[test]
    fn distance_lines_skip_failures() {
        let origin = Endpoint::place("春熙路", "104.08,30.66");
        let wh = |id: &str, name: &str| Endpoint {
            id: Some(id.to_string()),
            name: name.to_string(),
            query: "104,30".to_string(),
        };
        let report = OriginReport {
            origin: "春熙路".to_string(),
            resolved_origin: "104.08,30.66".to_string(),
            results: vec![
                DistanceResult::resolved(origin.clone(), wh("WH001", "武侯仓库"), 5.2, 15, 1),
                DistanceResult::failed(
                    origin,
                    wh("WH002", "锦江仓库"),
                    None,
                    None,
                    ExtractionStatus::Failed,
                    3,
                    "无结果".to_string(),
                    None,
                ),
            ],
        };
        assert_eq!(distance_lines(&report), "- 武侯仓库：5.20公里，预计15分钟");
    }

    #[test]
    fn empty_report_has_placeholder() {
        let report = OriginReport {
            origin: "x".to_string(),
            resolved_origin: "x".to_string(),
            results: vec![],
        };
        assert_eq!(distance_lines(&report), "暂无距离信息");
    }
}
