//! `ermap warehouses`: inventory overview from the local dataset only.

use anyhow::Context as _;
use ermap_core::{assess_equipment, load_dataset, AppConfig};

pub(crate) fn run_warehouses(config: &AppConfig, personnel: Option<u32>) -> anyhow::Result<()> {
    let dataset = load_dataset(&config.warehouses_path).with_context(|| {
        format!(
            "failed to load warehouses from {}",
            config.warehouses_path.display()
        )
    })?;

    println!("{}", ermap_agent::render::warehouse_overview(&dataset));

    if let Some(personnel) = personnel {
        println!("=== 防护装备评估（{personnel}人） ===");
        for warehouse in &dataset.warehouses {
            let assessment = assess_equipment(warehouse, personnel);
            println!(
                "- {} ({}): 防护装备{}件，{}",
                warehouse.name, assessment.warehouse_id, assessment.capacity, assessment.sufficiency
            );
        }
    }

    Ok(())
}
