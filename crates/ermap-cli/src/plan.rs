//! `ermap plan`: distances from both ends, heuristics, then the planner.

use std::path::Path;

use anyhow::Context as _;
use futures::FutureExt as _;

use ermap_agent::{DispatchPlanner, PlanningRequest};
use ermap_core::{assess_equipment, assess_incident, AppConfig, Location};
use ermap_distance::{with_session, DistancePipeline, OriginReport};

use crate::distances::{load_warehouses, map_agent, pipeline_options, print_origin_report};

#[derive(Debug, Clone)]
pub(crate) struct IncidentInput {
    pub incident: String,
    pub departure: String,
    pub personnel: u32,
    pub vehicles: u32,
    pub description: String,
}

pub(crate) async fn run_plan(
    config: &AppConfig,
    input: &IncidentInput,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let dataset = load_warehouses(config)?;
    let mut planner = DispatchPlanner::from_config(config).context("failed to build planner")?;
    let mut agent = map_agent(config)?;
    let pipeline = DistancePipeline::new(pipeline_options(config, None));

    let assessment = assess_incident(&input.description, input.personnel, input.vehicles);
    println!(
        "风险等级: {}，建议出动 {} 人 / {} 辆车",
        assessment.risk_level, assessment.personnel, assessment.vehicles
    );
    for note in &assessment.special_considerations {
        println!("  - {note}");
    }

    let incident = Location::from_input(&input.incident);
    let departure = Location::from_input(&input.departure);
    let warehouses = dataset.warehouses.clone();

    let (incident_report, departure_report) = with_session(&mut agent, move |oracle| {
        async move {
            let incident = pipeline.resolve_many(oracle, &incident, &warehouses).await;
            let departure = pipeline.resolve_many(oracle, &departure, &warehouses).await;
            (incident, departure)
        }
        .boxed()
    })
    .await
    .context("map oracle session failed")?;

    print_origin_report(&incident_report);
    print_origin_report(&departure_report);
    print_nearest(&dataset, &incident_report, input.personnel);

    let request = PlanningRequest {
        incident_location: &input.incident,
        departure_location: &input.departure,
        personnel: input.personnel,
        vehicles: input.vehicles,
        fire_description: &input.description,
        incident_distances: &incident_report,
        departure_distances: &departure_report,
        dataset: &dataset,
    };
    let plan = planner
        .make_decision(&request)
        .await
        .context("failed to obtain dispatch plan")?;

    println!("\n{plan}");
    if let Some(path) = output {
        std::fs::write(path, &plan)
            .with_context(|| format!("failed to write plan to {}", path.display()))?;
        tracing::info!(path = %path.display(), "plan written");
    }
    Ok(())
}

fn print_nearest(dataset: &ermap_core::WarehouseDataset, report: &OriginReport, personnel: u32) {
    let Some(nearest) = report.nearest() else {
        println!("没有可用的仓库距离，无法推荐最近仓库");
        return;
    };
    let Some(warehouse) = nearest
        .destination()
        .id
        .as_deref()
        .and_then(|id| dataset.warehouse(id))
    else {
        return;
    };

    let equipment = assess_equipment(warehouse, personnel);
    println!(
        "距事发地最近仓库: {}，防护装备{}件（{}）",
        warehouse.name, equipment.capacity, equipment.sufficiency
    );
}
