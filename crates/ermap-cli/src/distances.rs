//! Oracle-backed subcommands: `distances` and `matrix`.
//!
//! Both open one MCP session, run the whole batch through the pipeline, and
//! close the session before printing or saving anything.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use futures::FutureExt as _;

use ermap_agent::MapAgent;
use ermap_core::{load_dataset, save_dataset, AppConfig, Location, WarehouseDataset};
use ermap_distance::{
    with_session, DistancePipeline, DistanceResult, OriginReport, PipelineOptions,
};

/// Pipeline settings from config, with an optional attempt override.
pub(crate) fn pipeline_options(config: &AppConfig, max_retries: Option<u32>) -> PipelineOptions {
    PipelineOptions {
        max_retries: max_retries.unwrap_or(config.oracle_max_retries),
        backoff: Duration::from_millis(config.oracle_backoff_ms),
        deadline: (config.oracle_deadline_secs > 0)
            .then(|| Duration::from_secs(config.oracle_deadline_secs)),
    }
}

pub(crate) fn load_warehouses(config: &AppConfig) -> anyhow::Result<WarehouseDataset> {
    load_dataset(&config.warehouses_path).with_context(|| {
        format!(
            "failed to load warehouses from {}",
            config.warehouses_path.display()
        )
    })
}

pub(crate) fn map_agent(config: &AppConfig) -> anyhow::Result<MapAgent> {
    MapAgent::from_config(config).context("failed to build map agent")
}

pub(crate) async fn run_distances(
    config: &AppConfig,
    from: &str,
    max_retries: Option<u32>,
) -> anyhow::Result<()> {
    let dataset = load_warehouses(config)?;
    let mut agent = map_agent(config)?;
    let pipeline = DistancePipeline::new(pipeline_options(config, max_retries));
    let origin = Location::from_input(from);
    let warehouses = dataset.warehouses;

    let report = with_session(&mut agent, move |oracle| {
        async move { pipeline.resolve_many(oracle, &origin, &warehouses).await }.boxed()
    })
    .await
    .context("map oracle session failed")?;

    print_origin_report(&report);
    Ok(())
}

pub(crate) async fn run_matrix(config: &AppConfig, output: Option<&Path>) -> anyhow::Result<()> {
    let mut dataset = load_warehouses(config)?;
    let mut agent = map_agent(config)?;
    let pipeline = DistancePipeline::new(pipeline_options(config, None));
    let warehouses = dataset.warehouses.clone();

    let pairs = with_session(&mut agent, move |oracle| {
        async move { pipeline.resolve_all_pairs(oracle, &warehouses).await }.boxed()
    })
    .await
    .context("map oracle session failed")?;

    println!(
        "仓库间距离：成功 {}/{}",
        pairs.success_count(),
        pairs.results.len()
    );
    for result in pairs.results.iter().filter(|r| !r.success()) {
        println!(
            "  失败: {} - {} {}",
            result.origin().name,
            result.destination().name,
            failure_detail(result)
        );
    }

    dataset.distances = pairs.to_stored();
    dataset.metadata.last_updated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let path = output.unwrap_or(&config.warehouses_path);
    save_dataset(path, &dataset)
        .with_context(|| format!("failed to save dataset to {}", path.display()))?;
    tracing::info!(path = %path.display(), pairs = dataset.distances.len(), "saved distance table");
    Ok(())
}

pub(crate) fn print_origin_report(report: &OriginReport) {
    println!("{} ({})", report.origin, report.resolved_origin);
    for result in &report.results {
        match result.measured() {
            Some((km, minutes)) => println!(
                "  {}: {km:.2}公里, 预计{minutes}分钟",
                result.destination().name
            ),
            None => println!(
                "  {}: 失败 {}",
                result.destination().name,
                failure_detail(result)
            ),
        }
    }
    println!(
        "成功 {}/{}",
        report.success_count(),
        report.results.len()
    );
}

/// `[status] 尝试N次, error | 原始回复: ...` for a failed pair.
pub(crate) fn failure_detail(result: &DistanceResult) -> String {
    let mut detail = format!("[{}] 尝试{}次", result.status(), result.attempts());
    if let Some(error) = result.error() {
        detail.push_str(", ");
        detail.push_str(error);
    }
    if let Some(raw) = result.raw_response() {
        detail.push_str(" | 原始回复: ");
        detail.push_str(raw);
    }
    detail
}
