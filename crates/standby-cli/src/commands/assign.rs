//! `standbyctl assign` and `standbyctl check`.

use std::path::Path;

use anyhow::{Context, Result, bail};
use standby_assignor::{StandbyAssignor, StandbyPlan, format_plan, validate_snapshot};
use standby_core::{AssignorConfig, ClusterSnapshot};
use tracing::info;

/// Command-line values that win over standby.toml.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub replicas: Option<u32>,
    pub max_tasks: Option<u32>,
}

pub fn assign(snapshot: &Path, config: Option<&Path>, overrides: Overrides, format: &str) -> Result<()> {
    let plan = plan(snapshot, config, overrides)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
        "text" => print!("{}", format_plan(&plan)),
        other => bail!("Unsupported output format: {other} (expected text or json)"),
    }

    Ok(())
}

pub fn check(snapshot: &Path) -> Result<()> {
    let snapshot = load_snapshot(snapshot)?;
    validate_snapshot(&snapshot)?;
    println!(
        "✓ snapshot ok: {} processes, {} stateful tasks",
        snapshot.processes.len(),
        snapshot.stateful_tasks.len()
    );
    Ok(())
}

/// Load inputs and run one assignment pass.
fn plan(snapshot: &Path, config: Option<&Path>, overrides: Overrides) -> Result<StandbyPlan> {
    let config = load_config(config, overrides)?;
    let snapshot = load_snapshot(snapshot)?;

    info!(
        replicas = config.num_standby_replicas(),
        max_tasks_per_process = ?config.max_tasks_per_process(),
        "running standby assignment"
    );

    let plan = StandbyAssignor::from_config(&config).assign(&snapshot)?;
    Ok(plan)
}

fn load_snapshot(path: &Path) -> Result<ClusterSnapshot> {
    ClusterSnapshot::from_file(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))
}

/// Read standby.toml if given, then apply command-line overrides.
fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<AssignorConfig> {
    let mut config = match path {
        Some(path) => AssignorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AssignorConfig::default(),
    };

    if let Some(replicas) = overrides.replicas {
        config.assignor.num_standby_replicas = replicas;
    }
    if let Some(max_tasks) = overrides.max_tasks {
        config.assignor.max_tasks_per_process = Some(max_tasks);
    }

    Ok(config)
}
