//! Human-readable plan formatting.

use crate::assignor::StandbyPlan;

pub fn format_plan(plan: &StandbyPlan) -> String {
    let mut out = String::new();

    let processes = plan.standby_tasks.len();
    let tasks = plan.remaining.len();
    out.push_str(&format!(
        "Standby plan: {} standbys across {processes} processes for {tasks} stateful tasks\n\n",
        plan.total_standbys()
    ));

    out.push_str("Processes:\n");
    for (process, standbys) in &plan.standby_tasks {
        let load = plan.loads.get(process).copied().unwrap_or(0);
        let list = standbys
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("  {process:<20} load {load:>4}  standby [{list}]\n"));
    }

    if plan.shortfalls.is_empty() {
        out.push_str("\nAll stateful tasks fully replicated.\n");
        return out;
    }

    out.push_str(&format!("\nUNDER-REPLICATED ({}):\n", plan.shortfalls.len()));
    for s in &plan.shortfalls {
        out.push_str(&format!(
            "  {}  assigned {} of {} (missing {})\n",
            s.task_id,
            s.assigned(),
            s.requested,
            s.unassigned
        ));
    }
    out.push_str("\nAdd instances or lower num_standby_replicas to close the gap.\n");

    out
}
