// crates/cli/src/commands/watch.rs
use std::collections::HashMap;

use anyhow::{Context as _, Result};
use tracing::info;

use quizforge_jobs::{JobState, StatusReconciler};

use super::{follow_all, Context};
use crate::render;

pub async fn run(ctx: &Context) -> Result<bool> {
    let rows = ctx
        .client
        .list_activities()
        .await
        .context("Failed to list activities")?;

    let report = StatusReconciler::new(ctx.registry.clone()).reconcile_activities(&rows);
    info!(
        activities = rows.len(),
        attached = report.attached.len(),
        seeded = report.seeded.len(),
        "Reconciled server build status"
    );

    let labels: HashMap<_, _> = rows
        .iter()
        .map(|row| {
            let label = if row.name.is_empty() {
                format!("Activity {}", row.id)
            } else {
                row.name.clone()
            };
            (row.id, label)
        })
        .collect();

    for handle in ctx.registry.snapshot() {
        if handle.state.is_terminal() {
            let label = labels.get(&handle.activity_id).map(String::as_str).unwrap_or("?");
            eprintln!("  {}", render::handle_line(&handle, label));
        }
    }

    let active: Vec<_> = ctx.registry.active_jobs().iter().map(|h| h.activity_id).collect();
    if active.is_empty() {
        eprintln!("  No builds in progress");
        ctx.emit_json(&ctx.registry.snapshot())?;
        return Ok(true);
    }

    let finished = follow_all(&ctx.registry, &active, &labels).await;
    ctx.emit_json(&ctx.registry.snapshot())?;
    Ok(finished.len() == active.len() && finished.iter().all(|h| h.state == JobState::Completed))
}
