// crates/cli/src/commands/build.rs
use std::collections::HashMap;

use anyhow::{anyhow, Result};
use tracing::info;

use quizforge_jobs::{JobHandle, JobState};
use quizforge_types::{ActivityId, GameId};

use super::{follow_all, Context};
use crate::render;

pub async fn run(ctx: &Context, activity_id: ActivityId, game_id: GameId, no_wait: bool) -> Result<bool> {
    let handle = ctx.registry.submit(activity_id, game_id);
    info!(activity_id, game_id, state = handle.state.as_str(), "Build requested");

    if no_wait {
        let mut rx = ctx
            .registry
            .subscribe(activity_id)
            .ok_or_else(|| anyhow!("Activity {activity_id} is not tracked"))?;
        // Wait for the start call to resolve; the server keeps building after we exit.
        let accepted = rx
            .wait_for(|h| h.state != JobState::Submitting)
            .await
            .map(|h| JobHandle::clone(&h))
            .map_err(|_| anyhow!("Build tracking for activity {activity_id} stopped"))?;

        let label = format!("Activity {activity_id}");
        eprintln!("  {}", render::handle_line(&accepted, &label));
        ctx.emit_json(&accepted)?;
        return Ok(accepted.state != JobState::Failed);
    }

    let labels = HashMap::from([(activity_id, format!("Activity {activity_id}"))]);
    let finished = follow_all(&ctx.registry, &[activity_id], &labels).await;
    ctx.emit_json(&finished)?;
    Ok(!finished.is_empty() && finished.iter().all(|h| h.state == JobState::Completed))
}
