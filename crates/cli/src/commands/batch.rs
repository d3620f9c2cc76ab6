// crates/cli/src/commands/batch.rs
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use quizforge_batch::{BatchExecutor, BatchOutcome, RecordService};
use quizforge_jobs::{JobHandle, JobState};
use quizforge_types::{MAX_QUESTIONS, MIN_QUESTIONS};

use super::{follow_all, Context};
use crate::plan_file::BatchPlanFile;
use crate::render;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchReport<'a> {
    outcome: &'a BatchOutcome,
    builds: &'a [JobHandle],
}

pub async fn run(ctx: &Context, plan_path: &Path, build: bool) -> Result<bool> {
    let plan = BatchPlanFile::load(plan_path)?;
    for issue in plan.issues() {
        eprintln!("  ! Skipping {}", issue.message());
    }

    let requests = plan.requests();
    if requests.is_empty() {
        bail!(
            "Nothing to create: no question type has between {MIN_QUESTIONS} and {MAX_QUESTIONS} questions selected"
        );
    }

    let pb = ProgressBar::new(requests.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("  {bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let service: Arc<dyn RecordService> = ctx.client.clone();
    let outcome = BatchExecutor::new(service)
        .run(requests, |progress| {
            pb.set_position(progress.current as u64);
            pb.set_message(progress.current_label.clone());
            if let Some(err) = &progress.error {
                pb.println(format!("  \u{2717} {}: {}", progress.current_label, err));
            }
        })
        .await;
    pb.finish_and_clear();
    eprintln!("  {}", render::batch_summary(&outcome));

    let mut ok = outcome.failed_names.is_empty();
    let mut builds = Vec::new();
    if build && !outcome.created.is_empty() {
        let mut labels = HashMap::new();
        let mut ids = Vec::with_capacity(outcome.created.len());
        for created in &outcome.created {
            ctx.registry.submit(created.activity_id, created.game_id);
            labels.insert(created.activity_id, created.display_name.clone());
            ids.push(created.activity_id);
        }
        builds = follow_all(&ctx.registry, &ids, &labels).await;
        ok &= builds.len() == ids.len() && builds.iter().all(|h| h.state == JobState::Completed);
    }

    ctx.emit_json(&BatchReport {
        outcome: &outcome,
        builds: &builds,
    })?;
    Ok(ok)
}
