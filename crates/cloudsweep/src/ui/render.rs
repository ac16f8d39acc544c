//! Terminal progress rendering with indicatif

use crate::tasks::{DeletionTask, TaskEvent, TaskSummary};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;

const TICK: Duration = Duration::from_millis(100);

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Spinner shown while listings are running
pub fn discovery_spinner(kinds: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_prefix("Discovering");
    pb.set_message(format!("listing {kinds} resource kinds..."));
    pb.enable_steady_tick(TICK);
    pb
}

/// Draw one spinner per task and update it from the event channel until
/// every sender is dropped.
pub async fn render_progress(mut rx: mpsc::UnboundedReceiver<TaskEvent>, tasks: &[DeletionTask]) {
    let multi = MultiProgress::new();
    let style = spinner_style();
    let bars: Vec<ProgressBar> = tasks
        .iter()
        .map(|task| {
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(style.clone());
            pb.set_prefix(task.title.clone());
            pb.set_message("waiting");
            pb
        })
        .collect();

    while let Some(event) = rx.recv().await {
        let Some(bar) = bars.get(event.task()) else {
            continue;
        };
        match event {
            TaskEvent::Started { .. } => {
                bar.enable_steady_tick(TICK);
                bar.set_message("starting");
            }
            TaskEvent::Progress { message, .. } => bar.set_message(message),
            TaskEvent::Completed { message, .. } => bar.finish_with_message(format!("✓ {message}")),
            TaskEvent::Failed { error, .. } => bar.abandon_with_message(format!("✗ {error}")),
        }
    }

    for bar in &bars {
        if !bar.is_finished() {
            bar.abandon_with_message("not run");
        }
    }
}

/// Print the per-task outcome after all tasks ran
pub fn print_summary(summaries: &[TaskSummary]) {
    println!("\n=== Sweep Summary ===");
    for summary in summaries {
        let mark = if summary.failed() { "✗" } else { "✓" };
        println!("{mark} {}: {}", summary.title, summary.message());
    }

    let pending: Vec<&str> = summaries
        .iter()
        .flat_map(|s| s.pending.iter().map(String::as_str))
        .collect();
    if !pending.is_empty() {
        println!(
            "\n{} distribution(s) disabled but not yet deleted: {}",
            pending.len(),
            pending.join(", ")
        );
        println!("Run cloudsweep again once they are deployed to finish the deletion.");
    }
}
