//! Deletion tasks
//!
//! The operator's selection becomes one [`DeletionTask`] per kind. Tasks run
//! one after another and items within a task run one at a time, newest
//! first. A task stops at its first unrecoverable error but the remaining
//! tasks still run.

pub mod progress;
pub mod protocol;

pub use progress::{ChannelReporter, LogReporter, TaskEvent, TaskReporter};
pub use protocol::{ItemOutcome, TaskProgress};

use crate::aws::{CloudOperations, RetryPolicy};
use crate::catalog::Selection;
use cloudsweep_common::{Resource, ResourceKind, sort_newest_first};
use serde::Serialize;
use tracing::{info, warn};

/// Deletion of all selected resources of one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTask {
    pub kind: ResourceKind,
    /// e.g. "Delete 3 S3 buckets"
    pub title: String,
    pub items: Vec<Resource>,
}

/// Turn a selection into tasks, one per kind with at least one item, in
/// kind order.
pub fn generate_tasks(selection: &Selection) -> Vec<DeletionTask> {
    selection
        .iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(kind, items)| {
            let mut items = items.clone();
            sort_newest_first(&mut items);
            DeletionTask {
                kind: *kind,
                title: format!("Delete {}", kind.describe_count(items.len())),
                items,
            }
        })
        .collect()
}

/// Result of running one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub kind: ResourceKind,
    pub title: String,
    /// Keys of deleted resources
    pub deleted: Vec<String>,
    /// Keys of resources that were already gone
    pub already_deleted: Vec<String>,
    /// Keys of distributions that need another run
    pub pending: Vec<String>,
    /// Items not attempted because the task failed first
    pub skipped: usize,
    /// Full error chain of the failure, if any
    pub error: Option<String>,
}

impl TaskSummary {
    fn new(task: &DeletionTask) -> Self {
        Self {
            kind: task.kind,
            title: task.title.clone(),
            deleted: Vec::new(),
            already_deleted: Vec::new(),
            pending: Vec::new(),
            skipped: 0,
            error: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// One-line result, used for the completion event and the final summary
    pub fn message(&self) -> String {
        let mut parts = vec![format!(
            "Deleted {}",
            self.kind.describe_count(self.deleted.len())
        )];
        if !self.already_deleted.is_empty() {
            parts.push(format!("{} already gone", self.already_deleted.len()));
        }
        if !self.pending.is_empty() {
            parts.push(format!(
                "re-run later to delete {}",
                self.pending.join(", ")
            ));
        }
        if let Some(error) = &self.error {
            parts.push(format!("{} skipped", self.skipped));
            parts.push(format!("failed: {error}"));
        }
        parts.join("; ")
    }
}

impl DeletionTask {
    /// Run the task, reporting as task number `index`.
    ///
    /// Emits `Started`, a `Progress` event per sub-step, then `Completed`
    /// or `Failed`. Never returns an error: the failure is in the summary.
    pub async fn run<C: CloudOperations>(
        &self,
        index: usize,
        cloud: &C,
        reporter: &dyn TaskReporter,
        retry: &RetryPolicy,
    ) -> TaskSummary {
        let total = self.items.len();
        let progress = TaskProgress::new(reporter, index);
        let mut summary = TaskSummary::new(self);

        reporter.started(index, &self.title, total);
        info!(kind = %self.kind, total, "{}", self.title);

        for (n, item) in self.items.iter().enumerate() {
            match protocol::delete_item(cloud, item, retry, progress).await {
                Ok(ItemOutcome::Deleted) => summary.deleted.push(item.key().to_string()),
                Ok(ItemOutcome::AlreadyDeleted) => {
                    summary.already_deleted.push(item.key().to_string())
                }
                Ok(ItemOutcome::Disabled) => summary.pending.push(item.key().to_string()),
                Err(e) => {
                    let error = format!("{e:#}");
                    warn!(kind = %self.kind, key = %item.key(), error = %error, "Deletion task failed");
                    summary.skipped = total - n - 1;
                    summary.error = Some(error.clone());
                    reporter.failed(index, error);
                    return summary;
                }
            }
        }

        reporter.completed(index, summary.message());
        summary
    }
}

/// Run every task in order; a failed task doesn't stop the ones after it.
pub async fn execute_tasks<C: CloudOperations>(
    cloud: &C,
    tasks: &[DeletionTask],
    reporter: &dyn TaskReporter,
    retry: &RetryPolicy,
) -> Vec<TaskSummary> {
    let mut summaries = Vec::with_capacity(tasks.len());
    for (index, task) in tasks.iter().enumerate() {
        summaries.push(task.run(index, cloud, reporter, retry).await);
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::VersionPage;
    use crate::testing::{MockCloud, at, aws_error};
    use cloudsweep_common::{Bucket, Function, LogGroup, Role};
    use mockall::Sequence;

    fn function(name: &str, secs: i64) -> Resource {
        Resource::Function(Function {
            name: name.into(),
            runtime: Some("nodejs20.x".into()),
            last_modified: at(secs),
        })
    }

    fn log_group(name: &str, secs: i64) -> Resource {
        Resource::LogGroup(LogGroup {
            name: name.into(),
            stored_bytes: Some(0),
            created_at: at(secs),
        })
    }

    fn bucket(name: &str, secs: i64) -> Resource {
        Resource::Bucket(Bucket {
            name: name.into(),
            created_at: at(secs),
        })
    }

    fn role(name: &str, secs: i64) -> Resource {
        Resource::Role(Role {
            name: name.into(),
            arn: format!("arn:aws:iam::123456789012:role/{name}"),
            path: "/".into(),
            created_at: at(secs),
        })
    }

    fn collect(rx: &mut tokio::sync::mpsc::UnboundedReceiver<TaskEvent>) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_one_task_per_selected_kind() {
        let mut selection = Selection::new();
        selection.insert(ResourceKind::Role, vec![role("r", 1)]);
        selection.insert(
            ResourceKind::Bucket,
            vec![bucket("a", 1), bucket("b", 2), bucket("c", 3)],
        );
        selection.insert(ResourceKind::Function, vec![]);

        let tasks = generate_tasks(&selection);
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Delete 3 S3 buckets", "Delete 1 IAM role"]);
    }

    #[test]
    fn test_task_items_are_newest_first() {
        let mut selection = Selection::new();
        selection.insert(
            ResourceKind::Bucket,
            vec![bucket("old", 1), bucket("new", 3), bucket("mid", 2)],
        );
        let tasks = generate_tasks(&selection);
        let keys: Vec<_> = tasks[0].items.iter().map(Resource::key).collect();
        assert_eq!(keys, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_empty_selection_yields_no_tasks() {
        assert!(generate_tasks(&Selection::new()).is_empty());
    }

    #[tokio::test]
    async fn test_task_emits_started_progress_completed() {
        let mut seq = Sequence::new();
        let mut cloud = MockCloud::new();
        for name in ["/aws/lambda/b", "/aws/lambda/a"] {
            cloud
                .expect_delete_log_group()
                .withf(move |group| group == name)
                .once()
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }
        let (reporter, mut rx) = ChannelReporter::channel();
        let task = DeletionTask {
            kind: ResourceKind::LogGroup,
            title: "Delete 2 log groups".into(),
            items: vec![log_group("/aws/lambda/b", 2), log_group("/aws/lambda/a", 1)],
        };

        let summary = task.run(0, &cloud, &reporter, &RetryPolicy::default()).await;
        assert!(!summary.failed());
        assert_eq!(summary.deleted, vec!["/aws/lambda/b", "/aws/lambda/a"]);

        let events = collect(&mut rx);
        assert!(matches!(events.first(), Some(TaskEvent::Started { total: 2, .. })));
        assert!(matches!(events.last(), Some(TaskEvent::Completed { .. })));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, TaskEvent::Progress { .. }))
        );
    }

    #[tokio::test]
    async fn test_failure_skips_rest_of_task() {
        let mut cloud = MockCloud::new();
        cloud
            .expect_delete_function()
            .withf(|name| name == "fn-a")
            .once()
            .returning(|_| Ok(()));
        cloud
            .expect_delete_function()
            .withf(|name| name == "fn-b")
            .once()
            .returning(|_| Err(aws_error("AccessDeniedException")));
        cloud
            .expect_delete_function()
            .withf(|name| name == "fn-c")
            .never();
        let (reporter, mut rx) = ChannelReporter::channel();
        let task = DeletionTask {
            kind: ResourceKind::Function,
            title: "Delete 3 Lambda functions".into(),
            items: vec![function("fn-a", 3), function("fn-b", 2), function("fn-c", 1)],
        };

        let summary = task.run(0, &cloud, &reporter, &RetryPolicy::default()).await;
        assert!(summary.failed());
        assert_eq!(summary.deleted, vec!["fn-a"]);
        assert_eq!(summary.skipped, 1);

        let events = collect(&mut rx);
        match events.last() {
            Some(TaskEvent::Failed { error, .. }) => {
                assert!(error.contains("Failed to delete") || error.contains("AccessDenied"))
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_task_does_not_stop_later_tasks() {
        let mut cloud = MockCloud::new();
        cloud
            .expect_delete_function()
            .once()
            .returning(|_| Err(aws_error("AccessDeniedException")));
        cloud
            .expect_list_object_versions()
            .returning(|_, _| Ok(VersionPage::default()));
        cloud
            .expect_delete_bucket()
            .withf(|bucket| bucket == "b")
            .once()
            .returning(|_| Ok(()));
        let (reporter, mut rx) = ChannelReporter::channel();

        let mut selection = Selection::new();
        selection.insert(ResourceKind::Function, vec![function("fn-a", 1)]);
        selection.insert(ResourceKind::Bucket, vec![bucket("b", 1)]);
        let tasks = generate_tasks(&selection);

        let summaries = execute_tasks(&cloud, &tasks, &reporter, &RetryPolicy::default()).await;
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].failed());
        assert!(!summaries[1].failed());
        assert_eq!(summaries[1].deleted, vec!["b"]);

        let terminal: Vec<_> = collect(&mut rx)
            .into_iter()
            .filter(TaskEvent::is_terminal)
            .collect();
        assert!(matches!(terminal[0], TaskEvent::Failed { task: 0, .. }));
        assert!(matches!(terminal[1], TaskEvent::Completed { task: 1, .. }));
    }

    #[test]
    fn test_summary_message_mentions_pending() {
        let summary = TaskSummary {
            kind: ResourceKind::Distribution,
            title: "Delete 2 CloudFront distributions".into(),
            deleted: vec!["E1".into()],
            already_deleted: vec![],
            pending: vec!["E2".into()],
            skipped: 0,
            error: None,
        };
        assert_eq!(
            summary.message(),
            "Deleted 1 CloudFront distribution; re-run later to delete E2"
        );
    }
}
