use tokio::runtime::Handle;
use tracing::warn;

use stylist_application::ports::outgoing::task_spawn::{DetachedTask, TaskSpawnPort};

/// Spawns onto the ambient tokio runtime. Outside a runtime the task is
/// dropped with a warning instead of panicking, since callers spawn from
/// `Drop`.
#[derive(Debug, Default)]
pub struct TokioTaskSpawner;

impl TokioTaskSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl TaskSpawnPort for TokioTaskSpawner {
    fn spawn(&self, task: DetachedTask) {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(e) => warn!(error = %e, "No runtime to run detached task, skipping"),
        }
    }
}
