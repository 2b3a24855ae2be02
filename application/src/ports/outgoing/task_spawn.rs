use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type DetachedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs work that must finish even when the request that started it is
/// dropped. Callable from `Drop`.
pub trait TaskSpawnPort: Send + Sync {
    fn spawn(&self, task: DetachedTask);
}

pub type DynTaskSpawnPort = Arc<dyn TaskSpawnPort>;
