pub mod task_spawn_tokio;
