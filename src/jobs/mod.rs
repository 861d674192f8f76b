//! Asynchronous job pipeline.
//!
//! Uploads are accepted immediately and processed in the background: the
//! handler queues a [`QueuedJob`], the worker pool hands it to the
//! [`JobRunner`], and clients poll the [`JobStore`] until the job reaches a
//! terminal state.

pub mod queue;
pub mod runner;
pub mod store;
pub mod worker;

pub use queue::{JobQueue, QueueFull, QueuedJob};
pub use runner::JobRunner;
pub use store::{JobStore, MemoryJobStore};
pub use worker::spawn_workers;
