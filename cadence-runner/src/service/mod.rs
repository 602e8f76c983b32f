//! Service layer
//!
//! The three capabilities the poller is built from: the task it invokes,
//! the clock it reads and sleeps on, and the run log it appends to.
//!
//! All services are trait-based so the poller can be tested without real
//! processes or real time.

mod clock;
mod run_log;
mod task;

// Re-export traits
pub use clock::Clock;
pub use run_log::RunLog;
pub use task::Invocable;

// Re-export implementations
pub use clock::SystemClock;
pub use run_log::FileRunLog;
pub use task::{ProcessTask, TaskFailure, TaskOutcome};

#[cfg(test)]
pub use run_log::InMemoryRunLog;
