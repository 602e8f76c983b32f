//! Scheduler layer for the runner
//!
//! Drives the task on a fixed interval and records each iteration in the
//! run log.

pub mod poller;

pub use poller::SupervisedPoller;
