// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - http: the Probe trait and the reqwest-based HEAD probe
// - monitor: run state, counters and progress reporting shared by all tasks
// - pool: the worker pool that probes every bookmark
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod http;
mod monitor;
mod pool;

pub use http::{HttpProbe, Probe, ProbeFailure, ProbeOutcome};
pub use monitor::{
    CheckResult, Counters, InvalidLink, Monitor, RunGuard, RunState, StatusSink, TracingStatus,
};
pub use pool::{CheckReport, ValidityChecker};
