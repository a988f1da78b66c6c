//! Scenario runner for the padlock behavior model.
//!
//! Scenarios are YAML files listing triggers to fire and what must hold
//! after each one. They run against the device table through a dry-run
//! hardware adapter, so a scenario can be checked before it is pointed at a
//! physical rig.
//!
//! ## Architecture
//!
//! ```text
//! padlock-rig
//!   ├─ Scenario         (YAML schema)
//!   ├─ run_scenario     (fires steps, checks expectations)
//!   ├─ DryRunHardware   (logs calls, answers from the scenario script)
//!   └─ Report           (JSON, one entry per scenario)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dry_run;
mod error;
mod runner;
pub mod scenario;

use std::path::PathBuf;

pub use dry_run::{DryRunHardware, HardwareScript};
pub use error::RigError;
pub use runner::{FollowedTrigger, ScenarioReport, StepReport, run_scenario};
pub use scenario::{Expectation, Outcome, Scenario, Step};
use serde::Serialize;

/// Scenario runner options.
#[derive(Debug, Clone, Default)]
pub struct RigConfig {
    /// Keep running a scenario's steps after an expectation fails.
    pub keep_going: bool,
    /// Attach the final DUT snapshot to each scenario report.
    pub include_snapshot: bool,
}

/// Report for a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Every scenario passed.
    pub passed: bool,
    /// One entry per scenario, in the order given.
    pub scenarios: Vec<ScenarioReport>,
}

impl Report {
    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, RigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Loads and runs every scenario file in order.
///
/// A file that cannot be loaded aborts the run; failed expectations do not.
pub fn run_files(paths: &[PathBuf], config: &RigConfig) -> Result<Report, RigError> {
    let mut scenarios = Vec::with_capacity(paths.len());
    for path in paths {
        let scenario = Scenario::load(path)?;
        let report = run_scenario(&scenario, config)?;
        tracing::info!(scenario = %report.name, passed = report.passed, "scenario finished");
        scenarios.push(report);
    }
    Ok(Report { passed: scenarios.iter().all(|s| s.passed), scenarios })
}
