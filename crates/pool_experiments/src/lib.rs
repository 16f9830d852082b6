//! Experimentation harness for the consolidation engine.
//!
//! Runs seeded scenarios through successive consolidation passes, extracts
//! aggregate metrics, and exports results for analysis — e.g. to study how
//! the capacity floor trades match rate against group size.
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::{TimeZone, Utc};
//! use pool_experiments::{run_experiment, ExperimentParams};
//!
//! let params = ExperimentParams {
//!     minimum_passengers: 4,
//!     seed: 42,
//!     passes: 3,
//!     first_trigger: Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap(),
//! };
//! let run = run_experiment(&params).expect("experiment");
//! println!("match rate: {:.2}", run.result.match_rate);
//! ```

pub mod export;
pub mod metrics;
pub mod runner;

pub use export::{export_to_csv, export_to_json};
pub use metrics::ExperimentResult;
pub use runner::{run_experiment, ExperimentParams, ExperimentRun};
