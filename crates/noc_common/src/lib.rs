//! NOC Common - Shared types and the diagnosis core for the NOC assistant
//!
//! The diagnosis engine replays a named rule set against an alarm work
//! order, injecting a simulated failure at one step, and produces one
//! inference per replayed step. Everything external (work-order store,
//! optical readings, structured lookups, solution documents) is behind a
//! trait so the engine can be tested with synthetic collaborators.

pub mod api;
pub mod catalog;
pub mod config;
pub mod details;
pub mod diagnosis;
pub mod error;
pub mod measurement;
pub mod placeholder;
pub mod solution;
pub mod work_order;

pub use api::*;
pub use catalog::*;
pub use config::NocdConfig;
pub use diagnosis::{classify, DiagnosisEngine, Inference};
pub use error::{CatalogError, DiagnosisError};
pub use measurement::{MeasurementEvaluator, OpticalPortReading, OpticalReadingSource, Verdict};
pub use placeholder::{resolve_template, StructuredLookup};
pub use solution::{resolve_solution, SolutionStore};
pub use work_order::{WorkOrder, WorkOrderStore};
