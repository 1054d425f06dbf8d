//! Error taxonomy for the diagnosis core
//!
//! Two families, kept apart on purpose:
//! - `CatalogError`: a rule set or measurement name missing from the
//!   loaded catalog. Configuration problem, surfaced to the caller.
//! - `DiagnosisError`: what `diagnose` can fail with. A missing work
//!   order is NOT an error (empty result); only catalog gaps and
//!   store I/O reach the caller as failures.

use thiserror::Error;

/// Catalog lookup failures. These mean the deployed configuration is
/// incomplete, not that the incident under diagnosis is faulty.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("rule set '{0}' is not defined in the catalog")]
    RuleSetNotFound(String),

    #[error("measurement '{0}' is not defined in the catalog")]
    MeasurementNotFound(String),
}

/// Failures of a single `diagnose` invocation.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("work order store failure: {0}")]
    Store(#[source] anyhow::Error),
}
