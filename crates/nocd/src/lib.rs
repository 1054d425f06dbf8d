//! NOC Daemon - serves the diagnosis engine over HTTP
//!
//! Owns the concrete collaborators: the SQLite work-order store, the
//! flat-file solution documents, the static structured-lookup table,
//! and the per-NE optical reading table.

pub mod lookup;
pub mod readings;
pub mod routes;
pub mod server;
pub mod solutions;
pub mod store;
