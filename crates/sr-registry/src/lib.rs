//! sr-registry - persistent registry of raw SQL call sites
//!
//! Loads and saves the registry file, runs each newly discovered call
//! through eligibility, conversion and validation, and renders the
//! Markdown status report.

pub mod error;
pub mod git;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod store;

pub use error::{RegistryError, RegistryResult};
pub use pipeline::{Analyzer, Outcome, INELIGIBLE, UNPARSABLE};
pub use registry::{Registry, ScanSummary};
pub use report::generate_report;
pub use store::{Metadata, RegistryData, SCHEMA_VERSION};
