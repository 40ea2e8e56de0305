//! sr-scan - Raw SQL call-site scanner
//!
//! Walks Python syntax trees for calls of the configured
//! `<namespace>.<attribute>.<method>` shape whose first argument is a literal
//! string, and records the SQL together with its bindings, keyword
//! arguments, enclosing function and how the result is consumed.

pub mod context;
pub mod discover;
pub mod error;
pub mod literal;
pub mod params;
pub mod scanner;

pub use discover::{discover_files, relative_path};
pub use error::{ScanError, ScanResult};
pub use scanner::{CallScanner, CallSite};
