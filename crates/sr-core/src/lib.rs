//! sr-core - Core library for sqlreg
//!
//! Shared types for the raw-SQL registry: the persisted call-site record,
//! parameter bindings, consumption modes, configuration and the hashing used
//! to give every call site a stable identity.

pub mod call;
pub mod checksum;
pub mod config;
pub mod entity;
pub mod error;
pub mod marker;
pub mod param;

pub use call::{ConsumptionMode, ConversionStatus, SqlCall};
pub use checksum::{call_id, compute_checksum};
pub use config::{CalleeShape, Config, Dialect, ScanConfig};
pub use entity::EntityName;
pub use error::{CoreError, CoreResult};
pub use param::{positional_key, python_string, LiteralValue, ParamMap, ParamValue};
