//! Command implementations

pub(crate) mod list;
pub(crate) mod prune;
pub(crate) mod report;
pub(crate) mod scan;
pub(crate) mod show;
