//! CLI command implementations

pub mod doctor;
pub mod report;
pub mod sync;
