//! Command implementations for the caudal binary.

pub mod check;
pub mod report;
