//! VARIES Vault Accessor
//!
//! Local account vault, an in-memory table editor and chart/report
//! analytics over those tables.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod stats;
pub mod vault;
