//! `otdr-cut-locator` library crate.
//!
//! The binary (`cutloc`) is a thin wrapper around this library so that:
//!
//! - the prediction core is testable without spawning processes
//! - the pure modules (`geodesy`, `predict`) can be embedded elsewhere
//!   without the CLI, CSV or HTTP layers

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod geodesy;
pub mod io;
pub mod predict;
pub mod report;
pub mod topology;
