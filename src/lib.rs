//! cloudcost - multi-cloud cost dashboard
//!
//! The aggregation core lives in [`services::Aggregator`]; everything else
//! fetches snapshots for it or renders what it computes.

pub mod cli;
pub mod services;
pub mod tui;
pub mod types;
