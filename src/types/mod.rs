//! Type definitions for cloudcost

mod billing;
mod error;

pub use billing::*;
pub use error::*;
