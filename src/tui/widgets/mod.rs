//! TUI widgets

pub mod breakdown;
pub mod header;
pub mod help;
pub mod overview;
pub mod providers;
pub mod spinner;
pub mod tabs;
pub mod trend;
