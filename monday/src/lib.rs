//! monday reporter: reads the configured servers, asks each agent for a
//! snapshot and prints a text report.

pub mod config;
pub mod fetch;
pub mod render;
pub mod report;
