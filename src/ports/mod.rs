//! Port traits the domain talks through.

pub mod classifier_port;
pub mod config_port;
pub mod data_port;
pub mod report_port;
