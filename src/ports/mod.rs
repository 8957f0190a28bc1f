//! Port traits: the boundary between domain logic and file I/O.

pub mod config_port;
pub mod data_port;
pub mod report_port;
