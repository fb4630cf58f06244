//! Concrete port implementations.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod csv_sink_adapter;
