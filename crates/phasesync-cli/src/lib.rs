//! Configuration and logging setup for the `phasesync` binary.

pub mod config;
pub mod observability;

pub use config::AppConfig;
pub use config::loader::load_config;
