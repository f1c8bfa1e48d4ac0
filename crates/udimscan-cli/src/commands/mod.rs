//! CLI command implementations

pub mod analyze;
pub mod init_config;
