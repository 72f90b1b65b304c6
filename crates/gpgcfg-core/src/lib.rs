pub mod codec;
pub mod config;
pub mod error;
pub mod ldap;
pub mod model;
pub mod platform;
pub mod registry;
pub mod tool;

pub use error::{GpgCfgError, Result};
pub use registry::CryptoConfig;
pub use tool::{GpgConfTool, ProcessGpgConf};

#[cfg(test)]
mod tests;
#[cfg(test)]
mod testutil;
