use std::path::PathBuf;
use std::time::Duration;

use super::defaults::default_runtime;

/// Resolved settings for talking to gpgconf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    /// Explicit gpgconf executable. `None` means look it up in `PATH`.
    pub gpgconf: Option<PathBuf>,
    /// GnuPG home directory, passed as `--homedir`.
    pub homedir: Option<PathBuf>,
    /// Upper bound for a single gpgconf run. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Whether changes are also applied to running components.
    pub runtime: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            gpgconf: None,
            homedir: None,
            timeout: None,
            runtime: default_runtime(),
        }
    }
}
