use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::defaults::{default_runtime, parse_human_duration};
use super::types::ToolSettings;
use super::util::expand_tilde;
use crate::error::{GpgCfgError, Result};
use crate::platform::paths;

/// Environment variable that points at a settings file.
pub const CONFIG_ENV_VAR: &str = "GPGCFG_CONFIG";

/// Raw shape of the YAML settings file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsDocument {
    #[serde(default)]
    gpgconf: Option<String>,
    #[serde(default)]
    homedir: Option<String>,
    #[serde(default)]
    timeout: Option<String>,
    #[serde(default = "default_runtime")]
    runtime: bool,
}

impl SettingsDocument {
    fn resolve(self) -> Result<ToolSettings> {
        let timeout = self
            .timeout
            .as_deref()
            .map(parse_human_duration)
            .transpose()?;
        Ok(ToolSettings {
            gpgconf: non_empty(self.gpgconf).map(|p| expand_tilde(&p)),
            homedir: non_empty(self.homedir).map(|p| expand_tilde(&p)),
            timeout,
            runtime: self.runtime,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse settings from YAML text. `origin` is only used in error messages.
pub fn parse_settings(text: &str, origin: &Path) -> Result<ToolSettings> {
    if is_blank_document(text) {
        return Ok(ToolSettings::default());
    }
    let doc: SettingsDocument = serde_yaml::from_str(text)
        .map_err(|e| GpgCfgError::Config(format!("{}: {e}", origin.display())))?;
    doc.resolve()
}

// A file holding nothing but comments is a valid, empty settings file.
fn is_blank_document(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

pub fn load_settings(path: &Path) -> Result<ToolSettings> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| GpgCfgError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_settings(&text, path)
}

/// Where a settings file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CliArg(PathBuf),
    EnvVar(PathBuf),
    SearchOrder { path: PathBuf, level: &'static str },
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::CliArg(p) | ConfigSource::EnvVar(p) => p,
            ConfigSource::SearchOrder { path, .. } => path,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CliArg(p) => write!(f, "{} (--config)", p.display()),
            ConfigSource::EnvVar(p) => write!(f, "{} ({CONFIG_ENV_VAR})", p.display()),
            ConfigSource::SearchOrder { path, level } => {
                write!(f, "{} ({level})", path.display())
            }
        }
    }
}

/// Candidate settings files, most specific first.
pub fn default_config_search_paths() -> Vec<(PathBuf, &'static str)> {
    let mut paths = vec![(PathBuf::from("gpgcfg.yaml"), "project")];

    if let Some(dir) = paths::user_config_dir() {
        paths.push((dir.join("config.yaml"), "user"));
    }

    #[cfg(windows)]
    {
        let program_data = std::env::var_os("PROGRAMDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"));
        paths.push((program_data.join("gpgcfg").join("config.yaml"), "system"));
    }

    #[cfg(not(windows))]
    {
        paths.push((PathBuf::from("/etc/gpgcfg/config.yaml"), "system"));
    }

    paths
}

/// Resolve which settings file to use.
///
/// Priority: CLI arg > `GPGCFG_CONFIG` env var > first existing file from
/// the search paths. Returns `None` if nothing is found.
pub fn resolve_config_path(cli_config: Option<&str>) -> Option<ConfigSource> {
    if let Some(path) = cli_config {
        return Some(ConfigSource::CliArg(PathBuf::from(path)));
    }

    if let Ok(val) = std::env::var(CONFIG_ENV_VAR) {
        if !val.is_empty() {
            return Some(ConfigSource::EnvVar(PathBuf::from(val)));
        }
    }

    default_config_search_paths()
        .into_iter()
        .find(|(path, _)| path.exists())
        .map(|(path, level)| ConfigSource::SearchOrder { path, level })
}

/// Resolve and load settings. No settings file at all means defaults.
pub fn load_resolved(cli_config: Option<&str>) -> Result<(ToolSettings, Option<ConfigSource>)> {
    match resolve_config_path(cli_config) {
        Some(source) => {
            let settings = load_settings(source.path())?;
            Ok((settings, Some(source)))
        }
        None => Ok((ToolSettings::default(), None)),
    }
}

/// A starter settings file.
pub fn minimal_config_template() -> &'static str {
    r#"# gpgcfg settings
# Every key is optional.

# Path to the gpgconf executable (default: looked up in PATH)
# gpgconf: /usr/bin/gpgconf

# GnuPG home directory, passed to gpgconf as --homedir
# homedir: ~/.gnupg

# Give up on a gpgconf run after this long (ms/s/m/h; default: wait forever)
# timeout: 30s

# Apply changes to running components as well (default: true)
# runtime: true
"#
}
