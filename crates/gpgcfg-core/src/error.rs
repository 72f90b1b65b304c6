use std::time::Duration;

use thiserror::Error;

use crate::model::ArgType;

pub type Result<T> = std::result::Result<T, GpgCfgError>;

#[derive(Debug, Error)]
pub enum GpgCfgError {
    #[error("failed to execute gpgconf: program not found or cannot be started ('{program}': {source})")]
    ToolNotStarted {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to execute gpgconf: program terminated unexpectedly")]
    ToolCrashed,

    #[error("failed to execute gpgconf: {reason} (exit code {code})")]
    ToolExit { code: i32, reason: String },

    #[error("gpgconf did not finish within {0:?}")]
    ToolTimeout(Duration),

    #[error(
        "could not start gpgconf to save '{component}'; check that gpgconf is in the PATH and that it can be started"
    )]
    SyncNotStarted { component: String },

    #[error("error from gpgconf while saving configuration of '{component}': {reason}")]
    SyncFailed { component: String, reason: String },

    #[error("option '{entry}' has type {actual}, accessor requires {expected}")]
    WrongArgType {
        entry: String,
        expected: &'static str,
        actual: ArgType,
    },

    #[error("option '{0}' is a list, use the list accessor")]
    IsList(String),

    #[error("option '{0}' is not a list")]
    NotList(String),

    #[error("invalid URL for option '{entry}': {reason}")]
    InvalidUrl { entry: String, reason: String },

    #[error("unknown component: '{0}'")]
    UnknownComponent(String),

    #[error("unknown option '{entry}' in component '{component}'")]
    UnknownEntry { component: String, entry: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GpgCfgError {
    /// Build the error for a gpgconf run that exited with a non-zero code.
    ///
    /// gpgconf reports failures with errno-style exit codes, so the reason is
    /// the system's text for that errno.
    pub(crate) fn from_exit_code(code: i32) -> Self {
        GpgCfgError::ToolExit {
            code,
            reason: exit_code_reason(code),
        }
    }
}

pub(crate) fn exit_code_reason(code: i32) -> String {
    std::io::Error::from_raw_os_error(code).to_string()
}
