use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;

use crate::config::ToolSettings;
use crate::error::{exit_code_reason, GpgCfgError, Result};
use crate::platform::{paths, shell};

/// The three gpgconf sub-commands the configuration model talks to.
///
/// Every call blocks until the external program has finished.
pub trait GpgConfTool {
    /// Raw stdout of `gpgconf --list-components`.
    fn list_components(&self) -> Result<String>;

    /// Raw stdout of `gpgconf --list-options <component>`.
    fn list_options(&self, component: &str) -> Result<String>;

    /// Run `gpgconf [--runtime] --change-options <component>` with the
    /// contents of `input` on stdin.
    fn change_options(&self, component: &str, runtime: bool, input: &Path) -> Result<()>;
}

impl<T: GpgConfTool + ?Sized> GpgConfTool for &T {
    fn list_components(&self) -> Result<String> {
        (**self).list_components()
    }

    fn list_options(&self, component: &str) -> Result<String> {
        (**self).list_options(component)
    }

    fn change_options(&self, component: &str, runtime: bool, input: &Path) -> Result<()> {
        (**self).change_options(component, runtime, input)
    }
}

/// [`GpgConfTool`] backed by the real `gpgconf` executable.
#[derive(Debug, Clone)]
pub struct ProcessGpgConf {
    program: PathBuf,
    homedir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessGpgConf {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            homedir: None,
            timeout: None,
        }
    }

    /// Use the `gpgconf` found in `PATH`, or the bare program name so that
    /// the spawn error is what callers get to see.
    pub fn discover() -> Self {
        let program = paths::find_executable("gpgconf").unwrap_or_else(|| {
            tracing::debug!("gpgconf not found in PATH");
            PathBuf::from("gpgconf")
        });
        Self::new(program)
    }

    pub fn from_settings(settings: &ToolSettings) -> Self {
        let tool = match &settings.gpgconf {
            Some(program) => Self::new(program),
            None => Self::discover(),
        };
        Self {
            homedir: settings.homedir.clone(),
            timeout: settings.timeout,
            ..tool
        }
    }

    pub fn with_homedir(mut self, homedir: impl Into<PathBuf>) -> Self {
        self.homedir = Some(homedir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_display(&self) -> String {
        self.program.display().to_string()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(homedir) = &self.homedir {
            cmd.arg("--homedir").arg(homedir);
        }
        cmd
    }

    fn run(&self, cmd: &mut Command) -> Result<Output> {
        shell::run_command(cmd, self.timeout).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                GpgCfgError::ToolTimeout(self.timeout.unwrap_or_default())
            } else {
                GpgCfgError::ToolNotStarted {
                    program: self.program_display(),
                    source: e,
                }
            }
        })
    }

    fn query(&self, args: &[&str]) -> Result<String> {
        let mut cmd = self.command();
        cmd.args(args);
        tracing::debug!("running {} {}", self.program_display(), args.join(" "));

        let output = self.run(&mut cmd)?;
        log_stderr(&output);

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        match output.status.code() {
            Some(code) => Err(GpgCfgError::from_exit_code(code)),
            None => Err(GpgCfgError::ToolCrashed),
        }
    }

    #[cfg(not(windows))]
    fn change_command(&self, component: &str, runtime: bool, input: &Path) -> Result<Command> {
        let mut line = shell::shell_escape(&self.program.to_string_lossy());
        if let Some(homedir) = &self.homedir {
            line.push_str(" --homedir ");
            line.push_str(&shell::shell_escape(&homedir.to_string_lossy()));
        }
        if runtime {
            line.push_str(" --runtime");
        }
        line.push_str(" --change-options ");
        line.push_str(&shell::shell_escape(component));
        line.push_str(" < ");
        line.push_str(&shell::shell_escape(&input.to_string_lossy()));
        tracing::debug!("running {line}");
        Ok(shell::command_for_script(&line))
    }

    #[cfg(windows)]
    fn change_command(&self, component: &str, runtime: bool, input: &Path) -> Result<Command> {
        let mut cmd = self.command();
        if runtime {
            cmd.arg("--runtime");
        }
        cmd.arg("--change-options").arg(component);
        cmd.stdin(std::fs::File::open(input)?);
        Ok(cmd)
    }
}

impl GpgConfTool for ProcessGpgConf {
    fn list_components(&self) -> Result<String> {
        self.query(&["--list-components"])
    }

    fn list_options(&self, component: &str) -> Result<String> {
        self.query(&["--list-options", component])
    }

    fn change_options(&self, component: &str, runtime: bool, input: &Path) -> Result<()> {
        let mut cmd = self.change_command(component, runtime, input)?;
        let output = match self.run(&mut cmd) {
            Ok(output) => output,
            Err(GpgCfgError::ToolNotStarted { .. }) => {
                return Err(GpgCfgError::SyncNotStarted {
                    component: component.to_string(),
                });
            }
            Err(e) => return Err(e),
        };
        log_stderr(&output);

        match output.status.code() {
            Some(0) => Ok(()),
            // the shell could not find or execute gpgconf
            Some(126) | Some(127) if cfg!(not(windows)) => Err(GpgCfgError::SyncNotStarted {
                component: component.to_string(),
            }),
            Some(code) => Err(GpgCfgError::SyncFailed {
                component: component.to_string(),
                reason: exit_code_reason(code),
            }),
            None => Err(GpgCfgError::SyncFailed {
                component: component.to_string(),
                reason: "program terminated unexpectedly".to_string(),
            }),
        }
    }
}

fn log_stderr(output: &Output) {
    if !output.stderr.is_empty() {
        tracing::debug!(
            "gpgconf stderr: {}",
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }
}
