use std::path::{Path, PathBuf};

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// `$HOME`, or the passwd entry of the effective user when it is unset.
#[cfg(unix)]
pub fn home_dir() -> Option<PathBuf> {
    if let Some(home) = env_path("HOME") {
        return Some(home);
    }
    let user = nix::unistd::User::from_uid(nix::unistd::Uid::effective()).ok()??;
    Some(user.dir)
}

#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
    env_path("USERPROFILE")
}

/// Per-user directory holding gpgcfg's settings file.
pub fn user_config_dir() -> Option<PathBuf> {
    platform_config_root().map(|root| root.join("gpgcfg"))
}

#[cfg(target_os = "macos")]
fn platform_config_root() -> Option<PathBuf> {
    home_dir().map(|h| h.join("Library/Application Support"))
}

#[cfg(windows)]
fn platform_config_root() -> Option<PathBuf> {
    env_path("APPDATA")
}

// XDG base directory spec: relative values are invalid and ignored
#[cfg(all(unix, not(target_os = "macos")))]
fn platform_config_root() -> Option<PathBuf> {
    match env_path("XDG_CONFIG_HOME") {
        Some(dir) if dir.is_absolute() => Some(dir),
        _ => home_dir().map(|h| h.join(".config")),
    }
}

#[cfg(windows)]
const EXECUTABLE_SUFFIX: &str = ".exe";
#[cfg(not(windows))]
const EXECUTABLE_SUFFIX: &str = "";

/// Look up an executable by name in `PATH`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let file_name = format!("{name}{EXECUTABLE_SUFFIX}");
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(&file_name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
