use std::path::PathBuf;

use crate::platform::paths;

/// Turn a settings path into a `PathBuf`, resolving `~` and `~/...`
/// against the home directory. `~user` forms are taken literally.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => return PathBuf::from(path),
    };
    match paths::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}
