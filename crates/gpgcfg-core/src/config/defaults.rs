use std::time::Duration;

use crate::error::{GpgCfgError, Result};

pub(super) fn default_runtime() -> bool {
    true
}

/// Parse a timeout such as `500ms`, `45s`, `5m` or `1h`.
/// A bare number is taken as seconds.
pub fn parse_human_duration(raw: &str) -> Result<Duration> {
    let input = raw.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, suffix) = input.split_at(split);
    if digits.is_empty() {
        return Err(GpgCfgError::Config(format!("invalid duration: '{raw}'")));
    }
    let count: u64 = digits
        .parse()
        .map_err(|_| GpgCfgError::Config(format!("invalid duration: '{raw}'")))?;

    let duration = match suffix.to_ascii_lowercase().as_str() {
        "ms" => Duration::from_millis(count),
        "" | "s" => Duration::from_secs(count),
        "m" => Duration::from_secs(count.saturating_mul(60)),
        "h" => Duration::from_secs(count.saturating_mul(3600)),
        other => {
            return Err(GpgCfgError::Config(format!(
                "unknown duration unit '{other}' in '{raw}' (expected ms, s, m or h)"
            )));
        }
    };

    if duration.is_zero() {
        return Err(GpgCfgError::Config(format!("timeout '{raw}' must be positive")));
    }
    Ok(duration)
}
