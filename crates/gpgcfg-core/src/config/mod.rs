mod defaults;
mod resolve;
mod types;
mod util;

pub use self::defaults::parse_human_duration;
pub use self::resolve::{
    default_config_search_paths, load_resolved, load_settings, minimal_config_template,
    parse_settings, resolve_config_path, ConfigSource, CONFIG_ENV_VAR,
};
pub use self::types::ToolSettings;
pub use self::util::expand_tilde;
