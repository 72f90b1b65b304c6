use comfy_table::Cell;
use serde::Serialize;

use gpgcfg_core::config::ToolSettings;
use gpgcfg_core::model::{ArgType, Component, ConfigValue, Entry, Level};
use gpgcfg_core::{CryptoConfig, GpgCfgError, GpgConfTool, ProcessGpgConf};

use crate::cli::Commands;
use crate::table::{add_kv_row, CliTableTheme};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn dispatch_command(cmd: &Commands, settings: &ToolSettings) -> CmdResult {
    let tool = ProcessGpgConf::from_settings(settings);
    tracing::debug!("using gpgconf at {}", tool.program().display());
    let mut config = CryptoConfig::new(tool);
    let theme = CliTableTheme::detect();

    match cmd {
        Commands::Components => run_components(&mut config, theme),
        Commands::Options { component, json } => {
            run_options(&mut config, theme, component, *json)
        }
        Commands::Get {
            component,
            option,
            details,
        } => run_get(&mut config, theme, component, option, *details),
        Commands::Set {
            component,
            option,
            value,
            no_runtime,
        } => {
            let runtime = settings.runtime && !no_runtime;
            run_set(&mut config, component, option, value, runtime)
        }
        Commands::Reset {
            component,
            option,
            no_runtime,
        } => {
            let runtime = settings.runtime && !no_runtime;
            run_reset(&mut config, component, option, runtime)
        }
        // handled before settings are loaded
        Commands::Config { .. } => Ok(()),
    }
}

fn run_components<T: GpgConfTool>(config: &mut CryptoConfig<T>, theme: CliTableTheme) -> CmdResult {
    let summaries = config.component_summaries()?;
    if summaries.is_empty() {
        println!("No components.");
        return Ok(());
    }

    let mut table = theme.new_data_table(&["Component", "Description"]);
    for (name, description) in summaries {
        table.add_row(vec![Cell::new(name), Cell::new(description)]);
    }
    println!("{table}");
    Ok(())
}

fn run_options<T: GpgConfTool>(
    config: &mut CryptoConfig<T>,
    theme: CliTableTheme,
    component: &str,
    json: bool,
) -> CmdResult {
    let component = lookup_component(config, component)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ComponentView::new(component))?);
        return Ok(());
    }

    let mut table = theme.new_data_table(&["Group", "Option", "Type", "Level", "Flags", "Value", "Default"]);
    for group in component.groups() {
        for entry in group.entries() {
            table.add_row(vec![
                Cell::new(group.name()),
                Cell::new(entry.name()),
                Cell::new(type_label(entry)),
                Cell::new(entry.level()),
                Cell::new(flag_labels(entry).join(",")),
                Cell::new(if entry.is_set() { entry.string_value() } else { String::new() }),
                Cell::new(display_value(entry, entry.default_value())),
            ]);
        }
    }
    println!("{table}");
    Ok(())
}

fn run_get<T: GpgConfTool>(
    config: &mut CryptoConfig<T>,
    theme: CliTableTheme,
    component: &str,
    option: &str,
    details: bool,
) -> CmdResult {
    let entry = lookup_entry(config, component, option)?;
    if details {
        println!("{}", entry_details(theme, entry));
    } else {
        println!("{}", entry.string_value());
    }
    Ok(())
}

fn run_set<T: GpgConfTool>(
    config: &mut CryptoConfig<T>,
    component: &str,
    option: &str,
    value: &str,
    runtime: bool,
) -> CmdResult {
    let entry = lookup_entry_mut(config, component, option)?;
    check_writable(entry)?;
    check_value(entry, value)?;
    entry.set_string_value(value);
    let path = entry.path().to_string();

    config.sync(runtime)?;
    tracing::info!("{path} updated");
    Ok(())
}

fn run_reset<T: GpgConfTool>(
    config: &mut CryptoConfig<T>,
    component: &str,
    option: &str,
    runtime: bool,
) -> CmdResult {
    let entry = lookup_entry_mut(config, component, option)?;
    check_writable(entry)?;
    entry.reset_to_default();
    let path = entry.path().to_string();

    config.sync(runtime)?;
    tracing::info!("{path} reset to default");
    Ok(())
}

/// Resolve a component, surfacing gpgconf failures instead of reporting
/// every name as unknown.
fn lookup_component<'a, T: GpgConfTool>(
    config: &'a mut CryptoConfig<T>,
    component: &str,
) -> Result<&'a Component, GpgCfgError> {
    config.component_list()?;
    config
        .component(component)
        .ok_or_else(|| GpgCfgError::UnknownComponent(component.to_string()))
}

fn lookup_entry<'a, T: GpgConfTool>(
    config: &'a mut CryptoConfig<T>,
    component: &str,
    option: &str,
) -> Result<&'a Entry, GpgCfgError> {
    lookup_component(config, component)?
        .entry(option)
        .ok_or_else(|| GpgCfgError::UnknownEntry {
            component: component.to_string(),
            entry: option.to_string(),
        })
}

fn lookup_entry_mut<'a, T: GpgConfTool>(
    config: &'a mut CryptoConfig<T>,
    component: &str,
    option: &str,
) -> Result<&'a mut Entry, GpgCfgError> {
    lookup_component(config, component)?;
    config
        .entry_mut(component, option)
        .ok_or_else(|| GpgCfgError::UnknownEntry {
            component: component.to_string(),
            entry: option.to_string(),
        })
}

fn check_writable(entry: &Entry) -> Result<(), String> {
    if entry.is_read_only() {
        return Err(format!("option '{}' cannot be changed", entry.path()));
    }
    Ok(())
}

/// Reject numbers the library would otherwise log and replace by 0.
fn check_value(entry: &Entry, value: &str) -> Result<(), String> {
    let items: Vec<&str> = if entry.is_list() {
        if value.is_empty() {
            Vec::new()
        } else {
            value.split(',').collect()
        }
    } else {
        vec![value]
    };

    let bad = |item: &str, what: &str| {
        format!("invalid {what} '{item}' for option '{}'", entry.path())
    };
    match (entry.arg_type(), entry.is_list()) {
        (ArgType::Int, _) => {
            for item in items.iter().filter(|i| !i.is_empty()) {
                item.trim().parse::<i32>().map_err(|_| bad(item, "integer"))?;
            }
        }
        (ArgType::UInt, _) | (ArgType::None, true) => {
            for item in items.iter().filter(|i| !i.is_empty()) {
                item.trim()
                    .parse::<u32>()
                    .map_err(|_| bad(item, "unsigned integer"))?;
            }
        }
        (ArgType::None, false) => {
            if !matches!(value, "" | "0" | "1" | "true" | "false") {
                return Err(bad(value, "flag value (expected 0 or 1)"));
            }
        }
        _ => {}
    }
    Ok(())
}

fn type_label(entry: &Entry) -> String {
    if entry.is_list() {
        format!("{} list", entry.arg_type())
    } else {
        entry.arg_type().to_string()
    }
}

fn flag_labels(entry: &Entry) -> Vec<&'static str> {
    let mut labels = Vec::new();
    if entry.is_optional() {
        labels.push("optional");
    }
    if entry.is_runtime() {
        labels.push("runtime");
    }
    if entry.has_default() {
        labels.push("default");
    }
    if entry.is_read_only() {
        labels.push("read-only");
    }
    labels
}

fn display_value(entry: &Entry, value: &ConfigValue) -> String {
    match value {
        ConfigValue::Empty => String::new(),
        ConfigValue::Bool(b) => b.to_string(),
        ConfigValue::StringList(items) => items.join(","),
        ConfigValue::String(s) => s.clone(),
        other => gpgcfg_core::codec::encode_value(entry.arg_type(), entry.is_list(), other, false),
    }
}

#[derive(Serialize)]
struct ComponentView<'a> {
    name: &'a str,
    description: &'a str,
    groups: Vec<GroupView<'a>>,
}

#[derive(Serialize)]
struct GroupView<'a> {
    name: &'a str,
    description: &'a str,
    level: Level,
    options: Vec<EntryView<'a>>,
}

#[derive(Serialize)]
struct EntryView<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(rename = "type")]
    arg_type: ArgType,
    level: Level,
    list: bool,
    flags: Vec<&'static str>,
    set: bool,
    value: &'a ConfigValue,
    default: &'a ConfigValue,
}

impl<'a> ComponentView<'a> {
    fn new(component: &'a Component) -> Self {
        ComponentView {
            name: component.name(),
            description: component.description(),
            groups: component
                .groups()
                .map(|group| GroupView {
                    name: group.name(),
                    description: group.description(),
                    level: group.level(),
                    options: group
                        .entries()
                        .map(|entry| EntryView {
                            name: entry.name(),
                            description: entry.description(),
                            arg_type: entry.arg_type(),
                            level: entry.level(),
                            list: entry.is_list(),
                            flags: flag_labels(entry),
                            set: entry.is_set(),
                            value: entry.value(),
                            default: entry.default_value(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Key/value view of one option.
fn entry_details(theme: CliTableTheme, entry: &Entry) -> comfy_table::Table {
    let mut table = theme.new_kv_table();
    add_kv_row(&mut table, theme, "Option", entry.path());
    add_kv_row(&mut table, theme, "Description", entry.description());
    add_kv_row(&mut table, theme, "Type", type_label(entry));
    add_kv_row(&mut table, theme, "Level", entry.level());
    add_kv_row(&mut table, theme, "Flags", flag_labels(entry).join(","));
    add_kv_row(&mut table, theme, "Set", entry.is_set());
    add_kv_row(&mut table, theme, "Value", entry.string_value());
    add_kv_row(&mut table, theme, "Default", display_value(entry, entry.default_value()));
    table
}
