use std::collections::HashMap;

use crate::codec::unescape;
use crate::error::Result;
use crate::model::{Component, Entry};
use crate::tool::{GpgConfTool, ProcessGpgConf};

/// Cached view of every gpgconf component and its options.
///
/// Nothing is read until a lookup needs it: the component list on first use,
/// and a component's options the first time that component is requested.
/// All access is single-threaded; take `&mut self` for every lookup because
/// a lookup may have to run gpgconf.
pub struct CryptoConfig<T: GpgConfTool = ProcessGpgConf> {
    tool: T,
    parsed: bool,
    components: Vec<Component>,
    by_name: HashMap<String, usize>,
}

impl CryptoConfig<ProcessGpgConf> {
    /// Registry over the `gpgconf` found in `PATH`.
    pub fn discover() -> Self {
        Self::new(ProcessGpgConf::discover())
    }
}

impl<T: GpgConfTool> CryptoConfig<T> {
    pub fn new(tool: T) -> Self {
        Self {
            tool,
            parsed: false,
            components: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Component names in the order gpgconf listed them.
    ///
    /// This is the interactive entry point: a failing gpgconf run is
    /// returned as an error. The registry still counts as parsed afterwards,
    /// so later calls return the (empty) cached list until [`clear`].
    ///
    /// [`clear`]: CryptoConfig::clear
    pub fn component_list(&mut self) -> Result<Vec<String>> {
        self.ensure_parsed(true)?;
        Ok(self.components.iter().map(|c| c.name().to_string()).collect())
    }

    /// `(name, description)` of every component. Does not list any options.
    pub fn component_summaries(&mut self) -> Result<Vec<(String, String)>> {
        self.ensure_parsed(true)?;
        Ok(self
            .components
            .iter()
            .map(|c| (c.name().to_string(), c.description().to_string()))
            .collect())
    }

    /// Look up a component, listing its options on first access. Failures
    /// are silent and yield `None`.
    pub fn component(&mut self, name: &str) -> Option<&Component> {
        self.component_mut(name).map(|c| &*c)
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut Component> {
        if let Err(e) = self.ensure_parsed(false) {
            tracing::debug!("component lookup without gpgconf: {e}");
        }
        let i = *self.by_name.get(name)?;
        let component = &mut self.components[i];
        component.ensure_loaded(&self.tool);
        Some(component)
    }

    /// First entry with this name in any group of the component.
    pub fn entry(&mut self, component: &str, entry: &str) -> Option<&Entry> {
        self.component(component)?.entry(entry)
    }

    pub fn entry_mut(&mut self, component: &str, entry: &str) -> Option<&mut Entry> {
        self.component_mut(component)?.entry_mut(entry)
    }

    /// Direct lookup through the group.
    #[deprecated(note = "group names are unstable across GnuPG versions; use `entry`")]
    pub fn entry_in_group(&mut self, component: &str, group: &str, entry: &str) -> Option<&Entry> {
        self.component(component)?.group(group)?.entry(entry)
    }

    /// Whether any already loaded entry has an unsynced change.
    pub fn has_dirty_entries(&self) -> bool {
        self.loaded_components().any(Component::has_dirty_entries)
    }

    /// Write every dirty entry back, one gpgconf run per component.
    ///
    /// With `runtime` the running components are told to pick up the
    /// change as well. Every component is attempted; the first failure is
    /// returned and the failed components keep their dirty entries.
    pub fn sync(&mut self, runtime: bool) -> Result<usize> {
        let mut written = 0;
        let mut first_error = None;

        for component in self.components.iter_mut().filter(|c| c.is_loaded()) {
            match component.sync(&self.tool, runtime) {
                Ok(n) => written += n,
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }

    /// Drop the whole cache, discarding unsynced changes. The next lookup
    /// runs gpgconf again.
    pub fn clear(&mut self) {
        self.components.clear();
        self.by_name.clear();
        self.parsed = false;
    }

    /// [`clear`](CryptoConfig::clear) and list the components again.
    pub fn reload(&mut self) -> Result<Vec<String>> {
        self.clear();
        self.component_list()
    }

    fn loaded_components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.is_loaded())
    }

    fn ensure_parsed(&mut self, show_errors: bool) -> Result<()> {
        if self.parsed {
            return Ok(());
        }
        self.parsed = true;

        let output = match self.tool.list_components() {
            Ok(output) => output,
            Err(e) => {
                if show_errors {
                    tracing::warn!("{e}");
                }
                return Err(e);
            }
        };

        for raw in output.lines() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            // NAME:DESCRIPTION, newer gpgconf versions append more fields
            let mut fields = line.split(':');
            let (Some(name), Some(description)) = (fields.next(), fields.next()) else {
                tracing::warn!("parse error on gpgconf --list-components output: {line}");
                continue;
            };
            if self.by_name.contains_key(name) {
                tracing::warn!("duplicate component '{name}' in gpgconf output");
                continue;
            }
            self.by_name.insert(name.to_string(), self.components.len());
            self.components
                .push(Component::new(name, &unescape(description, true)));
        }
        tracing::debug!("gpgconf listed {} components", self.components.len());
        Ok(())
    }
}

impl<T: GpgConfTool> Drop for CryptoConfig<T> {
    fn drop(&mut self) {
        for entry in self.loaded_components().flat_map(Component::entries) {
            if entry.is_dirty() {
                tracing::warn!(
                    "option '{}' was modified but never synced; call sync() to commit or clear() to discard",
                    entry.path()
                );
            }
        }
    }
}
