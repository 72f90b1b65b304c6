use std::collections::HashMap;

use super::entry::Entry;
use super::value::Level;

/// Name of the group that collects options listed before any group header.
pub const NO_GROUP: &str = "<nogroup>";

/// A named, ordered set of options within a component.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    description: String,
    path: String,
    level: Level,
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
}

impl Group {
    pub(crate) fn new(component: &str, name: &str, description: &str, level: Level) -> Group {
        Group {
            name: name.to_string(),
            description: description.to_string(),
            path: format!("{component}/{name}"),
            level,
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// gpgconf has no icons; kept for callers that render one per group.
    pub fn icon_name(&self) -> &str {
        ""
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// `component/group`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Entry names in the order gpgconf listed them.
    pub fn entry_list(&self) -> Vec<&str> {
        self.entries.iter().map(Entry::name).collect()
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        let i = *self.by_name.get(name)?;
        self.entries.get_mut(i)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push_entry(&mut self, entry: Entry) {
        if let Some(&i) = self.by_name.get(entry.name()) {
            tracing::warn!("duplicate option '{}' in group '{}'", entry.name(), self.path);
            self.entries[i] = entry;
            return;
        }
        self.by_name.insert(entry.name().to_string(), self.entries.len());
        self.entries.push(entry);
    }
}
