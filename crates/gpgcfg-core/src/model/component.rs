use std::collections::HashMap;
use std::io::Write as _;

use super::entry::{field, parse_u32, Entry};
use super::group::{Group, NO_GROUP};
use super::value::{EntryFlags, Level, CHANGE_FLAG_SET, CHANGE_FLAG_UNSET};
use crate::codec::unescape;
use crate::error::Result;
use crate::tool::GpgConfTool;

#[cfg(windows)]
const LINE_END: &str = "\r\n";
#[cfg(not(windows))]
const LINE_END: &str = "\n";

/// One configurable GnuPG program and its option groups.
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    description: String,
    groups: Vec<Group>,
    by_name: HashMap<String, usize>,
    loaded: bool,
}

impl Component {
    pub(crate) fn new(name: &str, description: &str) -> Component {
        Component {
            name: name.to_string(),
            description: description.to_string(),
            groups: Vec::new(),
            by_name: HashMap::new(),
            loaded: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// gpgconf has no icons; kept for callers that render one per component.
    pub fn icon_name(&self) -> &str {
        ""
    }

    /// Group names in the order gpgconf listed them. Groups without any
    /// visible option are not included.
    pub fn group_list(&self) -> Vec<&str> {
        self.groups.iter().map(Group::name).collect()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.by_name.get(name).map(|&i| &self.groups[i])
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        let i = *self.by_name.get(name)?;
        self.groups.get_mut(i)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// First entry with this name, searching groups in listing order.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.groups.iter().find_map(|g| g.entry(name))
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        let i = self.groups.iter().position(|g| g.entry(name).is_some())?;
        self.groups[i].entry_mut(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.groups.iter().flat_map(Group::entries)
    }

    pub fn has_dirty_entries(&self) -> bool {
        self.entries().any(Entry::is_dirty)
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// List this component's options once. A failing gpgconf run leaves the
    /// component without groups; it is only logged.
    pub(crate) fn ensure_loaded<T: GpgConfTool + ?Sized>(&mut self, tool: &T) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        match tool.list_options(&self.name) {
            Ok(output) => self.parse_options(&output),
            Err(e) => {
                tracing::warn!(
                    "running 'gpgconf --list-options {}' failed: {e}; run that command to see the real output",
                    self.name
                );
            }
        }
    }

    /// Build groups and entries from `--list-options` output.
    pub(crate) fn parse_options(&mut self, output: &str) {
        let mut current: Option<Group> = None;
        let mut count = 0usize;

        for raw in output.lines() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let fields: Vec<&str> = line.split(':').collect();
            // Shorter lines are diagnostics some components interleave, like
            // "dirmngr[31465]: error opening ...".
            if fields.len() < field::COUNT {
                continue;
            }

            let flags = EntryFlags::from_bits(parse_u32(fields[field::FLAGS]));
            let Some(level) = Level::from_wire(parse_u32(fields[field::LEVEL])) else {
                // invisible or internal
                continue;
            };

            if flags.is_group() {
                self.register_group(current.take());
                current = Some(Group::new(
                    &self.name,
                    fields[field::NAME],
                    &unescape(fields[field::DESCRIPTION], true),
                    level,
                ));
            } else {
                let group = current
                    .get_or_insert_with(|| Group::new(&self.name, NO_GROUP, "", Level::Basic));
                let entry = Entry::from_fields(group.path(), &fields);
                group.push_entry(entry);
                count += 1;
            }
        }
        self.register_group(current.take());

        tracing::debug!(
            "component '{}': {count} options in {} groups",
            self.name,
            self.groups.len()
        );
    }

    fn register_group(&mut self, group: Option<Group>) {
        let Some(group) = group else {
            return;
        };
        if group.is_empty() {
            tracing::debug!("discarding empty group '{}'", group.path());
            return;
        }
        if self.by_name.contains_key(group.name()) {
            tracing::warn!("duplicate group '{}', keeping the first", group.path());
            return;
        }
        self.by_name.insert(group.name().to_string(), self.groups.len());
        self.groups.push(group);
    }

    /// The `--change-options` input for every dirty entry, one
    /// `NAME:FLAG:VALUE` line each.
    pub fn change_request(&self) -> String {
        let mut out = String::new();
        for entry in self.entries().filter(|e| e.is_dirty()) {
            if entry.is_set() {
                out.push_str(&format!(
                    "{}:{CHANGE_FLAG_SET}:{}{LINE_END}",
                    entry.name(),
                    entry.output_string()
                ));
            } else {
                out.push_str(&format!("{}:{CHANGE_FLAG_UNSET}:{LINE_END}", entry.name()));
            }
        }
        out
    }

    /// Write all dirty entries back through gpgconf. Returns the number of
    /// entries written. On failure every dirty flag is left in place.
    pub(crate) fn sync<T: GpgConfTool + ?Sized>(&mut self, tool: &T, runtime: bool) -> Result<usize> {
        let written: Vec<(usize, String)> = self
            .groups
            .iter()
            .enumerate()
            .flat_map(|(gi, g)| {
                g.entries()
                    .filter(|e| e.is_dirty())
                    .map(move |e| (gi, e.name().to_string()))
            })
            .collect();
        if written.is_empty() {
            return Ok(0);
        }

        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(self.change_request().as_bytes())?;
        file.flush()?;

        if let Err(e) = tool.change_options(&self.name, runtime, file.path()) {
            tracing::warn!("{e}");
            return Err(e);
        }

        for (gi, name) in &written {
            if let Some(entry) = self.groups[*gi].entry_mut(name) {
                entry.mark_synced();
            }
        }
        tracing::debug!("component '{}': wrote {} options", self.name, written.len());
        Ok(written.len())
    }
}
