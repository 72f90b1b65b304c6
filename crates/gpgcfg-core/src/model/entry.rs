use std::path::PathBuf;

use url::Url;

use super::value::{ArgType, ConfigValue, EntryFlags, Level};
use crate::codec::{decode_value, encode_value};
use crate::error::{GpgCfgError, Result};
use crate::ldap::LdapServer;

/// Field positions of a `--list-options` line:
/// `NAME:FLAGS:LEVEL:DESCRIPTION:TYPE:ALT-TYPE:ARGNAME:DEFAULT:ARGDEF:VALUE`.
pub(crate) mod field {
    pub const NAME: usize = 0;
    pub const FLAGS: usize = 1;
    pub const LEVEL: usize = 2;
    pub const DESCRIPTION: usize = 3;
    pub const TYPE: usize = 4;
    pub const ALT_TYPE: usize = 5;
    pub const DEFAULT: usize = 7;
    pub const VALUE: usize = 9;
    pub const COUNT: usize = 10;
}

/// One gpgconf-managed option.
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    description: String,
    path: String,
    level: Level,
    arg_type: ArgType,
    flags: EntryFlags,
    default_value: ConfigValue,
    value: ConfigValue,
    set: bool,
    dirty: bool,
}

impl Entry {
    /// Build an entry from the split fields of one option line. The caller
    /// guarantees at least [`field::COUNT`] fields.
    pub(crate) fn from_fields(group_path: &str, fields: &[&str]) -> Entry {
        let name = fields[field::NAME].to_string();
        let flags = EntryFlags::from_bits(parse_u32(fields[field::FLAGS]));
        let level = Level::from_wire(parse_u32(fields[field::LEVEL])).unwrap_or(Level::Basic);

        let arg_type = ArgType::from_wire(parse_u32(fields[field::TYPE]))
            .or_else(|| {
                let alt = fields[field::ALT_TYPE];
                if alt.is_empty() {
                    None
                } else {
                    ArgType::from_wire(parse_u32(alt))
                }
            })
            .unwrap_or_else(|| {
                tracing::warn!(
                    "unsupported datatype: {} : {} for {name}",
                    fields[field::TYPE],
                    fields[field::ALT_TYPE]
                );
                ArgType::None
            });

        let default_value = if flags.has_default() {
            decode_value(&name, arg_type, flags.is_list(), fields[field::DEFAULT], true)
        } else {
            ConfigValue::Empty
        };

        let raw_value = fields[field::VALUE];
        let set = !raw_value.is_empty();
        let value = if set {
            decode_value(&name, arg_type, flags.is_list(), raw_value, true)
        } else if default_value.is_empty() {
            unset_value(arg_type, flags.is_list())
        } else {
            default_value.clone()
        };

        Entry {
            path: format!("{group_path}/{name}"),
            description: crate::codec::unescape(fields[field::DESCRIPTION], true),
            name,
            level,
            arg_type,
            flags,
            default_value,
            value,
            set,
            dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// `component/group/entry`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn arg_type(&self) -> ArgType {
        self.arg_type
    }

    pub fn flags(&self) -> EntryFlags {
        self.flags
    }

    pub fn is_optional(&self) -> bool {
        self.flags.is_optional()
    }

    pub fn is_read_only(&self) -> bool {
        self.flags.is_read_only()
    }

    pub fn is_list(&self) -> bool {
        self.flags.is_list()
    }

    pub fn is_runtime(&self) -> bool {
        self.flags.is_runtime()
    }

    pub fn has_default(&self) -> bool {
        self.flags.has_default()
    }

    /// Whether the option carries a value different from its default.
    pub fn is_set(&self) -> bool {
        self.set
    }

    /// Whether the value changed since it was read or last synced.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn value(&self) -> &ConfigValue {
        &self.value
    }

    pub fn default_value(&self) -> &ConfigValue {
        &self.default_value
    }

    // ---------------------------------------------------------------------
    // Readers
    // ---------------------------------------------------------------------

    pub fn bool_value(&self) -> Result<bool> {
        self.require(&[ArgType::None], "none", false)?;
        Ok(matches!(self.value, ConfigValue::Bool(true)))
    }

    /// The value as unescaped text. Works for every type.
    pub fn string_value(&self) -> String {
        encode_value(self.arg_type, self.is_list(), &self.value, false)
    }

    pub fn string_value_list(&self) -> Result<Vec<String>> {
        self.require_string_like(true)?;
        Ok(match &self.value {
            ConfigValue::StringList(items) => items.clone(),
            ConfigValue::String(s) => vec![s.clone()],
            _ => Vec::new(),
        })
    }

    pub fn int_value(&self) -> Result<i32> {
        self.require(&[ArgType::Int], "int", false)?;
        Ok(match self.value {
            ConfigValue::Int(i) => i,
            _ => 0,
        })
    }

    pub fn uint_value(&self) -> Result<u32> {
        self.require(&[ArgType::UInt], "uint", false)?;
        Ok(match self.value {
            ConfigValue::UInt(u) => u,
            _ => 0,
        })
    }

    /// How often a list-of-none option was given.
    pub fn number_of_times_set(&self) -> Result<u32> {
        self.require(&[ArgType::None], "none", true)?;
        Ok(match self.value {
            ConfigValue::Count(n) => n,
            _ => 0,
        })
    }

    pub fn int_value_list(&self) -> Result<Vec<i32>> {
        self.require(&[ArgType::Int], "int", true)?;
        Ok(match &self.value {
            ConfigValue::IntList(items) => items.clone(),
            _ => Vec::new(),
        })
    }

    pub fn uint_value_list(&self) -> Result<Vec<u32>> {
        self.require(&[ArgType::UInt], "uint", true)?;
        Ok(match &self.value {
            ConfigValue::UIntList(items) => items.clone(),
            _ => Vec::new(),
        })
    }

    /// Path options as `file://` URLs, LDAP server options as `ldap://`
    /// URLs. `None` when the option has no value.
    pub fn url_value(&self) -> Result<Option<Url>> {
        self.require_url_type(false)?;
        match &self.value {
            ConfigValue::String(s) if !s.is_empty() => self.value_to_url(s).map(Some),
            _ => Ok(None),
        }
    }

    pub fn url_value_list(&self) -> Result<Vec<Url>> {
        self.require_url_type(true)?;
        match &self.value {
            ConfigValue::StringList(items) => items.iter().map(|s| self.value_to_url(s)).collect(),
            _ => Ok(Vec::new()),
        }
    }

    /// The escaped wire text written to gpgconf for this entry.
    pub fn output_string(&self) -> String {
        encode_value(self.arg_type, self.is_list(), &self.value, true)
    }

    // ---------------------------------------------------------------------
    // Writers
    // ---------------------------------------------------------------------

    pub fn reset_to_default(&mut self) {
        self.set = false;
        self.dirty = true;
        self.value = if self.has_default() {
            self.default_value.clone()
        } else {
            unset_value(self.arg_type, self.is_list())
        };
    }

    pub fn set_bool_value(&mut self, b: bool) -> Result<()> {
        self.require(&[ArgType::None], "none", false)?;
        // a no-arg option is either set or not set
        self.value = ConfigValue::Bool(b);
        self.set = b;
        self.dirty = true;
        Ok(())
    }

    /// Set from unescaped text, interpreted according to the entry's type.
    ///
    /// An empty string on a non-optional option acts like a reset, since
    /// gpgconf rejects options that require an argument but get none.
    pub fn set_string_value(&mut self, s: &str) {
        self.value = decode_value(&self.name, self.arg_type, self.is_list(), s, false);
        self.set = match self.value {
            ConfigValue::Bool(b) => b,
            ConfigValue::Count(n) => n > 0,
            _ => !(s.is_empty() && !self.is_optional()),
        };
        self.dirty = true;
    }

    pub fn set_string_value_list(&mut self, items: &[String]) -> Result<()> {
        self.require_string_like(true)?;
        self.set_list(ConfigValue::StringList(items.to_vec()), items.is_empty());
        Ok(())
    }

    pub fn set_int_value(&mut self, i: i32) -> Result<()> {
        self.require(&[ArgType::Int], "int", false)?;
        self.value = ConfigValue::Int(i);
        self.set = true;
        self.dirty = true;
        Ok(())
    }

    pub fn set_uint_value(&mut self, u: u32) -> Result<()> {
        self.require(&[ArgType::UInt], "uint", false)?;
        self.value = ConfigValue::UInt(u);
        self.set = true;
        self.dirty = true;
        Ok(())
    }

    pub fn set_url_value(&mut self, url: &Url) -> Result<()> {
        self.require_url_type(false)?;
        let s = self.url_to_value(url)?;
        self.set = !(s.is_empty() && !self.is_optional());
        self.value = if s.is_empty() {
            ConfigValue::Empty
        } else {
            ConfigValue::String(s)
        };
        self.dirty = true;
        Ok(())
    }

    pub fn set_number_of_times_set(&mut self, n: u32) -> Result<()> {
        self.require(&[ArgType::None], "none", true)?;
        self.value = ConfigValue::Count(n);
        self.set = n > 0;
        self.dirty = true;
        Ok(())
    }

    pub fn set_int_value_list(&mut self, items: &[i32]) -> Result<()> {
        self.require(&[ArgType::Int], "int", true)?;
        self.set_list(ConfigValue::IntList(items.to_vec()), items.is_empty());
        Ok(())
    }

    pub fn set_uint_value_list(&mut self, items: &[u32]) -> Result<()> {
        self.require(&[ArgType::UInt], "uint", true)?;
        self.set_list(ConfigValue::UIntList(items.to_vec()), items.is_empty());
        Ok(())
    }

    pub fn set_url_value_list(&mut self, urls: &[Url]) -> Result<()> {
        self.require_url_type(true)?;
        let items = urls
            .iter()
            .map(|url| self.url_to_value(url))
            .collect::<Result<Vec<_>>>()?;
        let empty = items.is_empty();
        self.set_list(ConfigValue::StringList(items), empty);
        Ok(())
    }

    pub(crate) fn mark_synced(&mut self) {
        self.dirty = false;
    }

    fn set_list(&mut self, value: ConfigValue, empty: bool) {
        self.value = value;
        self.set = !(empty && !self.is_optional());
        self.dirty = true;
    }

    // ---------------------------------------------------------------------
    // Accessor preconditions
    // ---------------------------------------------------------------------

    fn require(&self, allowed: &[ArgType], expected: &'static str, list: bool) -> Result<()> {
        if !allowed.contains(&self.arg_type) {
            return Err(GpgCfgError::WrongArgType {
                entry: self.path.clone(),
                expected,
                actual: self.arg_type,
            });
        }
        self.require_list(list)
    }

    fn require_list(&self, list: bool) -> Result<()> {
        match (list, self.is_list()) {
            (true, false) => Err(GpgCfgError::NotList(self.path.clone())),
            (false, true) => Err(GpgCfgError::IsList(self.path.clone())),
            _ => Ok(()),
        }
    }

    fn require_string_like(&self, list: bool) -> Result<()> {
        self.require(
            &[ArgType::String, ArgType::Path, ArgType::DirPath, ArgType::LdapUrl],
            "string",
            list,
        )
    }

    fn require_url_type(&self, list: bool) -> Result<()> {
        self.require(
            &[ArgType::Path, ArgType::DirPath, ArgType::LdapUrl],
            "path or ldap-url",
            list,
        )
    }

    fn invalid_url(&self, reason: impl Into<String>) -> GpgCfgError {
        GpgCfgError::InvalidUrl {
            entry: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn value_to_url(&self, value: &str) -> Result<Url> {
        if self.arg_type == ArgType::LdapUrl {
            if let Some(server) = LdapServer::parse(value) {
                return server.to_url().map_err(|e| self.invalid_url(e));
            }
            // not in server format, maybe already a URL
            return Url::parse(value).map_err(|e| self.invalid_url(e.to_string()));
        }
        Url::from_file_path(value)
            .map_err(|_| self.invalid_url(format!("'{value}' is not an absolute path")))
    }

    fn url_to_value(&self, url: &Url) -> Result<String> {
        if self.arg_type == ArgType::LdapUrl {
            let server = LdapServer::from_url(url).map_err(|e| self.invalid_url(e))?;
            return Ok(server.to_value());
        }
        let path: PathBuf = url
            .to_file_path()
            .map_err(|_| self.invalid_url(format!("'{url}' is not a local file URL")))?;
        Ok(path.to_string_lossy().into_owned())
    }
}

/// Value of an option that is neither set nor has a default.
fn unset_value(arg_type: ArgType, is_list: bool) -> ConfigValue {
    match (arg_type, is_list) {
        (ArgType::None, true) => ConfigValue::Count(0),
        (ArgType::None, false) => ConfigValue::Bool(false),
        _ => ConfigValue::Empty,
    }
}

pub(crate) fn parse_u32(field: &str) -> u32 {
    field.trim().parse().unwrap_or(0)
}
