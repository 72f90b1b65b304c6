use std::fmt;

use serde::Serialize;

const FLAG_GROUP: u32 = 1;
const FLAG_OPTIONAL: u32 = 2;
const FLAG_LIST: u32 = 4;
const FLAG_RUNTIME: u32 = 8;
const FLAG_DEFAULT: u32 = 16;
const FLAG_NO_CHANGE: u32 = 128;

/// Flag value written in front of an option that gets a new value.
pub(crate) const CHANGE_FLAG_SET: u32 = 0;
/// Flag value that asks gpgconf to delete the option from the config file.
pub(crate) const CHANGE_FLAG_UNSET: u32 = FLAG_DEFAULT;

/// How prominently an option should be offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Basic,
    Advanced,
    Expert,
}

impl Level {
    /// Map a wire level. Levels above 2 are invisible/internal and have no
    /// counterpart; the parser drops those lines before getting here.
    pub fn from_wire(level: u32) -> Option<Level> {
        match level {
            0 => Some(Level::Basic),
            1 => Some(Level::Advanced),
            2 => Some(Level::Expert),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Basic => "basic",
            Level::Advanced => "advanced",
            Level::Expert => "expert",
        };
        f.write_str(s)
    }
}

/// Type of the argument an option takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    /// The option is set or not set, without an argument.
    None,
    String,
    Int,
    UInt,
    /// Pathname of a file, which need not exist.
    Path,
    /// Pathname of a directory. gpgconf has no wire code for it.
    DirPath,
    #[serde(rename = "ldap-url")]
    LdapUrl,
}

impl ArgType {
    /// Map a gpgconf numeric type code.
    pub fn from_wire(code: u32) -> Option<ArgType> {
        match code {
            0 => Some(ArgType::None),
            1 => Some(ArgType::String),
            2 => Some(ArgType::Int),
            3 => Some(ArgType::UInt),
            32 => Some(ArgType::Path),
            33 => Some(ArgType::LdapUrl),
            _ => None,
        }
    }

    /// String-like types are quoted and escaped on the wire.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            ArgType::String | ArgType::Path | ArgType::DirPath | ArgType::LdapUrl
        )
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArgType::None => "none",
            ArgType::String => "string",
            ArgType::Int => "int",
            ArgType::UInt => "uint",
            ArgType::Path => "path",
            ArgType::DirPath => "dirpath",
            ArgType::LdapUrl => "ldap-url",
        };
        f.write_str(s)
    }
}

/// The FLAGS field of a `--list-options` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFlags(u32);

impl EntryFlags {
    pub fn from_bits(bits: u32) -> Self {
        EntryFlags(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_group(self) -> bool {
        self.0 & FLAG_GROUP != 0
    }

    pub fn is_optional(self) -> bool {
        self.0 & FLAG_OPTIONAL != 0
    }

    pub fn is_list(self) -> bool {
        self.0 & FLAG_LIST != 0
    }

    pub fn is_runtime(self) -> bool {
        self.0 & FLAG_RUNTIME != 0
    }

    pub fn has_default(self) -> bool {
        self.0 & FLAG_DEFAULT != 0
    }

    pub fn is_read_only(self) -> bool {
        self.0 & FLAG_NO_CHANGE != 0
    }
}

/// In-memory value of an option.
///
/// Which variant an entry holds follows from its `(ArgType, is_list)` pair;
/// `Empty` means no value at all (not set and no default).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    #[default]
    Empty,
    Bool(bool),
    Count(u32),
    Int(i32),
    UInt(u32),
    String(String),
    IntList(Vec<i32>),
    UIntList(Vec<u32>),
    StringList(Vec<String>),
}

impl ConfigValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, ConfigValue::Empty)
    }
}
