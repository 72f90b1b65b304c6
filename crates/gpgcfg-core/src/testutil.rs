use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{GpgCfgError, Result};
use crate::tool::GpgConfTool;

/// In-memory stand-in for the gpgconf executable. Thread-safe via Mutex.
///
/// Canned output is served per sub-command, and every `--change-options`
/// call is recorded together with the contents of its input file.
pub struct FakeGpgConf {
    components: Mutex<Option<String>>,
    options: Mutex<HashMap<String, String>>,
    list_calls: Mutex<Vec<String>>,
    changes: Mutex<Vec<ChangeCall>>,
    fail_change: Mutex<Option<i32>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeCall {
    pub component: String,
    pub runtime: bool,
    pub input: String,
}

impl FakeGpgConf {
    pub fn new(components: &str) -> Self {
        Self {
            components: Mutex::new(Some(components.to_string())),
            options: Mutex::new(HashMap::new()),
            list_calls: Mutex::new(Vec::new()),
            changes: Mutex::new(Vec::new()),
            fail_change: Mutex::new(None),
        }
    }

    /// A gpgconf whose `--list-components` exits with code 2.
    pub fn broken() -> Self {
        let fake = Self::new("");
        *fake.components.lock().unwrap() = None;
        fake
    }

    pub fn with_options(self, component: &str, output: &str) -> Self {
        self.options
            .lock()
            .unwrap()
            .insert(component.to_string(), output.to_string());
        self
    }

    /// Make every following `--change-options` run fail with `code`.
    pub fn fail_changes(&self, code: Option<i32>) {
        *self.fail_change.lock().unwrap() = code;
    }

    /// Components whose options were listed, in call order.
    pub fn list_calls(&self) -> Vec<String> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn changes(&self) -> Vec<ChangeCall> {
        self.changes.lock().unwrap().clone()
    }
}

impl GpgConfTool for FakeGpgConf {
    fn list_components(&self) -> Result<String> {
        self.components
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| GpgCfgError::from_exit_code(2))
    }

    fn list_options(&self, component: &str) -> Result<String> {
        self.list_calls.lock().unwrap().push(component.to_string());
        self.options
            .lock()
            .unwrap()
            .get(component)
            .cloned()
            .ok_or_else(|| GpgCfgError::from_exit_code(2))
    }

    fn change_options(&self, component: &str, runtime: bool, input: &Path) -> Result<()> {
        let input = std::fs::read_to_string(input)?;
        self.changes.lock().unwrap().push(ChangeCall {
            component: component.to_string(),
            runtime,
            input,
        });
        match *self.fail_change.lock().unwrap() {
            Some(code) => Err(GpgCfgError::SyncFailed {
                component: component.to_string(),
                reason: crate::error::exit_code_reason(code),
            }),
            None => Ok(()),
        }
    }
}

pub const COMPONENTS: &str = "\
gpg:OpenPGP
gpgsm:S/MIME
dirmngr:Network
";

/// `--list-options gpg` output shaped like a real GnuPG 2.2 listing.
pub const GPG_OPTIONS: &str = "\
Monitor:1:0:Options controlling the diagnostic output::::::
verbose:6:0:verbose:0:0:::0:3
quiet:0:0:be somewhat more quiet:0:0::::
Configuration:1:0:Options controlling the configuration::::::
default-key:0:0:use NAME as default secret key:1:1:NAME:::
encrypt-to:4:0:encrypt to user ID NAME as well:1:1:NAME:::\"alice,\"bob
auto-key-locate:4:0:use MECHANISMS to locate keys by mail address:1:1:MECHANISMS:::
Debug:1:2:Options useful for debugging::::::
debug-level:2:2:set the debugging level to LEVEL:1:1:LEVEL::\"none\":\"basic
Internal:1:1:Internal options::::::
compliance:0:3:compliance mode:1:1::::
";

pub const DIRMNGR_OPTIONS: &str = "\
Configuration:1:0:Options controlling the configuration::::::
ldaptimeout:24:1:set LDAP timeout to N seconds:3:3:N:15::
max-replies:16:1:return at most N items:2:2:N:10::
LDAP:1:1:Options for LDAP::::::
ldapserverlist-file:24:1:read LDAP server list from FILE:32:1:FILE:::
LDAP server:1:2:Configuration for LDAP servers::::::
ldapserver:4:2:use LDAP server:33:1:SERVER:::\"ldap.example.org%3a389%3a%3a%3aO=Example
";

pub fn fake() -> FakeGpgConf {
    FakeGpgConf::new(COMPONENTS)
        .with_options("gpg", GPG_OPTIONS)
        .with_options("dirmngr", DIRMNGR_OPTIONS)
}
