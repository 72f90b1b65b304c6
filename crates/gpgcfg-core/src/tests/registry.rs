use crate::error::GpgCfgError;
use crate::registry::CryptoConfig;
use crate::testutil::{fake, FakeGpgConf};

#[test]
fn component_list_keeps_listing_order() {
    let fake = fake();
    let mut config = CryptoConfig::new(&fake);
    assert_eq!(
        config.component_list().unwrap(),
        vec!["gpg", "gpgsm", "dirmngr"]
    );
    // options are only listed on demand
    assert!(fake.list_calls().is_empty());
}

#[test]
fn options_are_listed_once_per_component() {
    let fake = fake();
    let mut config = CryptoConfig::new(&fake);
    assert!(config.component("gpg").is_some());
    assert!(config.entry("gpg", "quiet").is_some());
    assert!(config.entry("dirmngr", "ldaptimeout").is_some());
    assert_eq!(fake.list_calls(), vec!["gpg", "dirmngr"]);
}

#[test]
fn component_metadata() {
    let fake = FakeGpgConf::new("gpg:OpenPGP%3a signing and encryption:/usr/bin/gpg\n")
        .with_options("gpg", crate::testutil::GPG_OPTIONS);
    let mut config = CryptoConfig::new(&fake);
    let gpg = config.component("gpg").unwrap();
    assert_eq!(gpg.name(), "gpg");
    assert_eq!(gpg.description(), "OpenPGP: signing and encryption");
    assert_eq!(gpg.icon_name(), "");
}

#[test]
fn summaries_do_not_list_options() {
    let fake = fake();
    let mut config = CryptoConfig::new(&fake);
    let summaries = config.component_summaries().unwrap();
    assert_eq!(summaries[0], ("gpg".to_string(), "OpenPGP".to_string()));
    assert_eq!(summaries.len(), 3);
    assert!(fake.list_calls().is_empty());
}

#[test]
fn malformed_component_lines_are_skipped() {
    let fake = FakeGpgConf::new("gpg:OpenPGP\ngarbage\n\ndirmngr:Network\n");
    let mut config = CryptoConfig::new(&fake);
    assert_eq!(config.component_list().unwrap(), vec!["gpg", "dirmngr"]);
}

#[test]
fn unknown_names_yield_none() {
    let fake = fake();
    let mut config = CryptoConfig::new(&fake);
    assert!(config.component("scdaemon").is_none());
    assert!(config.entry("gpg", "no-such-option").is_none());
    assert!(config.entry("scdaemon", "quiet").is_none());
}

#[test]
fn entry_is_found_in_any_group() {
    let fake = fake();
    let mut config = CryptoConfig::new(&fake);
    let entry = config.entry("dirmngr", "ldapserver").unwrap();
    assert_eq!(entry.path(), "dirmngr/LDAP server/ldapserver");
}

#[test]
#[allow(deprecated)]
fn entry_in_group_needs_the_right_group() {
    let fake = fake();
    let mut config = CryptoConfig::new(&fake);
    assert!(config.entry_in_group("gpg", "Monitor", "quiet").is_some());
    assert!(config.entry_in_group("gpg", "Configuration", "quiet").is_none());
}

#[test]
fn component_without_options_is_empty() {
    let fake = fake();
    let mut config = CryptoConfig::new(&fake);
    // listing gpgsm options fails in the fake
    let gpgsm = config.component("gpgsm").unwrap();
    assert!(gpgsm.group_list().is_empty());
    assert_eq!(gpgsm.entries().count(), 0);
}

#[test]
fn failing_component_listing_is_reported_once() {
    let fake = FakeGpgConf::broken();
    let mut config = CryptoConfig::new(&fake);
    match config.component_list() {
        Err(GpgCfgError::ToolExit { code, .. }) => assert_eq!(code, 2),
        other => panic!("expected ToolExit, got: {other:?}"),
    }
    // the registry counts as parsed until cleared
    assert!(config.component_list().unwrap().is_empty());
}

#[test]
fn lookup_on_broken_tool_is_silent() {
    let fake = FakeGpgConf::broken();
    let mut config = CryptoConfig::new(&fake);
    assert!(config.component("gpg").is_none());
    assert!(config.entry("gpg", "quiet").is_none());
}

#[test]
fn clear_discards_changes_and_reloads_lazily() {
    let fake = fake();
    let mut config = CryptoConfig::new(&fake);
    config
        .entry_mut("gpg", "default-key")
        .unwrap()
        .set_string_value("0xDEADBEEF");
    assert!(config.has_dirty_entries());

    config.clear();
    assert!(!config.has_dirty_entries());

    let key = config.entry("gpg", "default-key").unwrap();
    assert!(!key.is_set());
    assert!(!key.is_dirty());
    assert_eq!(fake.list_calls(), vec!["gpg", "gpg"]);
}

#[test]
fn reload_lists_components_again() {
    let fake = fake();
    let mut config = CryptoConfig::new(&fake);
    assert!(config.component("gpg").is_some());
    assert_eq!(config.reload().unwrap(), vec!["gpg", "gpgsm", "dirmngr"]);
    assert!(config.component("gpg").is_some());
    assert_eq!(fake.list_calls(), vec!["gpg", "gpg"]);
}
