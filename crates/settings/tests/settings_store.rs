//! Integration tests for the SettingsStore:
//! - Recursive diffing (nested structs)
//! - Persisting only changed (delta) fields
//! - Reloading after external file modification

use std::collections::{HashMap, HashSet};
use std::fs;

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use settings::{Settings, SettingsError, SettingsStore};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Timeouts {
    connect_secs: u64,
    request_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Remote {
    project_id: String,
    verbose: bool,
    timeouts: Timeouts,
}

impl Default for Remote {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            verbose: false,
            timeouts: Timeouts::default(),
        }
    }
}

impl Settings for Remote {
    const SECTION: &'static str = "remote";
}

fn keys(map: &ron::Map) -> HashSet<String> {
    map.iter()
        .filter_map(|(k, _)| match k {
            ron::Value::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

fn section<'a>(root: &'a HashMap<String, ron::Value>, name: &str) -> &'a ron::Map {
    match root.get(name) {
        Some(ron::Value::Map(m)) => m,
        other => panic!("{name} entry should be a map, got {other:?}"),
    }
}

fn nested<'a>(map: &'a ron::Map, name: &str) -> &'a ron::Map {
    let value = map
        .iter()
        .find(|(k, _)| matches!(k, ron::Value::String(s) if s == name))
        .map(|(_, v)| v)
        .unwrap();
    let ron::Value::Map(m) = value else {
        panic!("{name} delta should be a map");
    };
    m
}

#[test]
fn only_changed_fields_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.settings.ron");

    let store = SettingsStore::builder()
        .with_settings_file(path.clone())
        .build()
        .expect("build store");
    store.register::<Remote>().expect("register remote");

    assert!(!path.exists(), "no file before the first update");

    let remote = store.get::<Remote>().expect("get initial");
    assert_eq!(*remote, Remote::default());

    store
        .update::<Remote, _>(|r| r.timeouts.request_secs = 30)
        .expect("update nested");

    let content = fs::read_to_string(&path).expect("read delta file");
    let root: HashMap<String, ron::Value> = ron::from_str(&content).expect("parse delta");
    let remote_delta = section(&root, "remote");

    assert_eq!(keys(remote_delta), HashSet::from(["timeouts".to_string()]));
    assert_eq!(
        keys(nested(remote_delta, "timeouts")),
        HashSet::from(["request_secs".to_string()])
    );

    store
        .update::<Remote, _>(|r| r.project_id = "workandtravel".into())
        .expect("update top-level");

    let content = fs::read_to_string(&path).expect("read second delta");
    let root: HashMap<String, ron::Value> = ron::from_str(&content).expect("parse delta");
    assert_eq!(
        keys(section(&root, "remote")),
        HashSet::from(["timeouts".to_string(), "project_id".to_string()])
    );

    let remote = store.get::<Remote>().expect("get after updates");
    assert_eq!(remote.project_id, "workandtravel");
    assert_eq!(remote.timeouts.request_secs, 30);
    assert_eq!(remote.timeouts.connect_secs, 5);
}

#[test]
fn reverting_to_default_drops_the_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.settings.ron");
    let store = SettingsStore::builder()
        .with_settings_file(path.clone())
        .build()
        .unwrap();
    store.register::<Remote>().unwrap();

    store.update::<Remote, _>(|r| r.verbose = true).unwrap();
    store.reset::<Remote>().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let root: HashMap<String, ron::Value> = ron::from_str(&content).unwrap();
    assert!(root.is_empty());
}

#[test]
fn existing_delta_is_applied_on_register() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.settings.ron");
    fs::write(&path, r#"{ "remote": { "verbose": true } }"#).unwrap();

    let store = SettingsStore::builder()
        .with_settings_file(path)
        .build()
        .unwrap();
    store.register::<Remote>().unwrap();

    let remote = store.get::<Remote>().unwrap();
    assert!(remote.verbose);
    assert_eq!(remote.timeouts, Timeouts::default());
}

#[test]
fn reload_applies_external_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.settings.ron");

    let store = SettingsStore::builder()
        .with_settings_file(path.clone())
        .build()
        .expect("build");
    store.register::<Remote>().expect("register");
    store
        .update::<Remote, _>(|r| r.timeouts.connect_secs = 1)
        .expect("initial update");

    let external = r#"
    {
        "remote": {
            "project_id": "external",
            "timeouts": { "request_secs": 60 }
        }
    }
    "#;
    fs::write(&path, external).expect("write external delta");

    store.reload().expect("reload after external change");

    let remote = store.get::<Remote>().expect("get after reload");
    assert_eq!(remote.project_id, "external");
    assert_eq!(remote.timeouts.request_secs, 60);
    assert_eq!(
        remote.timeouts.connect_secs, 5,
        "local change was replaced by the file contents"
    );
}

#[test]
fn unregistered_sections_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::builder()
        .with_settings_file(dir.path().join("s.ron"))
        .build()
        .unwrap();

    assert!(matches!(
        store.get::<Remote>(),
        Err(SettingsError::NotRegistered)
    ));
    assert!(store.try_get::<Remote>().unwrap().is_none());

    store.register::<Remote>().unwrap();
    assert!(matches!(
        store.register::<Remote>(),
        Err(SettingsError::AlreadyRegistered("remote"))
    ));
}
