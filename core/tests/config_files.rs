//! Config and dataset loading from files on disk.

use bankportal_core::{
    clock::PortalClock,
    config::{Backend, PortalConfig},
    portal::Portal,
    seed::RecordStore,
    session::{Credentials, Role},
};
use std::path::PathBuf;

fn scratch_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bankportal-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write scratch file");
    path
}

#[test]
fn config_file_overrides_defaults() {
    let path = scratch_file(
        "portal.json",
        r#"{
            "backend": "sqlite",
            "latency_ms": 0,
            "clock": { "mode": "fixed", "at": "2025-01-01 00:00:00" }
        }"#,
    );
    let config = PortalConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.backend, Backend::Sqlite);
    assert_eq!(config.database, ":memory:");
    assert_eq!(config.latency_ms, Some(0));
    assert_eq!(config.clock, PortalClock::parse_fixed("2025-01-01 00:00:00").unwrap());
}

#[test]
fn missing_config_file_names_the_path() {
    let err = PortalConfig::load("/definitely/not/here/portal.json").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here/portal.json"), "{err}");
}

#[test]
fn malformed_config_is_an_error() {
    let path = scratch_file("broken.json", "{ backend: ");
    assert!(PortalConfig::load(path.to_str().unwrap()).is_err());
}

#[test]
fn seed_file_replaces_compiled_in_records() {
    let mut records = RecordStore::default();
    records.users = RecordStore::seeded().users.into_iter().take(2).collect();
    let path = scratch_file("records.json", &serde_json::to_string(&records).unwrap());

    let config = PortalConfig {
        seed_file: Some(path.to_str().unwrap().to_string()),
        ..PortalConfig::default_test()
    };
    let loaded = config.records().unwrap();
    assert_eq!(loaded.users.len(), 2);
    assert!(loaded.accounts.is_empty(), "absent collections load empty");

    let portal = Portal::from_config(&config).unwrap();
    let rajesh = portal
        .login(&Credentials {
            username: "rajesh".into(),
            password: "password".into(),
            role:     Role::Employee,
        })
        .unwrap();
    assert_eq!(portal.employee_dashboard(&rajesh).unwrap().user_count, 2);
}

#[test]
fn directory_file_replaces_demo_logins() {
    let path = scratch_file(
        "directory.json",
        r#"{ "entries": [
            { "username": "ops", "password": "s3cret", "name": "Ops Desk",
              "principal": { "role": "employee", "employee_id": 9, "branch_id": null } }
        ] }"#,
    );
    let config = PortalConfig {
        directory_file: Some(path.to_str().unwrap().to_string()),
        ..PortalConfig::default_test()
    };
    let portal = Portal::from_config(&config).unwrap();

    let ops = portal
        .login(&Credentials { username: "ops".into(), password: "s3cret".into(), role: Role::Employee })
        .unwrap();
    assert_eq!(ops.name, "Ops Desk");
    assert!(portal
        .login(&Credentials {
            username: "rajesh".into(),
            password: "password".into(),
            role:     Role::Employee,
        })
        .is_err());
}

#[test]
fn malformed_directory_file_names_the_path() {
    let path = scratch_file("bad-directory.json", r#"{ "entries": [ { "username": "ops" "#);
    let path = path.to_str().unwrap().to_string();
    let config = PortalConfig { directory_file: Some(path.clone()), ..PortalConfig::default_test() };

    let err = config.directory().unwrap_err().to_string();
    assert!(err.starts_with("Cannot parse"), "{err}");
    assert!(err.contains(&path), "{err}");
    assert!(Portal::from_config(&config).is_err());
}

#[test]
fn sqlite_backend_from_config() {
    let config = PortalConfig { backend: Backend::Sqlite, ..PortalConfig::default_test() };
    let portal = Portal::from_config(&config).unwrap();
    assert_eq!(portal.service().name(), "sqlite");
}
