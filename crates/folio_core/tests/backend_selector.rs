mod support;

use folio_core::{select_backend, select_backend_with, ClientSlot, RemoteConfig};
use support::{complete_remote_config, ConnectMode, CountingConnector};

#[test]
fn complete_config_yields_one_shared_client() {
    let connector = CountingConnector::new(ConnectMode::Succeed);
    let slot = ClientSlot::new();
    assert!(!slot.is_decided());

    let first = slot.select(&complete_remote_config(), &connector).unwrap();
    let second = slot.select(&complete_remote_config(), &connector).unwrap();

    assert!(slot.is_decided());
    assert!(first.shares_client_with(&second));
    assert_eq!(connector.calls(), 1);
}

#[test]
fn missing_api_key_or_url_selects_local() {
    let connector = CountingConnector::new(ConnectMode::Succeed);

    for config in [
        RemoteConfig::default(),
        RemoteConfig::new("", "https://folio-test.example.com"),
        RemoteConfig::new("key", "   "),
    ] {
        let slot = ClientSlot::new();
        assert!(slot.select(&config, &connector).is_none(), "{config:?}");
    }
    assert_eq!(connector.calls(), 0);
}

#[test]
fn connector_error_selects_local() {
    let connector = CountingConnector::new(ConnectMode::Fail);
    let slot = ClientSlot::new();

    assert!(slot.select(&complete_remote_config(), &connector).is_none());
    assert_eq!(connector.calls(), 1);
}

#[test]
fn connector_panic_selects_local() {
    let connector = CountingConnector::new(ConnectMode::Panic);
    let slot = ClientSlot::new();

    assert!(slot.select(&complete_remote_config(), &connector).is_none());
    assert!(slot.is_decided());
}

#[test]
fn failed_decision_is_not_retried() {
    let failing = CountingConnector::new(ConnectMode::Fail);
    let working = CountingConnector::new(ConnectMode::Succeed);
    let slot = ClientSlot::new();

    assert!(slot.select(&complete_remote_config(), &failing).is_none());
    assert!(slot.select(&complete_remote_config(), &working).is_none());

    assert_eq!(failing.calls(), 1);
    assert_eq!(working.calls(), 0);
}

// Only test in this binary touching the process-wide slot.
#[test]
fn process_selection_is_decided_once() {
    let first = CountingConnector::new(ConnectMode::Succeed);
    assert!(select_backend_with(&RemoteConfig::default(), &first).is_none());
    assert_eq!(first.calls(), 0);

    let later = CountingConnector::new(ConnectMode::Succeed);
    assert!(select_backend_with(&complete_remote_config(), &later).is_none());
    assert!(select_backend(&complete_remote_config()).is_none());
    assert_eq!(later.calls(), 0);
}
