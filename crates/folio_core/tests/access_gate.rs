mod support;

use folio_core::{digest_secret, AccessGate, NotificationKind, NotificationLog};
use std::cell::Cell;
use std::sync::Arc;
use support::EDIT_SECRET;

fn gate() -> (AccessGate, Arc<NotificationLog>) {
    let log = Arc::new(NotificationLog::new());
    (AccessGate::new(log.clone()), log)
}

#[test]
fn correct_secret_enters_edit_mode() {
    let (mut gate, log) = gate();

    assert!(gate.attempt_unlock(EDIT_SECRET));

    assert!(gate.state().is_authorized());
    assert!(gate.is_editing());
    let notifications = log.snapshot();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Success);
    assert_eq!(notifications[0].message, "Edit mode enabled.");
}

#[test]
fn wrong_secret_keeps_state_and_reports_once() {
    let (mut gate, log) = gate();
    let before = gate.state();

    assert!(!gate.attempt_unlock("wrong"));

    assert_eq!(gate.state(), before);
    assert!(!gate.state().is_authorized());
    assert!(!gate.is_editing());
    let notifications = log.snapshot();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Error);
    assert_eq!(notifications[0].message, "Incorrect password.");
}

#[test]
fn secret_check_is_exact() {
    let (mut gate, log) = gate();

    for candidate in ["", "edit123 ", "EDIT123", "edit12"] {
        assert!(!gate.attempt_unlock(candidate), "{candidate:?} must not unlock");
    }
    assert_eq!(log.count(NotificationKind::Error), 4);
    assert!(!gate.state().is_authorized());
}

#[test]
fn close_keeps_authorization_and_skips_prompt_on_reentry() {
    let (mut gate, log) = gate();
    assert!(gate.attempt_unlock(EDIT_SECRET));
    log.drain();

    gate.close();
    assert!(!gate.is_editing());
    assert!(gate.state().is_authorized());

    let prompted = Cell::new(false);
    let entered = gate.request_edit(|| {
        prompted.set(true);
        None
    });

    assert!(entered);
    assert!(!prompted.get());
    assert!(gate.is_editing());
    assert!(log.is_empty());
}

#[test]
fn request_edit_prompts_when_unauthorized() {
    let (mut gate, log) = gate();

    let entered = gate.request_edit(|| Some(EDIT_SECRET.to_string()));

    assert!(entered);
    assert!(gate.is_editing());
    assert_eq!(log.count(NotificationKind::Success), 1);
}

#[test]
fn cancelled_prompt_changes_nothing() {
    let (mut gate, log) = gate();
    let before = gate.state();

    assert!(!gate.request_edit(|| None));

    assert_eq!(gate.state(), before);
    assert!(log.is_empty());
}

#[test]
fn failed_prompt_reports_incorrect_password() {
    let (mut gate, log) = gate();

    assert!(!gate.request_edit(|| Some("letmein".to_string())));

    assert!(!gate.is_editing());
    assert_eq!(support::kinds(&log.snapshot()), vec![NotificationKind::Error]);
}

#[test]
fn custom_reference_digest_is_honored() {
    let log = Arc::new(NotificationLog::new());
    let digest = digest_secret("another-secret").to_ascii_uppercase();
    let mut gate = AccessGate::with_reference_digest(log.clone(), &digest);

    assert!(!gate.attempt_unlock(EDIT_SECRET));
    assert!(gate.attempt_unlock("another-secret"));
    assert!(gate.is_editing());
}
