// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end account lifecycle tests against mock factories.

use std::time::{Duration, Instant};

use tomahawk_accounts::{AccountEvent, DynamicLoader, PluginLocator, discover};
use tomahawk_core::{AccountId, AccountType, ConnectionState, ErrorCode, TomahawkError};
use tomahawk_test_utils::{MockAccountFactory, TestHarness};

fn id(s: &str) -> AccountId {
    AccountId::from(s)
}

fn xmpp_harness(persisted: &[&str]) -> TestHarness {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp"))
        .with_persisted(persisted.iter().copied())
        .build();
    harness.manager.load_from_config();
    harness.observer.clear();
    harness
}

// ---------------------------------------------------------------------------
// Loading from settings
// ---------------------------------------------------------------------------

#[test]
fn unknown_factory_ids_are_skipped() {
    let xmpp = MockAccountFactory::new("xmpp");
    let mut harness = TestHarness::builder()
        .with_factory(xmpp.clone())
        .with_persisted(["xmpp_alice", "myspace_jdoe", "xmpp_bob"])
        .build();

    let summary = harness.manager.load_from_config();

    assert_eq!(summary.loaded, vec![id("xmpp_alice"), id("xmpp_bob")]);
    assert_eq!(summary.unknown_factory, vec![id("myspace_jdoe")]);
    assert_eq!(summary.skipped(), 1);
    assert_eq!(harness.manager.account_ids(), vec![id("xmpp_alice"), id("xmpp_bob")]);
    // Only known factories are ever asked to create accounts.
    assert_eq!(xmpp.created_ids(), vec![id("xmpp_alice"), id("xmpp_bob")]);
    // Skipped ids stay persisted.
    assert!(harness.persisted().contains(&"myspace_jdoe".to_string()));
}

#[test]
fn factory_lookup_uses_id_prefix() {
    let harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("twitter"))
        .build();

    let factory = harness
        .manager
        .factory_for_account(&id("twitter_jdoe"))
        .expect("twitter factory is loaded");
    assert_eq!(factory.factory_id(), "twitter");
    assert!(harness.manager.factory_for_account(&id("myspace_jdoe")).is_none());
}

#[test]
fn duplicate_persisted_ids_are_rejected() {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp"))
        .with_persisted(["xmpp_alice", "xmpp_alice"])
        .build();

    let summary = harness.manager.load_from_config();

    assert_eq!(summary.loaded, vec![id("xmpp_alice")]);
    assert_eq!(summary.rejected.len(), 1);
    assert!(matches!(summary.rejected[0].1, TomahawkError::DuplicateAccount(_)));
    assert_eq!(harness.manager.registry().len(), 1);
}

#[test]
fn added_accounts_land_in_every_declared_type_list() {
    let mut harness = TestHarness::builder()
        .with_factory(
            MockAccountFactory::new("spotify").with_types(AccountType::Resolver | AccountType::Metadata),
        )
        .with_factory(MockAccountFactory::new("xmpp"))
        .with_persisted(["spotify_a", "xmpp_b"])
        .build();
    harness.manager.load_from_config();

    let m = &harness.manager;
    assert_eq!(m.accounts_of_type(AccountType::Resolver), &[id("spotify_a")]);
    assert_eq!(m.accounts_of_type(AccountType::Metadata), &[id("spotify_a")]);
    assert_eq!(m.accounts_of_type(AccountType::Connectivity), &[id("xmpp_b")]);
    assert!(m.has_plugin_with_factory("spotify"));
    assert!(!m.has_plugin_with_factory("lastfm"));

    let added: Vec<_> = harness
        .observer
        .records()
        .into_iter()
        .filter(|r| matches!(r.event, AccountEvent::Added(_)))
        .map(|r| (r.event.account_id().clone(), r.index))
        .collect();
    assert_eq!(added, vec![(id("spotify_a"), Some(0)), (id("xmpp_b"), Some(1))]);
}

// ---------------------------------------------------------------------------
// Creating and removing
// ---------------------------------------------------------------------------

#[test]
fn create_account_persists_and_registers() {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp"))
        .build();

    let created = harness.manager.create_account("xmpp").unwrap();

    assert_eq!(created.factory_id(), "xmpp");
    assert_eq!(harness.persisted(), vec![created.to_string()]);
    assert!(harness.manager.account(&created).is_some());
    assert_eq!(harness.observer.events(), vec![AccountEvent::Added(created)]);
}

#[test]
fn create_account_for_unknown_factory_changes_nothing() {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp"))
        .build();

    let err = harness.manager.create_account("myspace").unwrap_err();

    assert!(matches!(err, TomahawkError::UnknownFactory { ref factory_id, .. } if factory_id == "myspace"));
    assert!(harness.persisted().is_empty());
    assert!(harness.manager.registry().is_empty());
    assert!(harness.observer.events().is_empty());
}

#[test]
fn removed_is_observed_while_account_is_still_listed() {
    let mut harness = xmpp_harness(&["xmpp_alice", "xmpp_bob"]);
    let bob = id("xmpp_bob");
    let probe = harness.probe(&bob).unwrap();

    harness.manager.remove_account(&bob).unwrap();

    let records = harness.observer.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event, AccountEvent::Removed(bob.clone()));
    assert_eq!(records[0].index, Some(1));

    assert!(harness.manager.account(&bob).is_none());
    assert_eq!(harness.manager.account_ids(), vec![id("xmpp_alice")]);
    assert!(harness.manager.accounts_of_type(AccountType::Connectivity).iter().all(|a| *a != bob));
    assert_eq!(harness.persisted(), vec!["xmpp_alice".to_string()]);
    assert_eq!(probe.deauthenticate_calls(), 1);
    assert_eq!(probe.remove_from_config_calls(), 1);
    assert!(probe.is_dropped());
    assert_eq!(harness.peers.unhooked(), vec![bob]);
}

#[test]
fn removing_a_connected_account_reports_it_going_down_first() {
    let mut harness = xmpp_harness(&["xmpp_alice", "xmpp_bob"]);
    let alice = id("xmpp_alice");
    let plugin = harness.probe(&alice).unwrap();
    plugin.emit_state(ConnectionState::Connected);
    harness.pump();
    harness.observer.clear();

    harness.manager.remove_account(&alice).unwrap();
    // The plugin's own late notification finds the account gone.
    plugin.emit_state(ConnectionState::Disconnected);
    harness.pump();

    let records = harness.observer.records();
    assert_eq!(
        records.iter().map(|r| r.event.clone()).collect::<Vec<_>>(),
        vec![
            AccountEvent::Disconnected(alice.clone()),
            AccountEvent::StateChanged(alice.clone(), ConnectionState::Disconnected),
            AccountEvent::Removed(alice.clone()),
        ]
    );
    assert!(!records[0].connected);
    assert_eq!(records[2].index, Some(0));
    assert!(harness.manager.connected_accounts().is_empty());
}

#[test]
fn removing_a_disconnected_account_reports_only_removed() {
    let mut harness = xmpp_harness(&["xmpp_alice"]);
    let alice = id("xmpp_alice");

    harness.manager.remove_account(&alice).unwrap();

    assert_eq!(harness.observer.events(), vec![AccountEvent::Removed(alice)]);
}

#[test]
fn remove_completes_even_when_purging_plugin_config_fails() {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp").failing_remove_from_config())
        .with_persisted(["xmpp_alice"])
        .build();
    harness.manager.load_from_config();

    harness.manager.remove_account(&id("xmpp_alice")).unwrap();

    assert!(harness.manager.registry().is_empty());
    assert!(harness.persisted().is_empty());
}

#[test]
fn removing_twice_reports_not_found() {
    let mut harness = xmpp_harness(&["xmpp_alice"]);
    harness.manager.remove_account(&id("xmpp_alice")).unwrap();
    let err = harness.manager.remove_account(&id("xmpp_alice")).unwrap_err();
    assert!(matches!(err, TomahawkError::AccountNotFound(_)));
}

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

#[test]
fn connected_then_disconnected_notifies_once_each_in_order() {
    let mut harness = xmpp_harness(&["xmpp_alice"]);
    let alice = id("xmpp_alice");
    let probe = harness.probe(&alice).unwrap();

    probe.emit_state(ConnectionState::Connected);
    probe.emit_state(ConnectionState::Disconnected);
    assert_eq!(harness.pump(), 2);

    assert_eq!(
        harness.observer.events(),
        vec![
            AccountEvent::Connected(alice.clone()),
            AccountEvent::StateChanged(alice.clone(), ConnectionState::Connected),
            AccountEvent::Disconnected(alice.clone()),
            AccountEvent::StateChanged(alice.clone(), ConnectionState::Disconnected),
        ]
    );
    assert!(harness.manager.connected_accounts().is_empty());

    let records = harness.observer.records();
    assert!(records[0].connected && records[0].enabled);
    assert!(!records[2].connected);
}

#[test]
fn intermediate_states_only_emit_state_changed() {
    let mut harness = xmpp_harness(&["xmpp_alice"]);
    let alice = id("xmpp_alice");
    harness.probe(&alice).unwrap().emit_state(ConnectionState::Connecting);
    harness.pump();

    assert_eq!(
        harness.observer.events(),
        vec![AccountEvent::StateChanged(alice, ConnectionState::Connecting)]
    );
}

#[test]
fn connected_account_is_also_enabled() {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp").disabled())
        .with_persisted(["xmpp_alice"])
        .build();
    harness.manager.load_from_config();
    harness.manager.init_sip();
    assert!(harness.manager.enabled_accounts().is_empty());

    let alice = id("xmpp_alice");
    harness.probe(&alice).unwrap().emit_state(ConnectionState::Connected);
    harness.pump();

    assert_eq!(harness.manager.connected_accounts(), &[alice.clone()]);
    assert_eq!(harness.manager.enabled_accounts(), &[alice]);
}

#[test]
fn signals_from_removed_accounts_are_ignored() {
    let mut harness = xmpp_harness(&["xmpp_alice"]);
    let alice = id("xmpp_alice");
    let probe = harness.probe(&alice).unwrap();
    harness.manager.remove_account(&alice).unwrap();
    harness.observer.clear();

    probe.emit_state(ConnectionState::Connected);
    probe.emit_error(ErrorCode::ConnectionError, "late");
    assert_eq!(harness.pump(), 2);

    assert!(harness.observer.events().is_empty());
    assert!(harness.manager.connected_accounts().is_empty());
    assert!(harness.manager.next_retry_deadline().is_none());
}

// ---------------------------------------------------------------------------
// Errors and retries
// ---------------------------------------------------------------------------

#[test]
fn auth_error_escalates_without_retry() {
    let mut harness = xmpp_harness(&["xmpp_alice"]);
    let alice = id("xmpp_alice");
    harness
        .probe(&alice)
        .unwrap()
        .emit_error(ErrorCode::AuthError, "bad password");
    harness.pump();

    let events = harness.observer.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        AccountEvent::AuthError(who, error) if *who == alice && error.message == "bad password"
    ));
    assert!(!harness.manager.is_retry_pending(&alice));
}

#[test]
fn transient_error_retries_after_delay() {
    let mut harness = xmpp_harness(&["xmpp_alice"]);
    let alice = id("xmpp_alice");
    let probe = harness.probe(&alice).unwrap();
    let before = probe.authenticate_calls();

    let now = Instant::now();
    probe.emit_error(ErrorCode::ConnectionError, "timeout");
    let signal = harness.signals.try_recv().unwrap();
    harness.manager.handle_signal_at(signal, now);

    let deadline = harness.manager.next_retry_deadline().unwrap();
    assert_eq!(deadline, now + Duration::from_secs(10));
    assert!(harness.manager.fire_due_retries(now + Duration::from_secs(9)).is_empty());
    assert_eq!(probe.authenticate_calls(), before);

    assert_eq!(harness.manager.fire_due_retries(deadline), vec![alice.clone()]);
    assert_eq!(probe.authenticate_calls(), before + 1);
    assert!(!harness.manager.is_retry_pending(&alice));
    assert!(harness.observer.events().is_empty());
}

#[test]
fn repeated_errors_keep_a_single_pending_retry() {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp"))
        .with_persisted(["xmpp_alice"])
        .with_retry_delay(Duration::from_secs(2))
        .build();
    harness.manager.load_from_config();
    let alice = id("xmpp_alice");
    let probe = harness.probe(&alice).unwrap();

    let start = Instant::now();
    for offset in [0, 1] {
        probe.emit_error(ErrorCode::Other(7), "flaky");
        let signal = harness.signals.try_recv().unwrap();
        harness
            .manager
            .handle_signal_at(signal, start + Duration::from_secs(offset));
    }

    assert_eq!(harness.manager.next_retry_deadline(), Some(start + Duration::from_secs(3)));
    let fired = harness.manager.fire_due_retries(start + Duration::from_secs(60));
    assert_eq!(fired, vec![alice]);
    assert!(harness.manager.next_retry_deadline().is_none());
}

#[test]
fn removal_cancels_pending_retry() {
    let mut harness = xmpp_harness(&["xmpp_alice"]);
    let alice = id("xmpp_alice");
    let probe = harness.probe(&alice).unwrap();
    probe.emit_error(ErrorCode::ConnectionError, "timeout");
    harness.pump();
    assert!(harness.manager.is_retry_pending(&alice));

    harness.manager.remove_account(&alice).unwrap();

    assert!(harness.manager.next_retry_deadline().is_none());
    let far_future = Instant::now() + Duration::from_secs(3600);
    assert!(harness.manager.fire_due_retries(far_future).is_empty());
}

#[test]
fn connecting_cancels_pending_retry() {
    let mut harness = xmpp_harness(&["xmpp_alice"]);
    let alice = id("xmpp_alice");
    let probe = harness.probe(&alice).unwrap();
    probe.emit_error(ErrorCode::ConnectionError, "timeout");
    probe.emit_state(ConnectionState::Connected);
    harness.pump();

    assert!(!harness.manager.is_retry_pending(&alice));
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

#[test]
fn init_sip_hooks_up_and_authenticates_auto_connect_accounts() {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp"))
        .with_factory(MockAccountFactory::new("google").without_auto_connect())
        .with_factory(MockAccountFactory::new("zeroconf").disabled())
        .with_factory(MockAccountFactory::new("lastfm").with_types(AccountType::Metadata))
        .with_persisted(["xmpp_a", "google_b", "zeroconf_c", "lastfm_d"])
        .build();
    harness.manager.load_from_config();

    harness.manager.init_sip();

    let hooked: Vec<_> = harness.peers.hooked().into_iter().map(|(id, _)| id).collect();
    assert_eq!(hooked, vec![id("xmpp_a"), id("google_b"), id("zeroconf_c")]);
    assert_eq!(harness.manager.enabled_accounts(), &[id("xmpp_a")]);
    assert_eq!(harness.probe(&id("xmpp_a")).unwrap().authenticate_calls(), 1);
    assert_eq!(harness.probe(&id("google_b")).unwrap().authenticate_calls(), 0);
    assert_eq!(harness.probe(&id("zeroconf_c")).unwrap().authenticate_calls(), 0);
    assert_eq!(harness.probe(&id("lastfm_d")).unwrap().authenticate_calls(), 0);

    // Manual enabling ignores the auto-connect flag but not the enabled flag.
    harness.manager.enable_account(&id("google_b")).unwrap();
    harness.manager.enable_account(&id("zeroconf_c")).unwrap();
    assert_eq!(harness.manager.enabled_accounts(), &[id("xmpp_a"), id("google_b")]);
    assert_eq!(harness.probe(&id("google_b")).unwrap().authenticate_calls(), 1);

    let err = harness.manager.enable_account(&id("xmpp_ghost")).unwrap_err();
    assert!(matches!(err, TomahawkError::AccountNotFound(_)));
}

#[test]
fn accounts_without_plugin_are_not_hooked_up() {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp").without_plugin())
        .with_persisted(["xmpp_a"])
        .build();
    harness.manager.load_from_config();

    harness.manager.init_sip();
    harness.manager.connect_all();

    assert!(harness.peers.hooked().is_empty());
    assert_eq!(harness.manager.enabled_accounts(), &[id("xmpp_a")]);
    assert_eq!(harness.probe(&id("xmpp_a")).unwrap().connect_calls(), 0);
}

#[test]
fn connect_all_and_disconnect_all() {
    let mut harness = TestHarness::builder()
        .with_factory(MockAccountFactory::new("xmpp"))
        .with_factory(MockAccountFactory::new("lastfm").with_types(AccountType::Metadata))
        .with_persisted(["xmpp_a", "xmpp_b", "lastfm_c"])
        .build();
    harness.manager.load_from_config();

    harness.manager.connect_all();
    assert!(harness.manager.is_connected());
    assert_eq!(harness.probe(&id("xmpp_a")).unwrap().connect_calls(), 1);
    assert_eq!(harness.probe(&id("xmpp_b")).unwrap().connect_calls(), 1);

    harness.probe(&id("xmpp_a")).unwrap().emit_state(ConnectionState::Connected);
    harness.pump();

    harness.manager.toggle_accounts_connected();
    assert!(!harness.manager.is_connected());
    // Only accounts that reported Connected are disconnected.
    assert_eq!(harness.probe(&id("xmpp_a")).unwrap().disconnect_calls(), 1);
    assert_eq!(harness.probe(&id("xmpp_b")).unwrap().disconnect_calls(), 0);
    assert_eq!(harness.peers.remove_all_remote_calls(), 1);
}

#[test]
fn settings_change_reaches_every_connectivity_plugin() {
    let mut harness = xmpp_harness(&["xmpp_a", "xmpp_b"]);
    harness.manager.on_settings_changed();
    for account in ["xmpp_a", "xmpp_b"] {
        assert_eq!(harness.probe(&id(account)).unwrap().check_settings_calls(), 1);
    }
}

#[test]
fn shutdown_disconnects_and_drops_accounts() {
    let mut harness = xmpp_harness(&["xmpp_a"]);
    let probe = harness.probe(&id("xmpp_a")).unwrap();
    harness.manager.connect_all();
    probe.emit_state(ConnectionState::Connected);
    harness.pump();

    harness.manager.shutdown();

    assert!(!harness.manager.is_connected());
    assert_eq!(probe.disconnect_calls(), 1);
    assert!(probe.is_dropped());
    assert!(harness.manager.registry().is_empty());
    assert_eq!(harness.manager.factories().len(), 1);
}

#[test]
fn dropping_a_connected_manager_disconnects() {
    let harness = {
        let mut harness = xmpp_harness(&["xmpp_a"]);
        harness.manager.connect_all();
        harness.probe(&id("xmpp_a")).unwrap().emit_state(ConnectionState::Connected);
        harness.pump();
        harness
    };
    let probe = harness.probe(&id("xmpp_a")).unwrap();
    let peers = harness.peers.clone();

    drop(harness);

    assert_eq!(probe.disconnect_calls(), 1);
    assert!(probe.is_dropped());
    assert_eq!(peers.remove_all_remote_calls(), 1);
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[test]
fn discovery_survives_broken_plugins() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("libtomahawk_account_broken.so"), b"\x7fELF nope").unwrap();
    std::fs::write(dir.path().join("libtomahawk_account_text.so"), b"plain text").unwrap();
    std::fs::write(dir.path().join("README"), b"not a plugin").unwrap();

    let locator = PluginLocator::new(dir.path())
        .with_install_prefix(dir.path().join("none"))
        .with_bundle_fallback(false);
    let (registry, report) = discover(&locator, &DynamicLoader::new());

    assert!(registry.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.loaded.is_empty());
}
