// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Test utilities for Tomahawk account integration tests.
//!
//! Everything here is deterministic and in-process: no plugin libraries are
//! loaded and no timers run.
//!
//! # Components
//!
//! - [`MockAccountFactory`] - built-in factory whose accounts count every call
//! - [`MockAccountProbe`] - handle on a created account for assertions and signals
//! - [`RecordingObserver`] - captures events with a registry snapshot
//! - [`RecordingPeerNetwork`] - captures hook-ups and remote purges
//! - [`TestHarness`] - an `AccountManager` wired to all of the above

pub mod harness;
pub mod mock_account;
pub mod mock_factory;
pub mod recording;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_account::{MockAccount, MockAccountProbe, MockConnectivityPlugin};
pub use mock_factory::MockAccountFactory;
pub use recording::{RecordedEvent, RecordingObserver, RecordingPeerNetwork};
