// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-shot reconnect timers.
//!
//! At most one retry is pending per account. Scheduling again replaces the
//! previous deadline. The schedule holds no timers itself: the control loop
//! sleeps until [`RetrySchedule::next_deadline`] and then collects what is due.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tomahawk_core::AccountId;

#[derive(Debug, Clone)]
pub struct RetrySchedule {
    delay: Duration,
    pending: HashMap<AccountId, Instant>,
}

impl RetrySchedule {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a retry for `id` at `now + delay`, returning the deadline.
    pub fn schedule(&mut self, id: &AccountId, now: Instant) -> Instant {
        let deadline = now + self.delay;
        self.pending.insert(id.clone(), deadline);
        deadline
    }

    /// Returns true if a retry was pending.
    pub fn cancel(&mut self, id: &AccountId) -> bool {
        self.pending.remove(id).is_some()
    }

    pub fn is_pending(&self, id: &AccountId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every retry due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<AccountId> {
        let mut due: Vec<(Instant, AccountId)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, id.clone()))
            .collect();
        due.sort();

        for (_, id) in &due {
            self.pending.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
