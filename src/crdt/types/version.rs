//! Per-site causal version tracking.
//!
//! This module contains the Version and VersionVector types used to detect
//! duplicate and out-of-order remote operations, which is what makes remote
//! application idempotent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::crdt::types::site::SiteId;

/// Identifies exactly one causal event produced by a site: its `counter`-th
/// local mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// The site that produced the event.
    pub site: SiteId,
    /// The site's local causal counter at the time of the event.
    pub counter: u64,
}

impl Version {
    /// Creates a new version from a site and counter.
    pub fn new(site: SiteId, counter: u64) -> Self {
        Version { site, counter }
    }
}

/// What one replica knows about a single remote site's causal history.
///
/// `counter` is the highest counter seen from the site; `exceptions` are the
/// counters below it that have not arrived yet. Tracking the gaps is what
/// keeps duplicate detection correct when a site's operations are delivered
/// out of order: an unseen older operation must not be mistaken for a
/// duplicate of a newer one.
#[derive(Debug, Clone, Default)]
struct SiteRecord {
    counter: u64,
    exceptions: Vec<u64>,
}

impl SiteRecord {
    fn update(&mut self, counter: u64) {
        if counter <= self.counter {
            if let Some(i) = self.exceptions.iter().position(|&e| e == counter) {
                self.exceptions.swap_remove(i);
            }
        } else {
            for missing in self.counter + 1..counter {
                self.exceptions.push(missing);
            }
            self.counter = counter;
        }
    }

    fn has_been_applied(&self, counter: u64) -> bool {
        counter <= self.counter && !self.exceptions.contains(&counter)
    }
}

/// A replica's record of the causal events seen from every site.
///
/// Each replica owns exactly one vector for the life of the engine. The local
/// counter increments on every local edit; records for other sites grow as
/// their operations are applied. The vector is never reset.
#[derive(Debug, Clone)]
pub struct VersionVector {
    site: SiteId,
    local_counter: u64,
    seen: HashMap<SiteId, SiteRecord>,
}

impl VersionVector {
    /// Creates a new version vector owned by `site`, with no events recorded.
    pub fn new(site: SiteId) -> Self {
        VersionVector {
            site,
            local_counter: 0,
            seen: HashMap::new(),
        }
    }

    /// The site that owns this vector.
    pub fn site(&self) -> SiteId {
        self.site
    }

    /// Advances the local causal counter by one and returns the new value.
    ///
    /// Called once per local edit (insert or delete) before the edit is
    /// materialized, so the resulting element always carries the new counter.
    pub fn increment(&mut self) -> u64 {
        self.local_counter += 1;
        self.local_counter
    }

    /// The current local causal counter.
    pub fn local_counter(&self) -> u64 {
        self.local_counter
    }

    /// Records the event identified by `v` as applied.
    ///
    /// Raises the recorded counter for `v.site` to `max(current, v.counter)`;
    /// counters skipped over by an out-of-order arrival are remembered as
    /// exceptions until they arrive themselves.
    pub fn update(&mut self, v: Version) {
        if v.site == self.site {
            self.local_counter = self.local_counter.max(v.counter);
        } else {
            self.seen.entry(v.site).or_default().update(v.counter);
        }
    }

    /// Returns true iff the event identified by `v` has already been recorded.
    ///
    /// For the local site this checks against the local counter; for remote
    /// sites it checks the site's record, exceptions included.
    pub fn has_been_applied(&self, v: &Version) -> bool {
        if v.site == self.site {
            v.counter <= self.local_counter
        } else {
            self.seen
                .get(&v.site)
                .is_some_and(|record| record.has_been_applied(v.counter))
        }
    }
}
