//! Scheduler snapshot collaborator
//!
//! The test scheduler runs outside this crate and publishes what it has
//! dispatched as versioned, read-only snapshots. Declared scopes are read
//! through the same collaborator, which owns the lock guarding its lazily
//! populated scope store.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::scope::{serde_scope, ParallelScope};
use crate::models::PropertyBag;

/// A work item dispatched as a child of another
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedChild {
    pub full_name: String,
    #[serde(with = "serde_scope")]
    pub scope: ParallelScope,
}

/// A dispatched composite work item and its directly dispatched children
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedItem {
    pub full_name: String,
    #[serde(with = "serde_scope")]
    pub scope: ParallelScope,
    #[serde(default)]
    pub children: Vec<DispatchedChild>,
}

impl DispatchedItem {
    pub fn new(full_name: impl Into<String>, scope: ParallelScope) -> Self {
        Self {
            full_name: full_name.into(),
            scope,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, full_name: impl Into<String>, scope: ParallelScope) -> Self {
        self.children.push(DispatchedChild {
            full_name: full_name.into(),
            scope,
        });
        self
    }

    /// Whether every directly dispatched child declares a scope other than `None`
    pub fn children_parallel(&self) -> bool {
        self.children.iter().all(|c| c.scope.is_parallel())
    }
}

/// Point-in-time view of dispatched work
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSnapshot {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub items: Vec<DispatchedItem>,
}

impl DispatchSnapshot {
    pub fn new(version: u64, items: Vec<DispatchedItem>) -> Self {
        Self { version, items }
    }

    /// The work item running `fixture`: its own entry, or the entry that
    /// dispatched it as a direct child
    pub fn find_fixture(&self, fixture: &str) -> Option<&DispatchedItem> {
        self.items.iter().find(|item| {
            item.full_name == fixture || item.children.iter().any(|c| c.full_name == fixture)
        })
    }
}

/// Read-only access to live scheduler state
pub trait SchedulerView: Send + Sync {
    /// Latest published snapshot, if the scheduler is running
    fn snapshot(&self) -> Option<Arc<DispatchSnapshot>>;

    /// Declared scope of the node named `full_name` with `properties`
    fn declared_scope(&self, full_name: &str, properties: &PropertyBag) -> Option<ParallelScope>;
}

/// No scheduler attached: no snapshot, scopes read straight from properties
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

impl SchedulerView for Detached {
    fn snapshot(&self) -> Option<Arc<DispatchSnapshot>> {
        None
    }

    fn declared_scope(&self, _full_name: &str, properties: &PropertyBag) -> Option<ParallelScope> {
        ParallelScope::declared_in(properties)
    }
}

/// In-process scheduler state shared with a concurrently running dispatcher
#[derive(Debug, Default)]
pub struct LiveScheduler {
    current: RwLock<Option<Arc<DispatchSnapshot>>>,
    // entry created on first read of each node; scopes are always re-read
    declared: Mutex<HashSet<String>>,
}

impl LiveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler that starts from an existing snapshot
    pub fn with_snapshot(snapshot: DispatchSnapshot) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
            declared: Mutex::new(HashSet::new()),
        }
    }

    /// Replace the published snapshot, returning its version
    pub fn publish(&self, items: Vec<DispatchedItem>) -> u64 {
        let mut current = self.current.write();
        let version = current.as_ref().map(|s| s.version + 1).unwrap_or(1);
        *current = Some(Arc::new(DispatchSnapshot::new(version, items)));
        debug!("Published dispatch snapshot v{}", version);
        version
    }

    /// Drop the published snapshot, e.g. after the run finished
    pub fn clear(&self) {
        *self.current.write() = None;
    }

    /// Number of nodes whose scope entry has been created
    pub fn materialized(&self) -> usize {
        self.declared.lock().len()
    }
}

impl SchedulerView for LiveScheduler {
    fn snapshot(&self) -> Option<Arc<DispatchSnapshot>> {
        self.current.read().clone()
    }

    fn declared_scope(&self, full_name: &str, properties: &PropertyBag) -> Option<ParallelScope> {
        let mut declared = self.declared.lock();
        if !declared.contains(full_name) {
            declared.insert(full_name.to_string());
        }
        ParallelScope::declared_in(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::keys;

    #[test]
    fn test_publish_bumps_version() {
        let scheduler = LiveScheduler::new();
        assert!(scheduler.snapshot().is_none());

        assert_eq!(scheduler.publish(Vec::new()), 1);
        assert_eq!(scheduler.publish(Vec::new()), 2);
        assert_eq!(scheduler.snapshot().unwrap().version, 2);

        scheduler.clear();
        assert!(scheduler.snapshot().is_none());
    }

    #[test]
    fn test_snapshot_is_stable_after_publish() {
        let scheduler = LiveScheduler::new();
        scheduler.publish(vec![DispatchedItem::new("A", ParallelScope::NONE)]);
        let held = scheduler.snapshot().unwrap();
        scheduler.publish(Vec::new());
        assert_eq!(held.items.len(), 1);
    }

    #[test]
    fn test_find_fixture() {
        let snapshot = DispatchSnapshot::new(
            1,
            vec![DispatchedItem::new("Suite.Login", ParallelScope::NONE)
                .child("Suite.Login.Valid", ParallelScope::SELF)],
        );
        assert!(snapshot.find_fixture("Suite.Login").is_some());
        assert!(snapshot.find_fixture("Suite.Login.Valid").is_some());
        assert!(snapshot.find_fixture("Suite.Search").is_none());
    }

    #[test]
    fn test_declared_scope_reads_current_properties() {
        let scheduler = LiveScheduler::new();
        let bag = PropertyBag::new().with(keys::PARALLEL_SCOPE, "Children");

        assert_eq!(
            scheduler.declared_scope("A", &bag),
            Some(ParallelScope::CHILDREN)
        );
        assert_eq!(scheduler.declared_scope("A", &PropertyBag::new()), None);
        assert_eq!(scheduler.declared_scope("B", &PropertyBag::new()), None);
        assert_eq!(scheduler.materialized(), 2);
    }

    #[test]
    fn test_snapshot_serde() {
        let yaml = "version: 3\nitems:\n  - full_name: Suite.Login\n    scope: None\n    children:\n      - full_name: Suite.Login.Valid\n        scope: Self|Children\n";
        let snapshot: DispatchSnapshot = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(snapshot.version, 3);
        assert_eq!(snapshot.items[0].children[0].scope, ParallelScope::ALL);

        let bad = "items:\n  - full_name: X\n    scope: Sometimes\n";
        assert!(serde_yaml::from_str::<DispatchSnapshot>(bad).is_err());
    }
}
