//! Parallel eligibility of a single test

use tracing::debug;

use super::scheduler::{DispatchSnapshot, SchedulerView};
use super::scope::ParallelScope;
use crate::error::{Result, SuiteError};
use crate::models::{Node, NodeId, NodeKind, Tree};

/// Decides whether a test may run concurrently with its siblings
pub struct ParallelResolver<'a, S: SchedulerView + ?Sized> {
    scheduler: &'a S,
}

impl<'a, S: SchedulerView + ?Sized> ParallelResolver<'a, S> {
    pub fn new(scheduler: &'a S) -> Self {
        Self { scheduler }
    }

    /// Whether `test` is parallel.
    ///
    /// Its enclosing context (the parent, plus the grandparent when the
    /// parent is a parameterized method) qualifies statically through a
    /// non-`None` declared scope, or live when the scheduler dispatched it
    /// with only parallel children. Otherwise the test's own declaration
    /// decides.
    pub fn is_parallel<T>(&self, tree: &Tree<T>, test: NodeId) -> Result<bool> {
        let node = tree.get(test).ok_or(SuiteError::UnknownNode(test.index()))?;
        let contexts = enclosing_contexts(tree, node)?;

        // one read per decision; later publishes are not observed
        let snapshot = self.scheduler.snapshot();

        for context in contexts {
            if self.context_is_parallel(&tree[context], snapshot.as_deref()) {
                debug!(
                    "'{}' is parallel through '{}'",
                    node.full_name(),
                    tree[context].full_name()
                );
                return Ok(true);
            }
        }

        Ok(self.declares_parallel(node))
    }

    fn context_is_parallel<T>(&self, fixture: &Node<T>, snapshot: Option<&DispatchSnapshot>) -> bool {
        // All|Children is one of the non-None declarations
        if self.declares_parallel(fixture) {
            return true;
        }

        snapshot
            .and_then(|s| s.find_fixture(fixture.full_name()))
            .is_some_and(|item| item.children_parallel())
    }

    fn declares_parallel<T>(&self, node: &Node<T>) -> bool {
        self.declared(node).is_some_and(|scope| scope.is_parallel())
    }

    fn declared<T>(&self, node: &Node<T>) -> Option<ParallelScope> {
        self.scheduler
            .declared_scope(node.full_name(), node.properties())
    }
}

/// Parent of `node`, followed by the grandparent when the parent is a
/// parameterized method
fn enclosing_contexts<T>(tree: &Tree<T>, node: &Node<T>) -> Result<Vec<NodeId>> {
    let orphan = || SuiteError::OrphanTest(node.full_name().to_string());

    let parent = node.parent().ok_or_else(orphan)?;
    let mut contexts = vec![parent];
    if tree[parent].kind() == NodeKind::ParameterizedMethod {
        contexts.push(tree[parent].parent().ok_or_else(orphan)?);
    }
    Ok(contexts)
}

/// [`ParallelResolver::is_parallel`] for a one-off decision
pub fn is_parallel<T, S>(tree: &Tree<T>, test: NodeId, scheduler: &S) -> Result<bool>
where
    S: SchedulerView + ?Sized,
{
    ParallelResolver::new(scheduler).is_parallel(tree, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{keys, NodeDef, SuiteTree};
    use crate::parallel::{Detached, DispatchedItem, LiveScheduler};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    fn scoped(def: NodeDef, scope: &str) -> NodeDef {
        def.property(keys::PARALLEL_SCOPE, scope)
    }

    fn tree() -> SuiteTree {
        NodeDef::suite("Suite")
            .child(
                scoped(NodeDef::suite("Everything"), "All|Children")
                    .child(NodeDef::test("A"))
                    .child(NodeDef::test("B")),
            )
            .child(
                scoped(NodeDef::suite("Serial"), "None")
                    .child(scoped(NodeDef::test("Own"), "Self"))
                    .child(NodeDef::test("Plain"))
                    .child(NodeDef::parameterized("Param").child(NodeDef::test("Param(1)"))),
            )
            .child(
                scoped(NodeDef::suite("Wide"), "Children")
                    .child(NodeDef::parameterized("Param").child(NodeDef::test("Param(1)"))),
            )
            .child(NodeDef::suite("Live").child(NodeDef::test("X")).child(NodeDef::test("Y")))
            .into_suite_tree()
            .unwrap()
    }

    fn check(tree: &SuiteTree, name: &str, scheduler: &dyn SchedulerView) -> bool {
        is_parallel(tree, tree.find(name).unwrap(), scheduler).unwrap()
    }

    #[test]
    fn test_all_children_fixture_regardless_of_snapshot() {
        let tree = tree();
        assert!(check(&tree, "Suite.Everything.A", &Detached));

        let scheduler = LiveScheduler::new();
        scheduler.publish(vec![DispatchedItem::new("Suite.Everything", ParallelScope::NONE)
            .child("Suite.Everything.A", ParallelScope::NONE)]);
        assert!(check(&tree, "Suite.Everything.A", &scheduler));
    }

    #[test]
    fn test_own_scope_under_serial_fixture() {
        let tree = tree();
        assert!(check(&tree, "Suite.Serial.Own", &Detached));
        assert!(!check(&tree, "Suite.Serial.Plain", &Detached));
    }

    #[test]
    fn test_parameterized_case_reads_grandparent() {
        let tree = tree();
        assert!(check(&tree, "Suite.Wide.Param(1)", &Detached));
        assert!(!check(&tree, "Suite.Serial.Param(1)", &Detached));
    }

    #[test]
    fn test_live_snapshot_qualifies_fixture() {
        let tree = tree();
        let scheduler = LiveScheduler::new();
        assert!(!check(&tree, "Suite.Live.X", &scheduler));

        scheduler.publish(vec![DispatchedItem::new("Suite.Live", ParallelScope::NONE)
            .child("Suite.Live.X", ParallelScope::SELF)
            .child("Suite.Live.Y", ParallelScope::SELF)]);
        assert!(check(&tree, "Suite.Live.X", &scheduler));

        scheduler.publish(vec![DispatchedItem::new("Suite.Live", ParallelScope::NONE)
            .child("Suite.Live.X", ParallelScope::SELF)
            .child("Suite.Live.Y", ParallelScope::NONE)]);
        assert!(!check(&tree, "Suite.Live.X", &scheduler));
    }

    #[test]
    fn test_live_snapshot_entry_dispatching_fixture() {
        let tree = tree();
        let scheduler = LiveScheduler::new();
        scheduler.publish(vec![DispatchedItem::new("Suite", ParallelScope::NONE)
            .child("Suite.Live", ParallelScope::CHILDREN)
            .child("Suite.Serial", ParallelScope::FIXTURES)]);
        assert!(check(&tree, "Suite.Live.Y", &scheduler));
    }

    #[test]
    fn test_scheduler_reused_across_trees() {
        let load = |scope: &str| {
            scoped(NodeDef::suite("Fixture"), scope)
                .child(NodeDef::test("Case"))
                .into_suite_tree()
                .unwrap()
        };
        let serial = load("None");
        let wide = load("All|Children");

        let scheduler = LiveScheduler::new();
        assert!(!check(&serial, "Fixture.Case", &scheduler));
        assert!(check(&wide, "Fixture.Case", &scheduler));
        assert!(!check(&serial, "Fixture.Case", &scheduler));
    }

    #[test]
    fn test_no_qualification_is_serial() {
        let tree = tree();
        assert!(!check(&tree, "Suite.Live.X", &Detached));
    }

    #[test]
    fn test_orphan_is_an_error() {
        let tree = NodeDef::test("Lonely").into_suite_tree().unwrap();
        let err = is_parallel(&tree, tree.root().unwrap(), &Detached).unwrap_err();
        assert!(matches!(err, SuiteError::OrphanTest(name) if name == "Lonely"));

        let tree = NodeDef::parameterized("Method")
            .child(NodeDef::test("Method(1)"))
            .into_suite_tree()
            .unwrap();
        let case = tree.find("Method.Method(1)").unwrap();
        assert!(matches!(
            is_parallel(&tree, case, &Detached),
            Err(SuiteError::OrphanTest(_))
        ));
    }

    #[test]
    fn test_concurrent_siblings_under_contention() {
        let tree = tree();
        let scheduler = LiveScheduler::new();
        let names = [
            "Suite.Everything.A",
            "Suite.Everything.B",
            "Suite.Serial.Own",
            "Suite.Serial.Plain",
            "Suite.Wide.Param(1)",
            "Suite.Live.X",
            "Suite.Live.Y",
        ];
        let expected: Vec<bool> = names
            .iter()
            .map(|name| check(&tree, name, &Detached))
            .collect();
        let done = AtomicBool::new(false);

        thread::scope(|s| {
            // live items never flip a decision here, only add contention
            s.spawn(|| {
                while !done.load(Ordering::Relaxed) {
                    scheduler.publish(vec![DispatchedItem::new("Suite.Live", ParallelScope::NONE)
                        .child("Suite.Live.X", ParallelScope::NONE)]);
                }
            });

            let workers: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        for _ in 0..200 {
                            for (name, want) in names.iter().zip(&expected) {
                                assert_eq!(check(&tree, name, &scheduler), *want, "{name}");
                            }
                        }
                    })
                })
                .collect();
            for worker in workers {
                worker.join().unwrap();
            }
            done.store(true, Ordering::Relaxed);
        });

        assert!(scheduler.materialized() > 0);
    }
}
