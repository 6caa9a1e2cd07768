//! Fixture discovery
//!
//! A fixture is the lowest suite whose *first* child is a test case
//! (a test method or a parameterized method). Only the first child is
//! inspected; suites mixing nested suites and test cases at the same level
//! are classified by whichever comes first.

use tracing::debug;

use crate::models::{Node, NodeId, NodeKind, Tree};

/// Locate every fixture of `tree` in pre-order
pub fn locate_fixtures<T>(tree: &Tree<T>) -> Vec<NodeId> {
    locate_matching(tree, |_| true)
}

/// Locate fixtures that also satisfy `accept`.
///
/// When a suite passes the structural test but not `accept`, the search does
/// not descend further below it.
pub fn locate_matching<T>(tree: &Tree<T>, accept: impl Fn(&Node<T>) -> bool) -> Vec<NodeId> {
    let mut fixtures = Vec::new();
    if let Some(root) = tree.root() {
        visit(tree, root, &accept, &mut fixtures);
    }
    fixtures
}

/// Whether `id` passes the first-child structural test
pub fn is_fixture<T>(tree: &Tree<T>, id: NodeId) -> bool {
    tree.get(id).is_some_and(|node| node.kind() == NodeKind::Suite)
        && tree
            .first_child(id)
            .is_some_and(|child| child.kind().is_test_case())
}

fn visit<T>(
    tree: &Tree<T>,
    id: NodeId,
    accept: &impl Fn(&Node<T>) -> bool,
    out: &mut Vec<NodeId>,
) {
    let node = &tree[id];
    if is_fixture(tree, id) {
        if accept(node) {
            debug!("Located fixture: '{}'", node.full_name());
            out.push(id);
        }
        return;
    }
    for &child in node.children() {
        visit(tree, child, accept, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeDef, SuiteTree};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn names(tree: &SuiteTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree[id].full_name().to_string()).collect()
    }

    #[test]
    fn test_locates_lowest_suites() {
        let tree = NodeDef::suite("Suite")
            .child(
                NodeDef::suite("Login")
                    .child(NodeDef::test("Valid"))
                    .child(NodeDef::test("Invalid")),
            )
            .child(
                NodeDef::suite("Nested").child(
                    NodeDef::suite("Search")
                        .child(NodeDef::parameterized("Query").child(NodeDef::test("Query(1)"))),
                ),
            )
            .into_suite_tree()
            .unwrap();

        let fixtures = locate_fixtures(&tree);
        assert_eq!(
            names(&tree, &fixtures),
            vec!["Suite.Login", "Suite.Nested.Search"]
        );
    }

    #[test]
    fn test_empty_and_childless() {
        let empty: SuiteTree = SuiteTree::empty();
        assert!(locate_fixtures(&empty).is_empty());

        let tree = NodeDef::suite("Suite")
            .child(NodeDef::suite("Empty"))
            .into_suite_tree()
            .unwrap();
        assert!(locate_fixtures(&tree).is_empty());
    }

    #[test]
    fn test_first_child_decides() {
        // the nested suite sits behind a test case, so it is never visited
        let tree = NodeDef::suite("Mixed")
            .child(NodeDef::test("Direct"))
            .child(NodeDef::suite("Inner").child(NodeDef::test("Hidden")))
            .into_suite_tree()
            .unwrap();

        let fixtures = locate_fixtures(&tree);
        assert_eq!(names(&tree, &fixtures), vec!["Mixed"]);
    }

    #[test]
    fn test_locate_matching_filters() {
        let tree = NodeDef::suite("Suite")
            .child(NodeDef::suite("Keep").property("Owner", "qa").child(NodeDef::test("A")))
            .child(NodeDef::suite("Drop").child(NodeDef::test("B")))
            .into_suite_tree()
            .unwrap();

        let fixtures = locate_matching(&tree, |n| n.properties().contains_key("Owner"));
        assert_eq!(names(&tree, &fixtures), vec!["Suite.Keep"]);
    }

    /// Suites whose children are either all suites or all test cases
    fn homogeneous_suite() -> impl Strategy<Value = NodeDef> {
        let case = prop_oneof![
            Just(NodeDef::test("Case")),
            (1usize..4).prop_map(|n| {
                (1..=n).fold(NodeDef::parameterized("Param"), |m, i| {
                    m.child(NodeDef::test(format!("Param({i})")))
                })
            }),
        ];
        let fixture = prop::collection::vec(case, 1..4).prop_map(|cases| {
            cases
                .into_iter()
                .enumerate()
                .fold(NodeDef::suite("Fixture"), |f, (i, mut c)| {
                    c.name = format!("{}{i}", c.name);
                    for case in &mut c.children {
                        case.name = format!("{}{i}{}", &case.name[..5], &case.name[5..]);
                    }
                    f.child(c)
                })
        });
        fixture.prop_recursive(3, 32, 3, |inner| {
            prop::collection::vec(inner, 0..3).prop_map(|suites| {
                suites
                    .into_iter()
                    .enumerate()
                    .fold(NodeDef::suite("Group"), |g, (i, mut s)| {
                        s.name = format!("{}{i}", s.name);
                        g.child(s)
                    })
            })
        })
    }

    proptest! {
        #[test]
        fn prop_fixtures_partition_leaves(def in homogeneous_suite()) {
            let tree = def.into_suite_tree().unwrap();
            let fixtures = locate_fixtures(&tree);

            let mut seen = HashSet::new();
            for &fixture in &fixtures {
                for leaf in tree.leaves_under(fixture) {
                    prop_assert!(seen.insert(leaf), "leaf covered twice");
                }
            }
            let all: HashSet<_> = tree.leaves().into_iter().collect();
            prop_assert_eq!(seen, all);
        }
    }
}
