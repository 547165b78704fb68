//! Integration tests pinning execution semantics over generated trees.
//!
//! ## Fragment DSL
//!
//! The `Fragment` enum is a declarative DSL for building test trees.
//! Leaves finish with a chosen outcome or ask to be skipped; groups
//! hold children and may be skipped as a whole. `build()` turns a
//! fragment into real nodes under a plain root container.
//!
//! ## Prediction Model
//!
//! Each fragment predicts the notification tallies it contributes via
//! `predict()`:
//! - **Pass/Fail/Abort leaves**: start once and finish with the
//!   matching outcome
//! - **Skip leaves**: one skipped notification, nothing else
//! - **Skipped groups**: one skipped notification; children contribute
//!   nothing because the subtree is never visited
//! - **Running groups**: start and finish successfully (their hooks are
//!   neutral), plus the sum of their children
//!
//! ## Property-Based Testing
//!
//! The `prop_tests` module generates random fragment trees (depth 3,
//! 256 cases) and asserts that the observed run matches the prediction
//! and that the event stream is well nested. Ground truth comes from
//! the hand-written tests in this file and in `execution.rs`, which
//! assert hard-coded expected values; the property extends them to
//! arbitrary compositions.


use std::sync::Arc;

use gauntlet_engine::events::ExecutionEvent;
use gauntlet_engine::executor::{ExecutionStats, TreeExecutor};
use gauntlet_engine::listener::{
    CompositeListener, EventLog, ExecutionListener, RunSummary, SummaryListener,
};
use gauntlet_engine::tree::{NodeIndex, NodeTree};
use gauntlet_node::node::ContainerHooks;
use gauntlet_node::outcome::Outcome;
use gauntlet_node::skip::SkipDecision;
use test_utils::{SkippedLeaf, aborting_leaf, failing_leaf, passing_leaf};

// ═══════════════════════════════════════════════════════════════════════════════
// FRAGMENT DSL
// ═══════════════════════════════════════════════════════════════════════════════

/// How a generated leaf behaves.
#[derive(Clone, Copy, Debug)]
enum LeafKind {
    Pass,
    Fail,
    Abort,
    Skip,
}

/// Declarative tree fragment for composable test builders.
///
/// `Debug` is derived so that `proptest` can display shrunk
/// counterexamples.
#[derive(Clone, Debug)]
enum Fragment {
    /// A leaf finishing with the chosen behavior.
    Leaf(LeafKind),
    /// A container holding children, optionally skipped as a whole.
    Group { skipped: bool, children: Vec<Fragment> },
}

impl Fragment {
    /// Adds this fragment under `parent`, naming nodes `n0`, `n1`, ...
    /// in build order.
    fn build(&self, tree: &mut NodeTree<()>, parent: NodeIndex, serial: &mut usize) {
        let name = format!("n{serial}");
        *serial += 1;
        match self {
            Fragment::Leaf(LeafKind::Pass) => {
                tree.add_leaf(parent, name, passing_leaf()).unwrap();
            }
            Fragment::Leaf(LeafKind::Fail) => {
                tree.add_leaf(parent, name, failing_leaf("induced failure")).unwrap();
            }
            Fragment::Leaf(LeafKind::Abort) => {
                tree.add_leaf(parent, name, aborting_leaf("induced abort")).unwrap();
            }
            Fragment::Leaf(LeafKind::Skip) => {
                tree.add_leaf(parent, name, SkippedLeaf { reason: "generated skip" }).unwrap();
            }
            Fragment::Group { skipped, children } => {
                let hooks = if *skipped {
                    ContainerHooks::new()
                        .with_skip(|_context: &()| Ok(SkipDecision::skip("generated skip")))
                } else {
                    ContainerHooks::new()
                };
                let group = tree.add_container(parent, name, hooks).unwrap();
                for child in children {
                    child.build(tree, group, serial);
                }
            }
        }
    }

    /// Predicts the notification tallies this fragment contributes.
    fn predict(&self) -> Prediction {
        match self {
            Fragment::Leaf(LeafKind::Pass) => {
                Prediction { started: 1, successful: 1, ..Prediction::default() }
            }
            Fragment::Leaf(LeafKind::Fail) => {
                Prediction { started: 1, failed: 1, ..Prediction::default() }
            }
            Fragment::Leaf(LeafKind::Abort) => {
                Prediction { started: 1, aborted: 1, ..Prediction::default() }
            }
            Fragment::Leaf(LeafKind::Skip) | Fragment::Group { skipped: true, .. } => {
                Prediction { skipped: 1, ..Prediction::default() }
            }
            Fragment::Group { skipped: false, children } => {
                let mut total = Prediction { started: 1, successful: 1, ..Prediction::default() };
                for child in children {
                    total = total.merge(child.predict());
                }
                total
            }
        }
    }
}

/// Per-kind notification tallies predicted for a fragment.
#[derive(Clone, Copy, Debug, Default)]
struct Prediction {
    started: usize,
    successful: usize,
    failed: usize,
    aborted: usize,
    skipped: usize,
}

impl Prediction {
    fn merge(self, other: Prediction) -> Prediction {
        Prediction {
            started: self.started + other.started,
            successful: self.successful + other.successful,
            failed: self.failed + other.failed,
            aborted: self.aborted + other.aborted,
            skipped: self.skipped + other.skipped,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fragment DSL constructors
// ─────────────────────────────────────────────────────────────────────────────

fn pass() -> Fragment {
    Fragment::Leaf(LeafKind::Pass)
}

fn fail() -> Fragment {
    Fragment::Leaf(LeafKind::Fail)
}

fn abort() -> Fragment {
    Fragment::Leaf(LeafKind::Abort)
}

fn skip() -> Fragment {
    Fragment::Leaf(LeafKind::Skip)
}

fn group<I: IntoIterator<Item = Fragment>>(children: I) -> Fragment {
    Fragment::Group { skipped: false, children: children.into_iter().collect() }
}

fn skipped_group<I: IntoIterator<Item = Fragment>>(children: I) -> Fragment {
    Fragment::Group { skipped: true, children: children.into_iter().collect() }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEST RUNNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Builds a tree holding `fragment` under a plain root and returns it
/// with the whole-run prediction, root included.
fn plant(fragment: &Fragment) -> (NodeTree<()>, Prediction) {
    let mut tree = NodeTree::new("generated", ContainerHooks::new());
    let root = tree.root();
    let mut serial = 0;
    fragment.build(&mut tree, root, &mut serial);
    let prediction = fragment
        .predict()
        .merge(Prediction { started: 1, successful: 1, ..Prediction::default() });
    (tree, prediction)
}

/// Runs `tree` sequentially, returning events, summary, and stats.
fn run(tree: &NodeTree<()>) -> (Vec<ExecutionEvent>, RunSummary, ExecutionStats) {
    let log = Arc::new(EventLog::new());
    let summary = Arc::new(SummaryListener::new());
    let log_listener: Arc<dyn ExecutionListener> = log.clone();
    let summary_listener: Arc<dyn ExecutionListener> = summary.clone();
    let listener = CompositeListener::new().with(log_listener).with(summary_listener);

    let stats = TreeExecutor::new().execute(tree, (), &listener).unwrap();
    (log.snapshot(), summary.summary(), stats)
}

/// Asserts that a sequential event stream is well nested: every finish
/// closes the most recently opened node, skipped nodes are never open,
/// and nothing stays open at the end.
fn assert_well_nested(events: &[ExecutionEvent]) {
    let mut open: Vec<String> = Vec::new();
    for event in events {
        let id = event.id().to_string();
        match event.label() {
            "started" => open.push(id),
            "finished" => {
                let top = open.pop();
                assert_eq!(top.as_deref(), Some(id.as_str()), "finish closed the wrong node");
            }
            "skipped" => {
                assert!(!open.contains(&id), "skipped node {id} is already open");
            }
            other => panic!("unknown event label {other:?}"),
        }
    }
    assert!(open.is_empty(), "unclosed nodes: {open:?}");
}

fn worst_label(outcome: &Outcome) -> &'static str {
    if outcome.is_failed() {
        "failed"
    } else if outcome.is_aborted() {
        "aborted"
    } else {
        "successful"
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GROUND-TRUTH TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// A flat group with one leaf of each kind produces exactly the
/// hard-coded tallies, and the prediction model agrees.
#[test]
fn flat_fragment_counts() {
    let (tree, prediction) = plant(&group([pass(), fail(), abort(), skip()]));
    let (events, summary, stats) = run(&tree);

    assert_eq!((stats.nodes_started, stats.nodes_skipped), (5, 1));
    assert_eq!(
        (summary.successful, summary.failed, summary.aborted, summary.skipped),
        (3, 1, 1, 1)
    );
    assert!(summary.worst.is_failed());

    assert_eq!(stats.nodes_started, prediction.started);
    assert_eq!(summary.successful, prediction.successful);
    assert_well_nested(&events);
}

/// A skipped group is one notification; its children never surface.
#[test]
fn skipped_group_hides_children() {
    let (tree, prediction) = plant(&skipped_group([pass(), fail()]));
    let (events, summary, stats) = run(&tree);

    assert_eq!((stats.nodes_started, stats.nodes_skipped), (1, 1));
    assert_eq!(summary.failed, 0);
    assert!(summary.worst.is_successful());
    assert_eq!(prediction.skipped, 1);
    assert_well_nested(&events);
}

/// Deep single-child nesting starts and finishes every level once.
#[test]
fn deep_nesting_counts_every_level() {
    fn nested(depth: usize) -> Fragment {
        if depth == 0 { pass() } else { group([nested(depth - 1)]) }
    }

    let (tree, prediction) = plant(&nested(6));
    let (events, summary, stats) = run(&tree);

    assert_eq!(stats.nodes_started, 8);
    assert_eq!(summary.successful, 8);
    assert_eq!(stats.nodes_started, prediction.started);
    assert_well_nested(&events);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTY-BASED TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Generates random fragment trees and checks them against the
/// prediction model and the nesting discipline.
///
/// ## Strategy Design
///
/// `arb_fragment(depth)` generates trees recursively:
/// - **Leaf level** (`depth == 0`): one of the four leaf kinds with
///   equal probability.
/// - **Inner levels** (`depth > 0`): always a group with 0 to 3
///   children, so every tree reaches full depth. The skip flag is
///   biased toward running (one in five groups skips) so skipped
///   subtrees show up without dominating.
mod prop_tests {
    use proptest::prelude::*;

    use super::*;

    fn arb_leaf() -> BoxedStrategy<Fragment> {
        prop_oneof![
            Just(Fragment::Leaf(LeafKind::Pass)),
            Just(Fragment::Leaf(LeafKind::Fail)),
            Just(Fragment::Leaf(LeafKind::Abort)),
            Just(Fragment::Leaf(LeafKind::Skip)),
        ]
        .boxed()
    }

    fn arb_fragment(depth: u32) -> BoxedStrategy<Fragment> {
        if depth == 0 {
            arb_leaf()
        } else {
            (
                prop::bool::weighted(0.2),
                prop::collection::vec(arb_fragment(depth - 1), 0..=3usize),
            )
                .prop_map(|(skipped, children)| Fragment::Group { skipped, children })
                .boxed()
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// For every generated tree, the observed notifications match
        /// the prediction and the event stream is well nested.
        #[test]
        fn prop_run_matches_prediction(fragment in arb_fragment(3)) {
            let (tree, prediction) = plant(&fragment);
            let (events, summary, stats) = run(&tree);

            prop_assert_eq!(stats.nodes_started, prediction.started);
            prop_assert_eq!(stats.nodes_skipped, prediction.skipped);
            prop_assert_eq!(summary.successful, prediction.successful);
            prop_assert_eq!(summary.failed, prediction.failed);
            prop_assert_eq!(summary.aborted, prediction.aborted);
            prop_assert_eq!(summary.skipped, prediction.skipped);

            let expected_worst = if prediction.failed > 0 {
                "failed"
            } else if prediction.aborted > 0 {
                "aborted"
            } else {
                "successful"
            };
            prop_assert_eq!(worst_label(&summary.worst), expected_worst);

            assert_well_nested(&events);
        }
    }
}
