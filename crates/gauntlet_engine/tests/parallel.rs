//! Integration tests for parallel execution and scheduler placement.
//!
//! Parallelism changes where nodes run, never what the run means: the
//! notification contract, outcome classification, and fatal unwinding
//! all hold under a worker pool exactly as they do inline. These tests
//! check both sides: that worker pools actually overlap independent
//! work, and that every guarantee survives the overlap.


use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gauntlet_engine::executor::{ExecutionConfig, TreeExecutor};
use gauntlet_engine::listener::{EventLog, SummaryListener};
use gauntlet_engine::scheduler::{Scheduler, UnitOfWork};
use gauntlet_engine::tree::NodeTree;
use gauntlet_node::error::{Cause, HookError};
use gauntlet_node::node::FunctionLeaf;
use test_utils::{
    ConcurrencyGauge, assert_notification_contract, event_lines, passing_leaf, plain_group,
    position_of,
};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// A leaf that holds the gauge for a moment, long enough for siblings
/// to overlap when the pool allows it.
fn gauged_leaf(gauge: Arc<ConcurrencyGauge>) -> FunctionLeaf<impl Fn(()) -> Result<(), HookError>> {
    FunctionLeaf::new(move |_context: ()| {
        let _running = gauge.enter();
        thread::sleep(Duration::from_millis(40));
        Ok(())
    })
}

fn parallel_config(pool_size: usize) -> ExecutionConfig {
    ExecutionConfig::new().with_parallel(true).with_pool_size(pool_size)
}

// ─────────────────────────────────────────────────────────────────────────────
// Worker Pool Behavior
// ─────────────────────────────────────────────────────────────────────────────

/// Independent leaves overlap on a worker pool.
#[test]
fn worker_pool_overlaps_independent_leaves() {
    let gauge = Arc::new(ConcurrencyGauge::new());
    let mut tree = NodeTree::new("suite", plain_group());
    for name in ["a", "b", "c", "d"] {
        tree.add_leaf(tree.root(), name, gauged_leaf(Arc::clone(&gauge))).unwrap();
    }

    let summary = SummaryListener::new();
    let stats =
        TreeExecutor::with_config(parallel_config(4)).execute(&tree, (), &summary).unwrap();

    assert!(gauge.peak() >= 2, "leaves never overlapped (peak {})", gauge.peak());
    assert_eq!(stats.nodes_started, 5);
    assert_eq!(summary.summary().successful, 5);
}

/// Disabling leaf parallelism pins leaves to the submitting thread even
/// when a pool is available.
#[test]
fn sequential_leaf_flag_pins_leaves_inline() {
    let gauge = Arc::new(ConcurrencyGauge::new());
    let mut tree = NodeTree::new("suite", plain_group());
    for name in ["a", "b", "c"] {
        tree.add_leaf(tree.root(), name, gauged_leaf(Arc::clone(&gauge))).unwrap();
    }

    let config = parallel_config(3).with_parallel_leaves(false);
    let log = EventLog::new();
    TreeExecutor::with_config(config).execute(&tree, (), &log).unwrap();

    assert_eq!(gauge.peak(), 1);
    // Inline placement preserves submission order.
    assert_eq!(
        event_lines(&log),
        [
            "started suite",
            "started suite/a",
            "finished suite/a: successful",
            "started suite/b",
            "finished suite/b: successful",
            "started suite/c",
            "finished suite/c: successful",
            "finished suite: successful",
        ]
    );
}

/// A pool with one worker completes nested containers; inner batches
/// do not deadlock against the outer ones.
#[test]
fn single_worker_pool_completes_nested_trees() {
    let mut tree = NodeTree::new("suite", plain_group());
    let mut parent = tree.root();
    for depth in 0..4 {
        parent = tree.add_container(parent, format!("level_{depth}"), plain_group()).unwrap();
        tree.add_leaf(parent, "probe", passing_leaf()).unwrap();
    }

    let summary = SummaryListener::new();
    let stats =
        TreeExecutor::with_config(parallel_config(1)).execute(&tree, (), &summary).unwrap();

    assert_eq!(stats.nodes_started, 9);
    let summary = summary.summary();
    assert_eq!(summary.successful, 9);
    assert!(summary.is_clean());
}

// ─────────────────────────────────────────────────────────────────────────────
// Guarantees Under Parallelism
// ─────────────────────────────────────────────────────────────────────────────

/// Pairing and enclosure hold when siblings run on worker threads.
#[test]
fn parallel_runs_keep_pairing_and_enclosure() {
    let mut tree = NodeTree::new("suite", plain_group());
    for group_name in ["left", "right"] {
        let group = tree.add_container(tree.root(), group_name, plain_group()).unwrap();
        for leaf_name in ["one", "two", "three"] {
            tree.add_leaf(group, leaf_name, passing_leaf()).unwrap();
        }
    }

    let log = EventLog::new();
    TreeExecutor::with_config(parallel_config(3)).execute(&tree, (), &log).unwrap();

    assert_notification_contract(&log.snapshot());

    let lines = event_lines(&log);
    for group_name in ["left", "right"] {
        let group_started = position_of(&lines, &format!("started suite/{group_name}"));
        let group_finished =
            position_of(&lines, &format!("finished suite/{group_name}: successful"));
        for leaf_name in ["one", "two", "three"] {
            let leaf_started =
                position_of(&lines, &format!("started suite/{group_name}/{leaf_name}"));
            let leaf_finished = position_of(
                &lines,
                &format!("finished suite/{group_name}/{leaf_name}: successful"),
            );
            assert!(group_started < leaf_started);
            assert!(leaf_finished < group_finished);
        }
    }
}

/// A fatal error halts a parallel run and surfaces the exact cause
/// object the hook raised.
#[test]
fn fatal_halts_parallel_run_with_identity() {
    let cause = Cause::message("worker heap exhausted");
    let raised = cause.clone();
    let mut tree = NodeTree::new("suite", plain_group());
    tree.add_leaf(
        tree.root(),
        "explodes",
        FunctionLeaf::new(move |_context: ()| Err(HookError::Fatal(raised.clone()))),
    )
    .unwrap();
    for name in ["a", "b", "c"] {
        tree.add_leaf(
            tree.root(),
            name,
            FunctionLeaf::new(|_context: ()| {
                thread::sleep(Duration::from_millis(10));
                Ok(())
            }),
        )
        .unwrap();
    }

    let log = EventLog::new();
    let fatal =
        TreeExecutor::with_config(parallel_config(2)).execute(&tree, (), &log).unwrap_err();

    assert_eq!(fatal.id().to_string(), "suite/explodes");
    assert!(fatal.cause().ptr_eq(&cause));
    // The root never finishes once the run has halted.
    let lines = event_lines(&log);
    assert!(!lines.iter().any(|line| line.starts_with("finished suite:")), "lines: {lines:#?}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Scheduler Pluggability
// ─────────────────────────────────────────────────────────────────────────────

/// Runs every batch in reverse submission order.
struct ReverseScheduler;

impl Scheduler for ReverseScheduler {
    fn schedule(&self, batch: Vec<UnitOfWork<'_>>) {
        for unit in batch.into_iter().rev() {
            unit.run();
        }
    }
}

/// A replacement scheduler decides placement and order for every child
/// batch.
#[test]
fn custom_scheduler_controls_placement() {
    let mut tree = NodeTree::new("suite", plain_group());
    for name in ["a", "b", "c"] {
        tree.add_leaf(tree.root(), name, passing_leaf()).unwrap();
    }

    let log = EventLog::new();
    TreeExecutor::new()
        .with_scheduler(Box::new(ReverseScheduler))
        .execute(&tree, (), &log)
        .unwrap();

    assert_eq!(
        event_lines(&log),
        [
            "started suite",
            "started suite/c",
            "finished suite/c: successful",
            "started suite/b",
            "finished suite/b: successful",
            "started suite/a",
            "finished suite/a: successful",
            "finished suite: successful",
        ]
    );
}

/// Parallelism leaves sequential semantics: the same tree yields the
/// same summary either way.
#[test]
fn parallel_and_sequential_agree_on_outcomes() {
    fn build() -> NodeTree<()> {
        let mut tree = NodeTree::new("suite", plain_group());
        let group = tree.add_container(tree.root(), "group", plain_group()).unwrap();
        tree.add_leaf(group, "ok", passing_leaf()).unwrap();
        tree.add_leaf(
            group,
            "bad",
            FunctionLeaf::new(|_context: ()| Err(HookError::failure("broken"))),
        )
        .unwrap();
        tree.add_leaf(
            tree.root(),
            "shy",
            FunctionLeaf::new(|_context: ()| Err(HookError::abort("unsupported"))),
        )
        .unwrap();
        tree
    }

    let sequential = SummaryListener::new();
    TreeExecutor::new().execute(&build(), (), &sequential).unwrap();

    let parallel = SummaryListener::new();
    TreeExecutor::with_config(parallel_config(2))
        .execute(&build(), (), &parallel)
        .unwrap();

    let sequential = sequential.summary();
    let parallel = parallel.summary();
    assert_eq!(sequential.successful, parallel.successful);
    assert_eq!(sequential.failed, parallel.failed);
    assert_eq!(sequential.aborted, parallel.aborted);
    assert_eq!(sequential.skipped, parallel.skipped);
    assert_eq!(sequential.worst.to_string(), parallel.worst.to_string());
}
