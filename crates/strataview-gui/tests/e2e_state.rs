/// End-to-end tests for `AppState` — the GUI application state machine.
///
/// These exercise the real business-logic paths of `AppState` without
/// spinning up an egui window, keeping them fast and deterministic. The
/// real scanner runs (via `Session`), so no mocking is needed.
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use strataview_core::model::FileKind;
use strataview_gui::state::{AppPhase, AppState};
use tempfile::TempDir;

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

fn make_temp_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("a.txt"), 100);
    write_bytes(&tmp.path().join("b.bin"), 200);
    let sub = tmp.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    write_bytes(&sub.join("c.rs"), 300);
    tmp
}

fn pump_until_done(state: &mut AppState) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while state.phase == AppPhase::Scanning {
        assert!(Instant::now() < deadline, "scan did not complete within 30 seconds");
        state.process_scan_messages();
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn start_scan_sets_scanning_phase() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    assert_eq!(state.phase, AppPhase::Scanning);
}

#[test]
fn scan_completes_and_tree_is_available() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);

    assert_eq!(state.phase, AppPhase::Results);
    assert!(state.session.tree().is_some(), "tree must be populated after completion");
}

#[test]
fn scan_tree_contains_expected_nodes_and_rolled_up_size() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);

    let tree = state.session.tree().expect("tree must exist");
    let guard = tree.read();
    // root + "sub" dir + 3 files = at least 5 nodes.
    assert!(guard.len() >= 5, "expected >= 5 nodes, got {}", guard.len());
    assert_eq!(guard.payload(guard.root()).file.size, 600);
}

#[test]
fn cancel_scan_leaves_scanning_phase() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    state.cancel_scan();
    assert_eq!(state.phase, AppPhase::Idle);
    assert!(state.scan_was_cancelled);
}

#[test]
fn start_scan_resets_previous_results() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();

    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);
    assert_eq!(state.phase, AppPhase::Results);
    assert!(state.session.tree().is_some());

    state.start_scan(tmp.path().to_path_buf());
    assert_eq!(state.phase, AppPhase::Scanning, "phase must reset to Scanning on second start");
    assert!(state.visible_rows.is_empty(), "rows must be cleared at scan start");
    assert!(!state.scan_was_cancelled);
}

// ── Tree-view expansion ──────────────────────────────────────────────────

#[test]
fn rows_populate_after_scan_and_directories_start_collapsed() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);

    assert!(!state.visible_rows.is_empty(), "visible_rows must be non-empty after scan");
    assert!(
        state.visible_rows.iter().all(|r| !r.is_expanded),
        "nothing should be expanded by default"
    );
}

#[test]
fn toggle_expand_adds_then_removes_child_rows() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);

    let tree = state.session.tree().unwrap();
    let dir_row = {
        let guard = tree.read();
        state
            .visible_rows
            .iter()
            .find(|r| guard.payload(r.node).file.kind == FileKind::Directory)
            .map(|r| r.node)
    };
    let Some(dir_node) = dir_row else {
        return; // degenerate tree layout — nothing to expand
    };

    let rows_before = state.visible_rows.len();
    state.toggle_expand(dir_node);
    let rows_after_expand = state.visible_rows.len();
    assert!(rows_after_expand > rows_before, "expanding a non-empty directory adds rows");

    state.toggle_expand(dir_node);
    assert_eq!(state.visible_rows.len(), rows_before, "collapsing removes the same rows again");
}

#[test]
fn reveal_node_in_tree_expands_every_ancestor() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);

    let tree = state.session.tree().unwrap();
    let leaf = {
        let guard = tree.read();
        guard
            .descendants_preorder(guard.root())
            .find(|&id| guard.payload(id).file.name == "c.rs")
    };
    let Some(leaf) = leaf else { return };

    state.reveal_node_in_tree(leaf);
    assert!(
        state.visible_rows.iter().any(|r| r.node == leaf),
        "revealed leaf must appear among visible rows"
    );
}

// ── Treemap navigation ────────────────────────────────────────────────────

#[test]
fn treemap_back_returns_to_previous_focus() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);

    let root = state.treemap_focus.expect("focus set on scan completion");
    let tree = state.session.tree().unwrap();
    let child = {
        let guard = tree.read();
        guard.children(root).next()
    };
    let Some(child) = child else { return };

    state.treemap_navigate_into(child);
    assert_eq!(state.treemap_focus, Some(child));

    state.treemap_go_back();
    assert_eq!(state.treemap_focus, Some(root));
}

#[test]
fn treemap_forward_restores_after_back() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);

    let root = state.treemap_focus.unwrap();
    let tree = state.session.tree().unwrap();
    let child = {
        let guard = tree.read();
        guard.children(root).next()
    };
    let Some(child) = child else { return };

    state.treemap_navigate_into(child);
    state.treemap_go_back();
    state.treemap_go_forward();

    assert_eq!(state.treemap_focus, Some(child));
}

#[test]
fn treemap_go_back_with_empty_history_is_a_noop() {
    let mut state = AppState::new();
    let original = state.treemap_focus;
    state.treemap_go_back();
    assert_eq!(state.treemap_focus, original);
}

#[test]
fn treemap_go_up_moves_focus_to_parent() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);

    let root = state.treemap_focus.unwrap();
    let tree = state.session.tree().unwrap();
    let child = {
        let guard = tree.read();
        guard.children(root).next()
    };
    let Some(child) = child else { return };

    state.treemap_navigate_into(child);
    state.treemap_go_up();
    assert_eq!(state.treemap_focus, Some(root));
}

// ── Search ────────────────────────────────────────────────────────────────

#[test]
fn run_search_highlights_matching_node() {
    let tmp = make_temp_tree();
    let mut state = AppState::new();
    state.start_scan(tmp.path().to_path_buf());
    pump_until_done(&mut state);

    state.search_query = "c.rs".to_string();
    state.run_search();

    let tree = state.session.tree().unwrap();
    let leaf = {
        let guard = tree.read();
        guard
            .descendants_preorder(guard.root())
            .find(|&id| guard.payload(id).file.name == "c.rs")
            .unwrap()
    };
    assert!(state.session.node_color(leaf).is_some());
}

// ── Construction ──────────────────────────────────────────────────────────

#[test]
fn new_state_is_idle_with_no_tree() {
    let state = AppState::new();
    assert_eq!(state.phase, AppPhase::Idle);
    assert!(state.session.tree().is_none());
    assert!(state.visible_rows.is_empty());
}
