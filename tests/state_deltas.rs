use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use fpl_stats::dashboard::SectionKind;
use fpl_stats::export::ExportReport;
use fpl_stats::metrics::add_points_per_million;
use fpl_stats::state::{AppState, Delta, LoadState, apply_delta};
use fpl_stats::tables::{Tables, build_tables};

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be json")
}

fn sample_tables() -> Tables {
    let mut tables = build_tables(
        &read_fixture("bootstrap_static.json"),
        &read_fixture("fixtures.json"),
    )
    .unwrap();
    tables.players = add_points_per_million(tables.players);
    tables
}

fn loaded_state() -> AppState {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::DataLoaded {
            tables: sample_tables(),
            from_cache: false,
        },
    );
    state
}

#[test]
fn starts_in_loading_state() {
    let state = AppState::new();
    assert_eq!(state.load, LoadState::Loading);
    assert!(state.sections.is_empty());
}

#[test]
fn data_loaded_builds_every_section() {
    let state = loaded_state();
    assert_eq!(state.load, LoadState::Ready);
    assert!(state.loaded_at.is_some());
    assert_eq!(state.sections.len(), SectionKind::ALL.len());
    assert_eq!(state.player_names.len(), 9);
    assert_eq!(state.selection().first, "Caicedo");
    assert_eq!(state.selection().second, "Gabriel");
    assert!(state.logs.back().unwrap().contains("9 players"));
}

#[test]
fn changing_a_selector_reruns_the_comparison() {
    let mut state = loaded_state();
    state.cycle_first(-1);
    assert_eq!(state.selection().first, "Wissa");
    let cmp = state.sections[0].table().unwrap();
    assert_eq!(cmp.index_values(), ["Gabriel", "Wissa"]);

    state.cycle_second(1);
    assert_eq!(state.selection().second, "Mee");
}

#[test]
fn reload_keeps_the_current_selection() {
    let mut state = loaded_state();
    state.cycle_first(3);
    let picked = state.selection().first;
    apply_delta(
        &mut state,
        Delta::DataLoaded {
            tables: sample_tables(),
            from_cache: true,
        },
    );
    assert_eq!(state.selection().first, picked);
    assert!(state.logs.back().unwrap().ends_with("(session cache)"));
}

#[test]
fn load_failure_replaces_the_dashboard() {
    let mut state = loaded_state();
    apply_delta(&mut state, Delta::LoadFailed("http 503".to_string()));
    assert_eq!(state.load, LoadState::Failed("http 503".to_string()));
    assert!(state.sections.is_empty());
    assert!(state.tables.is_none());
    assert_eq!(state.logs.back().unwrap(), "[WARN] Load failed: http 503");
}

#[test]
fn section_navigation_is_clamped() {
    let mut state = loaded_state();
    state.select_prev();
    assert_eq!(state.selected, 0);
    for _ in 0..20 {
        state.select_next();
    }
    assert_eq!(state.selected, SectionKind::ALL.len() - 1);
    assert_eq!(
        state.selected_section().unwrap().kind,
        SectionKind::MidfielderContributions
    );
}

#[test]
fn scrolling_stops_at_last_row() {
    let mut state = loaded_state();
    state.selected = 4;
    state.scroll_down();
    state.scroll_down();
    state.scroll_down();
    assert_eq!(state.scroll, 1);
    state.scroll_up();
    state.scroll_up();
    assert_eq!(state.scroll, 0);
}

#[test]
fn export_result_is_logged() {
    let mut state = loaded_state();
    state.export_in_progress = true;
    apply_delta(
        &mut state,
        Delta::ExportFinished {
            path: PathBuf::from("out.xlsx"),
            result: Ok(ExportReport {
                sheets: 7,
                rows: 60,
                skipped: vec!["Top 10 Defenders by Total Points".to_string()],
            }),
        },
    );
    assert!(!state.export_in_progress);
    let logs: Vec<&String> = state.logs.iter().rev().take(2).collect();
    assert!(logs[1].contains("Exported 7 sheets (60 rows) to out.xlsx"));
    assert!(logs[0].contains("skipped failed section"));
}

#[test]
fn console_is_bounded() {
    let mut state = AppState::new();
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().unwrap(), "line 50");
}
