use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use fpl_stats::dashboard::{SectionKind, Selection, build_section, build_sections};
use fpl_stats::error::SchemaError;
use fpl_stats::export::export_sections;
use fpl_stats::metrics::add_points_per_million;
use fpl_stats::tables::{Player, PlayerTable, Position, Tables, build_tables};

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

#[test]
fn every_section_builds_from_sample() {
    let tables = sample_tables();
    let selection = Selection::default_for(&tables.players.player_names());
    assert_eq!(selection.first, "Caicedo");
    assert_eq!(selection.second, "Gabriel");

    let sections = build_sections(&tables, &selection);
    assert_eq!(sections.len(), SectionKind::ALL.len());
    assert!(sections.iter().all(|s| s.outcome.is_ok()));

    let cmp = sections[0].table().unwrap();
    assert_eq!(cmp.index_values(), ["Gabriel", "Caicedo"]);
}

#[test]
fn missing_column_only_fails_its_own_sections() {
    let mut tables = sample_tables();
    tables.players = tables.players.without_column("defensive_contribution");

    let sections = build_sections(&tables, &Selection::default());
    for section in &sections {
        match section.kind {
            SectionKind::DefenderContributions | SectionKind::MidfielderContributions => {
                assert_eq!(
                    section.outcome,
                    Err(SchemaError::MissingColumn {
                        table: "players",
                        column: "defensive_contribution"
                    })
                );
            }
            _ => assert!(section.outcome.is_ok(), "{} should survive", section.title()),
        }
    }
}

#[test]
fn flagged_section_empty_state_is_positive() {
    let tables = Tables {
        players: add_points_per_million(PlayerTable::from_rows(vec![Player::new(
            1,
            "Saka",
            Position::Midfielder,
            100,
            150,
        )])),
        teams: Vec::new(),
        fixtures: Vec::new(),
    };
    let section = build_section(SectionKind::Flagged, &tables, &Selection::default());
    assert!(section.table().unwrap().is_empty());
    assert_eq!(section.kind.empty_message(), "No players currently flagged!");
}

#[test]
fn single_name_selection_uses_it_twice() {
    let selection = Selection::default_for(&["Solo".to_string()]);
    assert_eq!(selection.first, "Solo");
    assert_eq!(selection.second, "Solo");
    assert_eq!(Selection::default_for(&[]), Selection::default());
}

#[test]
fn export_writes_workbook_and_skips_failures() {
    let mut tables = sample_tables();
    tables.players = tables.players.without_column("tackles");
    let sections = build_sections(&tables, &Selection::default_for(&tables.players.player_names()));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports").join("dashboard.xlsx");
    let report = export_sections(&path, &sections).expect("export should succeed");

    assert_eq!(report.sheets, 6);
    assert_eq!(
        report.skipped,
        [
            "Top 20 Defenders by Defensive Contributions",
            "Top 20 Midfielders by Defensive Contributions"
        ]
    );
    assert!(report.rows > 0);
    assert!(fs::metadata(&path).unwrap().len() > 0);
}
