use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use fpl_stats::error::SchemaError;
use fpl_stats::tables::{Position, build_tables};

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be json")
}

#[test]
fn builds_three_tables_in_api_order() {
    let tables = build_tables(
        &read_fixture("bootstrap_static.json"),
        &read_fixture("fixtures.json"),
    )
    .expect("fixtures should build");

    assert_eq!(tables.players.len(), 9);
    assert_eq!(tables.teams.len(), 4);
    assert_eq!(tables.fixtures.len(), 7);

    let names: Vec<&str> = tables.players.rows.iter().map(|p| p.web_name.as_str()).collect();
    assert_eq!(
        names,
        ["Saka", "Gabriel", "Raya", "Palmer", "Mee", "Robinson", "Wissa", "Trainee", "Caicedo"]
    );
    assert_eq!(tables.teams[2].name, "Chelsea");
}

#[test]
fn player_fields_are_typed() {
    let tables = build_tables(
        &read_fixture("bootstrap_static.json"),
        &read_fixture("fixtures.json"),
    )
    .unwrap();
    let palmer = &tables.players.rows[3];
    assert_eq!(palmer.position, Position::Midfielder);
    assert_eq!(palmer.now_cost, 105);
    assert_eq!(palmer.points_per_game, 7.2);
    assert_eq!(palmer.chance_of_playing_this_round, Some(75));
    assert!(palmer.news.starts_with("Knock"));

    let saka = &tables.players.rows[0];
    assert_eq!(saka.chance_of_playing_this_round, None);
    assert!(saka.news.is_empty());
    assert_eq!(tables.players.rows[2].position, Position::Goalkeeper);
    assert_eq!(tables.players.rows[6].position, Position::Forward);
}

#[test]
fn unscheduled_fixture_has_no_event() {
    let tables = build_tables(
        &read_fixture("bootstrap_static.json"),
        &read_fixture("fixtures.json"),
    )
    .unwrap();
    assert_eq!(tables.fixtures[0].event, Some(1));
    assert_eq!(tables.fixtures[6].event, None);
    assert_eq!(tables.fixtures[6].team_h_difficulty, 1);
}

#[test]
fn derived_column_is_absent_until_computed() {
    let tables = build_tables(
        &read_fixture("bootstrap_static.json"),
        &read_fixture("fixtures.json"),
    )
    .unwrap();
    assert!(tables.players.has_column("defensive_contribution"));
    assert!(!tables.players.has_column("points_per_million"));
}

#[test]
fn player_names_are_sorted_and_unique() {
    let raw = json!({
        "elements": [
            {"id": 1, "web_name": "Son", "element_type": 3, "now_cost": 90, "total_points": 10},
            {"id": 2, "web_name": "Alisson", "element_type": 1, "now_cost": 55, "total_points": 8},
            {"id": 3, "web_name": "Son", "element_type": 4, "now_cost": 60, "total_points": 4}
        ],
        "teams": []
    });
    let tables = build_tables(&raw, &json!([])).unwrap();
    assert_eq!(tables.players.player_names(), ["Alisson", "Son"]);
}

#[test]
fn missing_top_level_key_is_a_schema_error() {
    let err = build_tables(&json!({ "teams": [] }), &json!([])).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingKey {
            key: "elements".to_string()
        }
    );

    let err = build_tables(&json!({ "elements": [], "teams": [] }), &json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::NotAnArray { .. }));
}

#[test]
fn missing_required_field_names_the_field() {
    let raw = json!({
        "elements": [
            {"id": 1, "web_name": "Saka", "element_type": 3, "now_cost": 100, "total_points": 150},
            {"id": 2, "web_name": "Rice", "element_type": 3, "total_points": 120}
        ],
        "teams": []
    });
    let err = build_tables(&raw, &json!([])).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingField {
            table: "players",
            row: 1,
            field: "now_cost"
        }
    );
}

#[test]
fn fixture_without_difficulty_is_rejected() {
    let raw = json!({ "elements": [], "teams": [] });
    let fixtures = json!([{ "event": 1, "team_h": 1, "team_a": 2, "team_h_difficulty": 2 }]);
    let err = build_tables(&raw, &fixtures).unwrap_err();
    assert_eq!(err.to_string(), "fixtures row 0 is missing field `team_a_difficulty`");
}

#[test]
fn optional_column_missing_from_any_row_is_recorded() {
    let raw = json!({
        "elements": [
            {"id": 1, "web_name": "A", "element_type": 2, "now_cost": 50, "total_points": 10,
             "defensive_contribution": 12, "minutes": 90},
            {"id": 2, "web_name": "B", "element_type": 2, "now_cost": 50, "total_points": 10,
             "minutes": 45}
        ],
        "teams": []
    });
    let tables = build_tables(&raw, &json!([])).unwrap();
    assert!(!tables.players.has_column("defensive_contribution"));
    assert!(tables.players.has_column("minutes"));
    assert!(!tables.players.has_column("tackles"));
}
