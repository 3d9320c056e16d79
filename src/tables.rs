use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::SchemaError;

pub const PLAYERS: &str = "players";
pub const TEAMS: &str = "teams";
pub const FIXTURES: &str = "fixtures";

pub const COL_MINUTES: &str = "minutes";
pub const COL_POINTS_PER_GAME: &str = "points_per_game";
pub const COL_CLEAN_SHEETS: &str = "clean_sheets";
pub const COL_GOALS_SCORED: &str = "goals_scored";
pub const COL_ASSISTS: &str = "assists";
pub const COL_BONUS: &str = "bonus";
pub const COL_NEWS: &str = "news";
pub const COL_CHANCE_OF_PLAYING: &str = "chance_of_playing_this_round";
pub const COL_DEFENSIVE_CONTRIBUTION: &str = "defensive_contribution";
pub const COL_CBI: &str = "clearances_blocks_interceptions";
pub const COL_TACKLES: &str = "tackles";
pub const COL_RECOVERIES: &str = "recoveries";
pub const COL_POINTS_PER_MILLION: &str = "points_per_million";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    Other(i64),
}

impl Position {
    pub fn from_element_type(value: i64) -> Self {
        match value {
            1 => Position::Goalkeeper,
            2 => Position::Defender,
            3 => Position::Midfielder,
            4 => Position::Forward,
            other => Position::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: u32,
    pub web_name: String,
    pub position: Position,
    /// Tenths of a million.
    pub now_cost: i64,
    pub total_points: i64,
    pub minutes: i64,
    pub points_per_game: f64,
    pub clean_sheets: i64,
    pub goals_scored: i64,
    pub assists: i64,
    pub bonus: i64,
    pub news: String,
    pub chance_of_playing_this_round: Option<i64>,
    pub defensive_contribution: i64,
    pub clearances_blocks_interceptions: i64,
    pub tackles: i64,
    pub recoveries: i64,
    /// Filled by `metrics::add_points_per_million`; `None` for zero-cost players.
    pub points_per_million: Option<f64>,
}

impl Player {
    /// A bare row with every stat zeroed; handy for building tables by hand.
    pub fn new(id: u32, web_name: &str, position: Position, now_cost: i64, total_points: i64) -> Self {
        Self {
            id,
            web_name: web_name.to_string(),
            position,
            now_cost,
            total_points,
            minutes: 0,
            points_per_game: 0.0,
            clean_sheets: 0,
            goals_scored: 0,
            assists: 0,
            bonus: 0,
            news: String::new(),
            chance_of_playing_this_round: None,
            defensive_contribution: 0,
            clearances_blocks_interceptions: 0,
            tackles: 0,
            recoveries: 0,
            points_per_million: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// `None` while the fixture has not been assigned a gameweek.
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_difficulty: u8,
    pub team_a_difficulty: u8,
}

/// Player rows plus the set of columns the upstream payload did not carry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTable {
    pub rows: Vec<Player>,
    missing: BTreeSet<&'static str>,
}

impl PlayerTable {
    /// Every stat column present; the derived column still has to be added.
    pub fn from_rows(rows: Vec<Player>) -> Self {
        Self {
            rows,
            missing: BTreeSet::from([COL_POINTS_PER_MILLION]),
        }
    }

    pub fn without_column(mut self, column: &'static str) -> Self {
        self.missing.insert(column);
        self
    }

    pub(crate) fn mark_present(&mut self, column: &'static str) {
        self.missing.remove(column);
    }

    pub fn has_column(&self, column: &str) -> bool {
        !self.missing.contains(column)
    }

    pub fn require(&self, columns: &[&'static str]) -> Result<(), SchemaError> {
        match columns.iter().find(|col| !self.has_column(col)) {
            Some(column) => Err(SchemaError::MissingColumn {
                table: PLAYERS,
                column: *column,
            }),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted, de-duplicated display names for the comparison selectors.
    pub fn player_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.rows.iter().map(|p| p.web_name.as_str()).collect();
        names.into_iter().map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tables {
    pub players: PlayerTable,
    pub teams: Vec<Team>,
    pub fixtures: Vec<Fixture>,
}

/// Turn the raw bootstrap and fixtures payloads into typed tables, in API order.
pub fn build_tables(raw_bootstrap: &Value, raw_fixtures: &Value) -> Result<Tables, SchemaError> {
    let elements = array_at(raw_bootstrap, "elements")?;
    let teams = array_at(raw_bootstrap, "teams")?;
    let fixtures = raw_fixtures
        .as_array()
        .ok_or_else(|| SchemaError::NotAnArray {
            key: FIXTURES.to_string(),
        })?;

    Ok(Tables {
        players: build_players(elements)?,
        teams: teams
            .iter()
            .enumerate()
            .map(|(idx, row)| parse_team(idx, row))
            .collect::<Result<_, _>>()?,
        fixtures: fixtures
            .iter()
            .enumerate()
            .map(|(idx, row)| parse_fixture(idx, row))
            .collect::<Result<_, _>>()?,
    })
}

fn array_at<'a>(payload: &'a Value, key: &str) -> Result<&'a [Value], SchemaError> {
    let value = payload.get(key).ok_or_else(|| SchemaError::MissingKey {
        key: key.to_string(),
    })?;
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| SchemaError::NotAnArray {
            key: key.to_string(),
        })
}

fn build_players(rows: &[Value]) -> Result<PlayerTable, SchemaError> {
    let mut reader = ColumnReader::default();
    let mut players = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let field = |name: &'static str| required(row, PLAYERS, idx, name);
        let id = field("id").and_then(|v| to_u32(v).ok_or(missing(PLAYERS, idx, "id")))?;
        let web_name = field("web_name")?
            .as_str()
            .ok_or(missing(PLAYERS, idx, "web_name"))?
            .to_string();
        let element_type = field("element_type")
            .and_then(|v| as_int(v).ok_or(missing(PLAYERS, idx, "element_type")))?;
        let now_cost =
            field("now_cost").and_then(|v| as_int(v).ok_or(missing(PLAYERS, idx, "now_cost")))?;
        let total_points = field("total_points")
            .and_then(|v| as_int(v).ok_or(missing(PLAYERS, idx, "total_points")))?;

        players.push(Player {
            id,
            web_name,
            position: Position::from_element_type(element_type),
            now_cost,
            total_points,
            minutes: reader.int(row, idx, COL_MINUTES)?,
            points_per_game: reader.float(row, idx, COL_POINTS_PER_GAME)?,
            clean_sheets: reader.int(row, idx, COL_CLEAN_SHEETS)?,
            goals_scored: reader.int(row, idx, COL_GOALS_SCORED)?,
            assists: reader.int(row, idx, COL_ASSISTS)?,
            bonus: reader.int(row, idx, COL_BONUS)?,
            news: reader.text(row, idx, COL_NEWS)?,
            chance_of_playing_this_round: reader.nullable_int(row, idx, COL_CHANCE_OF_PLAYING)?,
            defensive_contribution: reader.int(row, idx, COL_DEFENSIVE_CONTRIBUTION)?,
            clearances_blocks_interceptions: reader.int(row, idx, COL_CBI)?,
            tackles: reader.int(row, idx, COL_TACKLES)?,
            recoveries: reader.int(row, idx, COL_RECOVERIES)?,
            points_per_million: None,
        });
    }

    let mut table = PlayerTable::from_rows(players);
    for column in reader.missing {
        table = table.without_column(column);
    }
    Ok(table)
}

/// Reads optional stat columns, remembering which ones some row lacked.
#[derive(Default)]
struct ColumnReader {
    missing: BTreeSet<&'static str>,
}

impl ColumnReader {
    fn lookup<'a>(&mut self, row: &'a Value, column: &'static str) -> Option<&'a Value> {
        match row.get(column) {
            Some(Value::Null) => None,
            Some(value) => Some(value),
            None => {
                self.missing.insert(column);
                None
            }
        }
    }

    fn nullable_int(
        &mut self,
        row: &Value,
        idx: usize,
        column: &'static str,
    ) -> Result<Option<i64>, SchemaError> {
        match self.lookup(row, column) {
            Some(value) => as_int(value).map(Some).ok_or(missing(PLAYERS, idx, column)),
            None => Ok(None),
        }
    }

    fn int(&mut self, row: &Value, idx: usize, column: &'static str) -> Result<i64, SchemaError> {
        Ok(self.nullable_int(row, idx, column)?.unwrap_or(0))
    }

    fn float(&mut self, row: &Value, idx: usize, column: &'static str) -> Result<f64, SchemaError> {
        match self.lookup(row, column) {
            Some(value) => as_float(value).ok_or(missing(PLAYERS, idx, column)),
            None => Ok(0.0),
        }
    }

    fn text(&mut self, row: &Value, idx: usize, column: &'static str) -> Result<String, SchemaError> {
        match self.lookup(row, column) {
            Some(value) => value
                .as_str()
                .map(str::to_string)
                .ok_or(missing(PLAYERS, idx, column)),
            None => Ok(String::new()),
        }
    }
}

fn parse_team(idx: usize, row: &Value) -> Result<Team, SchemaError> {
    let id = required(row, TEAMS, idx, "id").and_then(|v| to_u32(v).ok_or(missing(TEAMS, idx, "id")))?;
    let name = required(row, TEAMS, idx, "name")?
        .as_str()
        .ok_or(missing(TEAMS, idx, "name"))?
        .to_string();
    Ok(Team { id, name })
}

fn parse_fixture(idx: usize, row: &Value) -> Result<Fixture, SchemaError> {
    let event = match row.get("event") {
        None => return Err(missing(FIXTURES, idx, "event")),
        Some(Value::Null) => None,
        Some(value) => Some(to_u32(value).ok_or(missing(FIXTURES, idx, "event"))?),
    };
    let team = |field: &'static str| {
        required(row, FIXTURES, idx, field).and_then(|v| to_u32(v).ok_or(missing(FIXTURES, idx, field)))
    };
    let difficulty = |field: &'static str| {
        required(row, FIXTURES, idx, field).and_then(|v| {
            as_int(v)
                .and_then(|n| u8::try_from(n).ok())
                .ok_or(missing(FIXTURES, idx, field))
        })
    };

    Ok(Fixture {
        event,
        team_h: team("team_h")?,
        team_a: team("team_a")?,
        team_h_difficulty: difficulty("team_h_difficulty")?,
        team_a_difficulty: difficulty("team_a_difficulty")?,
    })
}

fn required<'a>(
    row: &'a Value,
    table: &'static str,
    idx: usize,
    field: &'static str,
) -> Result<&'a Value, SchemaError> {
    match row.get(field) {
        Some(Value::Null) | None => Err(missing(table, idx, field)),
        Some(value) => Ok(value),
    }
}

fn missing(table: &'static str, row: usize, field: &'static str) -> SchemaError {
    SchemaError::MissingField { table, row, field }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

// FPL ships several averages as strings ("5.2").
fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn to_u32(value: &Value) -> Option<u32> {
    as_int(value).and_then(|n| u32::try_from(n).ok())
}
