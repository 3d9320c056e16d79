use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::SchemaError;
use crate::tables::{
    COL_ASSISTS, COL_BONUS, COL_CBI, COL_CHANCE_OF_PLAYING, COL_CLEAN_SHEETS,
    COL_DEFENSIVE_CONTRIBUTION, COL_GOALS_SCORED, COL_MINUTES, COL_NEWS, COL_POINTS_PER_GAME,
    COL_POINTS_PER_MILLION, COL_RECOVERIES, COL_TACKLES, Fixture, Player, PlayerTable, Position,
    Team,
};

pub const COL_WEB_NAME: &str = "web_name";
pub const COL_TOTAL_POINTS: &str = "total_points";
pub const COL_NOW_COST: &str = "now_cost";
pub const COL_TEAM: &str = "team";
pub const COL_EASY_FIXTURES: &str = "Easy Fixtures";

pub const TOP_PPG_LIMIT: usize = 15;
pub const TOP_PPM_LIMIT: usize = 15;
pub const TOP_DEFENDERS_LIMIT: usize = 10;
pub const TOP_DEFCON_LIMIT: usize = 20;

/// Gameweeks `1..=EASY_MAX_EVENT` are considered for the easy-fixture count.
pub const EASY_MAX_EVENT: u32 = 5;
pub const EASY_MAX_DIFFICULTY: u8 = 2;

pub const COMPARISON_COLUMNS: [&str; 7] = [
    COL_MINUTES,
    COL_TOTAL_POINTS,
    COL_POINTS_PER_GAME,
    COL_CLEAN_SHEETS,
    COL_GOALS_SCORED,
    COL_ASSISTS,
    COL_BONUS,
];
const PPG_COLUMNS: [&str; 3] = [COL_POINTS_PER_GAME, COL_NOW_COST, COL_MINUTES];
const PPM_COLUMNS: [&str; 3] = [COL_TOTAL_POINTS, COL_NOW_COST, COL_POINTS_PER_MILLION];
const DEFENDER_COLUMNS: [&str; 6] = [
    COL_TOTAL_POINTS,
    COL_CLEAN_SHEETS,
    COL_GOALS_SCORED,
    COL_ASSISTS,
    COL_BONUS,
    COL_NOW_COST,
];
const FLAGGED_COLUMNS: [&str; 2] = [COL_NEWS, COL_CHANCE_OF_PLAYING];
const DEFCON_COLUMNS: [&str; 5] = [
    COL_DEFENSIVE_CONTRIBUTION,
    COL_CBI,
    COL_TACKLES,
    COL_RECOVERIES,
    COL_MINUTES,
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v:.2}"),
            Cell::Text(v) => f.write_str(v),
            Cell::Empty => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub index: String,
    pub cells: Vec<Cell>,
}

/// A query result: one index column (player or team name) plus named value columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub index_column: String,
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index_values(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.index.as_str()).collect()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.cells.get(col)
    }

    pub fn column_values(&self, column: &str) -> Vec<&Cell> {
        let Some(col) = self.columns.iter().position(|c| c == column) else {
            return Vec::new();
        };
        self.rows.iter().filter_map(|r| r.cells.get(col)).collect()
    }
}

/// Rows for the two selected names, in table order, with the comparison stats.
pub fn compare_players(
    players: &PlayerTable,
    first: &str,
    second: &str,
) -> Result<ResultTable, SchemaError> {
    players.require(&COMPARISON_COLUMNS)?;
    let rows = players
        .rows
        .iter()
        .filter(|p| p.web_name == first || p.web_name == second);
    Ok(player_table(rows, &COMPARISON_COLUMNS))
}

pub fn top_by_points_per_game(
    players: &PlayerTable,
    limit: usize,
) -> Result<ResultTable, SchemaError> {
    players.require(&PPG_COLUMNS)?;
    let top = top_n_by(players.rows.iter(), |p| p.points_per_game, limit);
    Ok(player_table(top, &PPG_COLUMNS))
}

/// Players without a points-per-million value (zero cost) are left out.
pub fn top_by_points_per_million(
    players: &PlayerTable,
    limit: usize,
) -> Result<ResultTable, SchemaError> {
    players.require(&PPM_COLUMNS)?;
    let priced = players.rows.iter().filter(|p| p.points_per_million.is_some());
    let top = top_n_by(
        priced,
        |p| p.points_per_million.unwrap_or(f64::NEG_INFINITY),
        limit,
    );
    Ok(player_table(top, &PPM_COLUMNS))
}

pub fn top_defenders_by_points(
    players: &PlayerTable,
    limit: usize,
) -> Result<ResultTable, SchemaError> {
    players.require(&DEFENDER_COLUMNS)?;
    let defenders = players
        .rows
        .iter()
        .filter(|p| p.position == Position::Defender);
    let top = top_n_by(defenders, |p| p.total_points as f64, limit);
    Ok(player_table(top, &DEFENDER_COLUMNS))
}

/// Players carrying an injury/news note. No matches is an empty table, not an error.
pub fn flagged_players(players: &PlayerTable) -> Result<ResultTable, SchemaError> {
    players.require(&FLAGGED_COLUMNS)?;
    let flagged = players.rows.iter().filter(|p| !p.news.is_empty());
    Ok(player_table(flagged, &FLAGGED_COLUMNS))
}

pub fn top_defensive_contributors(
    players: &PlayerTable,
    position: Position,
    limit: usize,
) -> Result<ResultTable, SchemaError> {
    players.require(&DEFCON_COLUMNS)?;
    let subset = players.rows.iter().filter(|p| p.position == position);
    let top = top_n_by(subset, |p| p.defensive_contribution as f64, limit);
    Ok(player_table(top, &DEFCON_COLUMNS))
}

/// Per team id: home fixtures with an easy home rating plus away fixtures with an easy
/// away rating, over the opening gameweeks. Teams with no easy fixture are absent.
/// Sorted by count descending, ties by ascending team id.
pub fn count_easy_fixtures(fixtures: &[Fixture]) -> Vec<(u32, usize)> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    let early = fixtures
        .iter()
        .filter(|f| f.event.is_some_and(|gw| gw <= EASY_MAX_EVENT));
    for fixture in early {
        if fixture.team_h_difficulty <= EASY_MAX_DIFFICULTY {
            *counts.entry(fixture.team_h).or_default() += 1;
        }
        if fixture.team_a_difficulty <= EASY_MAX_DIFFICULTY {
            *counts.entry(fixture.team_a).or_default() += 1;
        }
    }

    let mut ranked: Vec<(u32, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// `count_easy_fixtures` with team ids resolved to display names.
pub fn easy_fixture_counts(fixtures: &[Fixture], teams: &[Team]) -> ResultTable {
    let team_name_map: HashMap<u32, &str> =
        teams.iter().map(|t| (t.id, t.name.as_str())).collect();
    let rows = count_easy_fixtures(fixtures)
        .into_iter()
        .map(|(team_id, count)| ResultRow {
            index: team_name_map
                .get(&team_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("Team {team_id}")),
            cells: vec![Cell::Int(count as i64)],
        })
        .collect();

    ResultTable {
        index_column: COL_TEAM.to_string(),
        columns: vec![COL_EASY_FIXTURES.to_string()],
        rows,
    }
}

// `sort_by` is stable, so equal keys keep table order.
fn top_n_by<'a>(
    rows: impl Iterator<Item = &'a Player>,
    key: impl Fn(&Player) -> f64,
    limit: usize,
) -> Vec<&'a Player> {
    let sort_key = |p: &Player| {
        let v = key(p);
        if v.is_nan() { f64::NEG_INFINITY } else { v }
    };
    let mut rows: Vec<&Player> = rows.collect();
    rows.sort_by(|a, b| sort_key(*b).total_cmp(&sort_key(*a)));
    rows.truncate(limit);
    rows
}

fn player_table<'a>(rows: impl IntoIterator<Item = &'a Player>, columns: &[&str]) -> ResultTable {
    ResultTable {
        index_column: COL_WEB_NAME.to_string(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: rows
            .into_iter()
            .map(|p| ResultRow {
                index: p.web_name.clone(),
                cells: columns.iter().map(|c| player_cell(p, c)).collect(),
            })
            .collect(),
    }
}

fn player_cell(player: &Player, column: &str) -> Cell {
    match column {
        COL_MINUTES => Cell::Int(player.minutes),
        COL_TOTAL_POINTS => Cell::Int(player.total_points),
        COL_POINTS_PER_GAME => Cell::Float(player.points_per_game),
        COL_NOW_COST => Cell::Int(player.now_cost),
        COL_CLEAN_SHEETS => Cell::Int(player.clean_sheets),
        COL_GOALS_SCORED => Cell::Int(player.goals_scored),
        COL_ASSISTS => Cell::Int(player.assists),
        COL_BONUS => Cell::Int(player.bonus),
        COL_NEWS => Cell::Text(player.news.clone()),
        COL_CHANCE_OF_PLAYING => player
            .chance_of_playing_this_round
            .map(Cell::Int)
            .unwrap_or(Cell::Empty),
        COL_DEFENSIVE_CONTRIBUTION => Cell::Int(player.defensive_contribution),
        COL_CBI => Cell::Int(player.clearances_blocks_interceptions),
        COL_TACKLES => Cell::Int(player.tackles),
        COL_RECOVERIES => Cell::Int(player.recoveries),
        COL_POINTS_PER_MILLION => player
            .points_per_million
            .map(Cell::Float)
            .unwrap_or(Cell::Empty),
        _ => Cell::Empty,
    }
}
