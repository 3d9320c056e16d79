use tracing::warn;

use crate::error::SchemaError;
use crate::rankings::{
    self, ResultTable, TOP_DEFCON_LIMIT, TOP_DEFENDERS_LIMIT, TOP_PPG_LIMIT, TOP_PPM_LIMIT,
};
use crate::tables::{Position, Tables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Comparison,
    TopPointsPerGame,
    TopPointsPerMillion,
    TopDefenders,
    Flagged,
    EasyFixtures,
    DefenderContributions,
    MidfielderContributions,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Comparison,
        SectionKind::TopPointsPerGame,
        SectionKind::TopPointsPerMillion,
        SectionKind::TopDefenders,
        SectionKind::Flagged,
        SectionKind::EasyFixtures,
        SectionKind::DefenderContributions,
        SectionKind::MidfielderContributions,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Comparison => "Player vs Player Comparison",
            SectionKind::TopPointsPerGame => "Top 15 Players by Points Per Game",
            SectionKind::TopPointsPerMillion => "Top 15 Players by Points Per Million",
            SectionKind::TopDefenders => "Top 10 Defenders by Total Points",
            SectionKind::Flagged => "Players with Injury/News Updates",
            SectionKind::EasyFixtures => "Teams with Most Easy Fixtures (GW1-5)",
            SectionKind::DefenderContributions => "Top 20 Defenders by Defensive Contributions",
            SectionKind::MidfielderContributions => {
                "Top 20 Midfielders by Defensive Contributions"
            }
        }
    }

    /// Shown instead of an empty table when a section has no rows.
    pub fn empty_message(self) -> &'static str {
        match self {
            SectionKind::Flagged => "No players currently flagged!",
            SectionKind::Comparison => "Select two players to compare",
            SectionKind::EasyFixtures => "No easy fixtures in the opening gameweeks",
            _ => "No players to rank",
        }
    }
}

/// The two names picked for the comparison section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub first: String,
    pub second: String,
}

impl Selection {
    /// First and second entries of the sorted name list.
    pub fn default_for(names: &[String]) -> Self {
        Self {
            first: names.first().cloned().unwrap_or_default(),
            second: names.get(1).or(names.first()).cloned().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub outcome: Result<ResultTable, SchemaError>,
}

impl Section {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn table(&self) -> Option<&ResultTable> {
        self.outcome.as_ref().ok()
    }
}

/// Run one query. A schema failure stays inside the returned section.
pub fn build_section(kind: SectionKind, tables: &Tables, selection: &Selection) -> Section {
    let players = &tables.players;
    let outcome = match kind {
        SectionKind::Comparison => {
            rankings::compare_players(players, &selection.first, &selection.second)
        }
        SectionKind::TopPointsPerGame => rankings::top_by_points_per_game(players, TOP_PPG_LIMIT),
        SectionKind::TopPointsPerMillion => {
            rankings::top_by_points_per_million(players, TOP_PPM_LIMIT)
        }
        SectionKind::TopDefenders => rankings::top_defenders_by_points(players, TOP_DEFENDERS_LIMIT),
        SectionKind::Flagged => rankings::flagged_players(players),
        SectionKind::EasyFixtures => Ok(rankings::easy_fixture_counts(
            &tables.fixtures,
            &tables.teams,
        )),
        SectionKind::DefenderContributions => {
            rankings::top_defensive_contributors(players, Position::Defender, TOP_DEFCON_LIMIT)
        }
        SectionKind::MidfielderContributions => {
            rankings::top_defensive_contributors(players, Position::Midfielder, TOP_DEFCON_LIMIT)
        }
    };
    if let Err(err) = &outcome {
        warn!(section = kind.title(), %err, "section failed");
    }
    Section { kind, outcome }
}

pub fn build_sections(tables: &Tables, selection: &Selection) -> Vec<Section> {
    SectionKind::ALL
        .into_iter()
        .map(|kind| build_section(kind, tables, selection))
        .collect()
}
