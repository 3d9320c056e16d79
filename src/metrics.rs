use crate::tables::{COL_POINTS_PER_MILLION, PlayerTable};

/// `total_points / (now_cost / 10)`. Zero or negative cost has no value.
pub fn points_per_million(total_points: i64, now_cost: i64) -> Option<f64> {
    if now_cost <= 0 {
        return None;
    }
    Some(total_points as f64 / (now_cost as f64 / 10.0))
}

/// Fill the derived `points_per_million` column. Must run after the table builder and
/// before any leaderboard that reads the column.
pub fn add_points_per_million(mut players: PlayerTable) -> PlayerTable {
    for player in &mut players.rows {
        player.points_per_million = points_per_million(player.total_points, player.now_cost);
    }
    players.mark_present(COL_POINTS_PER_MILLION);
    players
}

#[cfg(test)]
mod tests {
    use super::points_per_million;

    #[test]
    fn cost_is_in_tenths() {
        assert_eq!(points_per_million(100, 50), Some(20.0));
        assert_eq!(points_per_million(80, 40), Some(20.0));
        assert_eq!(points_per_million(45, 45), Some(10.0));
    }

    #[test]
    fn zero_cost_has_no_value() {
        assert_eq!(points_per_million(12, 0), None);
        assert_eq!(points_per_million(0, -5), None);
    }
}
