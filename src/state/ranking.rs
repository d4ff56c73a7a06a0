//! Derives the ordered team-score ranking from the player collection.

use indexmap::IndexMap;

use crate::dto::event::GameType;
use crate::state::view::Player;

/// The two team ids a team-based game restricts players to.
pub const CANONICAL_TEAM_IDS: [u32; 2] = [0, 1];

/// Which team ids participate in the ranking.
///
/// The scope follows the configured game mode: free-for-all ranks every team
/// id observed in player data, while team-based play ranks exactly the two
/// canonical teams no matter what ids individual players carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingScope {
    /// Rank every assigned team id observed in player data.
    AllTeams,
    /// Rank exactly the canonical pair {0, 1}.
    CanonicalPair,
}

impl From<GameType> for RankingScope {
    fn from(mode: GameType) -> Self {
        if mode.is_team_based() {
            Self::CanonicalPair
        } else {
            Self::AllTeams
        }
    }
}

/// Compute team totals ordered by descending score.
///
/// Players without a team assignment are excluded. Missing scores count as
/// zero. Ties keep the order in which team ids were first encountered while
/// iterating players (a stable sort over the grouping order, not the id
/// values), so the result is deterministic for a given player sequence.
pub fn team_scores(players: &[Player], scope: RankingScope) -> IndexMap<u32, i64> {
    let mut totals: IndexMap<u32, i64> = IndexMap::new();

    for player in players {
        let Some(team_id) = player.team_id else {
            continue;
        };
        if scope == RankingScope::CanonicalPair && !CANONICAL_TEAM_IDS.contains(&team_id) {
            continue;
        }
        *totals.entry(team_id).or_insert(0) += i64::from(player.score);
    }

    // A canonical team with no players still appears in the ranking; trailing
    // insertion keeps the encounter-order tie rule intact for the teams that
    // do have players.
    if scope == RankingScope::CanonicalPair {
        for id in CANONICAL_TEAM_IDS {
            totals.entry(id).or_insert(0);
        }
    }

    totals.sort_by(|_, a, _, b| b.cmp(a));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32, team_id: Option<u32>, score: i32) -> Player {
        Player {
            id,
            name: format!("Player-{id}"),
            team_id,
            damage: 10,
            bullets_max: 40,
            score,
            health: 100,
            online: true,
        }
    }

    #[test]
    fn ranks_teams_by_descending_total() {
        let players = [
            player(1, Some(0), 5),
            player(2, Some(1), 9),
            player(3, Some(0), 2),
        ];
        let scores = team_scores(&players, RankingScope::AllTeams);
        assert_eq!(scores.iter().collect::<Vec<_>>(), vec![(&1, &9), (&0, &7)]);
    }

    #[test]
    fn unassigned_players_are_excluded() {
        let players = [player(1, None, 50), player(2, Some(3), 1)];
        let scores = team_scores(&players, RankingScope::AllTeams);
        assert_eq!(scores.iter().collect::<Vec<_>>(), vec![(&3, &1)]);
    }

    #[test]
    fn ties_keep_first_encounter_order() {
        let players = [
            player(1, Some(4), 3),
            player(2, Some(2), 3),
            player(3, Some(4), 0),
        ];
        let scores = team_scores(&players, RankingScope::AllTeams);
        // Team 4 was seen before team 2; equal totals must not reorder them.
        assert_eq!(scores.iter().collect::<Vec<_>>(), vec![(&4, &3), (&2, &3)]);
    }

    #[test]
    fn canonical_pair_ignores_other_team_ids() {
        let players = [
            player(1, Some(0), 4),
            player(2, Some(1), 6),
            player(3, Some(5), 99),
        ];
        let scores = team_scores(&players, RankingScope::CanonicalPair);
        assert_eq!(scores.iter().collect::<Vec<_>>(), vec![(&1, &6), (&0, &4)]);
    }

    #[test]
    fn canonical_pair_ties_keep_player_encounter_order() {
        let players = [player(1, Some(1), 3), player(2, Some(0), 3)];
        let scores = team_scores(&players, RankingScope::CanonicalPair);
        // Team 1 was seen first; equal totals must not fall back to id order.
        assert_eq!(scores.iter().collect::<Vec<_>>(), vec![(&1, &3), (&0, &3)]);
    }

    #[test]
    fn canonical_pair_lists_both_teams_even_when_unrepresented() {
        let players = [player(1, Some(1), 2)];
        let scores = team_scores(&players, RankingScope::CanonicalPair);
        assert_eq!(scores.iter().collect::<Vec<_>>(), vec![(&1, &2), (&0, &0)]);
    }

    #[test]
    fn ranking_is_idempotent() {
        let players = [
            player(1, Some(0), 5),
            player(2, Some(1), 9),
            player(3, Some(0), 2),
        ];
        let first = team_scores(&players, RankingScope::AllTeams);
        let second = team_scores(&players, RankingScope::AllTeams);
        assert_eq!(first, second);
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            second.keys().collect::<Vec<_>>()
        );
    }
}
