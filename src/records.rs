use serde::Serialize;

use crate::hash;

/// League for one particular season. `hash` is computed from
/// `(title, season)` and keys the `leagues` collection; matches point back
/// at it via `league_hash`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct League {
    pub title: String,
    pub nation: String,
    pub division: String,
    pub league_type: String,
    pub teams_count: String,
    pub season: String,
    pub all_matches_count: String,
    pub image_url: String,
    pub country: String,
    /// Match data for this league requires a premium account.
    pub blocked: bool,
    pub hash: String,
}

impl League {
    pub fn compute_hash(&mut self) {
        self.hash = hash::digest(&[&self.title, &self.season]);
    }
}

/// Single fixture. `hash` is computed from
/// `(league_hash, timestamp, home_team, away_team)` and keys the `matches`
/// collection; statistics point back at it via `match_hash`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Match {
    pub timestamp: String,
    pub home_team: String,
    pub away_team: String,
    pub stadium: String,
    pub home_result: String,
    pub away_result: String,
    pub league_hash: String,
    pub hash: String,
}

impl Match {
    pub fn compute_hash(&mut self) {
        self.hash = hash::digest(&[
            &self.league_hash,
            &self.timestamp,
            &self.home_team,
            &self.away_team,
        ]);
    }
}

/// One home/away value pair from the post-match statistics panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatPair {
    pub home: String,
    pub away: String,
}

impl StatPair {
    /// Normalizes a list of extracted values into a pair: first value is
    /// the home side, second the away side, missing entries stay empty.
    pub fn from_values(values: &[String]) -> Self {
        StatPair {
            home: values.first().cloned().unwrap_or_default(),
            away: values.get(1).cloned().unwrap_or_default(),
        }
    }
}

/// Emitted only when the match page exposes a statistics panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostMatchStatistics {
    pub possession: StatPair,
    pub shots: StatPair,
    pub cards: StatPair,
    pub corners: StatPair,
    pub fouls: StatPair,
    pub offsides: StatPair,
    pub match_hash: String,
}

/// Every record kind the crawl can emit, streamed from parser tasks to the
/// persistence loop.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    League(League),
    Match(Match),
    Statistics(PostMatchStatistics),
}
