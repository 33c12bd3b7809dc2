use anyhow::Result;
use rusqlite::Connection;

use crate::records::{League, Match, PostMatchStatistics, StatPair};

const DB_PATH: &str = "data/footy.sqlite";

pub fn connect() -> Result<Connection> {
    std::fs::create_dir_all("data")?;
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS leagues (
            hash              TEXT PRIMARY KEY,
            title             TEXT NOT NULL,
            nation            TEXT NOT NULL,
            division          TEXT NOT NULL,
            league_type       TEXT NOT NULL,
            teams_count       TEXT NOT NULL,
            season            TEXT NOT NULL,
            all_matches_count TEXT NOT NULL,
            image_url         TEXT NOT NULL,
            country           TEXT NOT NULL,
            blocked           BOOLEAN NOT NULL DEFAULT 0,
            crawled_at        TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_leagues_country ON leagues(country);

        -- league_hash / match_hash are manual references kept in sync by
        -- the hash assignment, not enforced constraints: upserts replace
        -- parent rows on re-crawls.
        CREATE TABLE IF NOT EXISTS matches (
            hash        TEXT PRIMARY KEY,
            timestamp   TEXT NOT NULL,
            home_team   TEXT NOT NULL,
            away_team   TEXT NOT NULL,
            stadium     TEXT NOT NULL,
            home_result TEXT NOT NULL,
            away_result TEXT NOT NULL,
            league_hash TEXT NOT NULL,
            crawled_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_matches_league ON matches(league_hash);

        CREATE TABLE IF NOT EXISTS statistics (
            match_hash      TEXT PRIMARY KEY,
            possession_home TEXT NOT NULL,
            possession_away TEXT NOT NULL,
            shots_home      TEXT NOT NULL,
            shots_away      TEXT NOT NULL,
            cards_home      TEXT NOT NULL,
            cards_away      TEXT NOT NULL,
            corners_home    TEXT NOT NULL,
            corners_away    TEXT NOT NULL,
            fouls_home      TEXT NOT NULL,
            fouls_away      TEXT NOT NULL,
            offsides_home   TEXT NOT NULL,
            offsides_away   TEXT NOT NULL,
            crawled_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

// ── Upserts (insert if absent, else overwrite; keyed by hash) ──

pub fn upsert_league(conn: &Connection, league: &League) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO leagues
         (hash, title, nation, division, league_type, teams_count, season,
          all_matches_count, image_url, country, blocked)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            league.hash,
            league.title,
            league.nation,
            league.division,
            league.league_type,
            league.teams_count,
            league.season,
            league.all_matches_count,
            league.image_url,
            league.country,
            league.blocked,
        ],
    )?;
    Ok(())
}

pub fn upsert_match(conn: &Connection, record: &Match) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO matches
         (hash, timestamp, home_team, away_team, stadium, home_result,
          away_result, league_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            record.hash,
            record.timestamp,
            record.home_team,
            record.away_team,
            record.stadium,
            record.home_result,
            record.away_result,
            record.league_hash,
        ],
    )?;
    Ok(())
}

pub fn upsert_statistics(conn: &Connection, statistics: &PostMatchStatistics) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO statistics
         (match_hash, possession_home, possession_away, shots_home, shots_away,
          cards_home, cards_away, corners_home, corners_away, fouls_home,
          fouls_away, offsides_home, offsides_away)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        rusqlite::params![
            statistics.match_hash,
            statistics.possession.home,
            statistics.possession.away,
            statistics.shots.home,
            statistics.shots.away,
            statistics.cards.home,
            statistics.cards.away,
            statistics.corners.home,
            statistics.corners.away,
            statistics.fouls.home,
            statistics.fouls.away,
            statistics.offsides.home,
            statistics.offsides.away,
        ],
    )?;
    Ok(())
}

// ── Reads for the CLI surfaces ──

pub fn fetch_leagues(conn: &Connection) -> Result<Vec<League>> {
    let mut stmt = conn.prepare(
        "SELECT hash, title, nation, division, league_type, teams_count,
                season, all_matches_count, image_url, country, blocked
         FROM leagues ORDER BY country, title, season",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(League {
                hash: row.get(0)?,
                title: row.get(1)?,
                nation: row.get(2)?,
                division: row.get(3)?,
                league_type: row.get(4)?,
                teams_count: row.get(5)?,
                season: row.get(6)?,
                all_matches_count: row.get(7)?,
                image_url: row.get(8)?,
                country: row.get(9)?,
                blocked: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_matches(conn: &Connection) -> Result<Vec<Match>> {
    let mut stmt = conn.prepare(
        "SELECT hash, timestamp, home_team, away_team, stadium, home_result,
                away_result, league_hash
         FROM matches ORDER BY league_hash, timestamp",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Match {
                hash: row.get(0)?,
                timestamp: row.get(1)?,
                home_team: row.get(2)?,
                away_team: row.get(3)?,
                stadium: row.get(4)?,
                home_result: row.get(5)?,
                away_result: row.get(6)?,
                league_hash: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_statistics(conn: &Connection) -> Result<Vec<PostMatchStatistics>> {
    let mut stmt = conn.prepare(
        "SELECT match_hash, possession_home, possession_away, shots_home,
                shots_away, cards_home, cards_away, corners_home, corners_away,
                fouls_home, fouls_away, offsides_home, offsides_away
         FROM statistics ORDER BY match_hash",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(PostMatchStatistics {
                match_hash: row.get(0)?,
                possession: StatPair {
                    home: row.get(1)?,
                    away: row.get(2)?,
                },
                shots: StatPair {
                    home: row.get(3)?,
                    away: row.get(4)?,
                },
                cards: StatPair {
                    home: row.get(5)?,
                    away: row.get(6)?,
                },
                corners: StatPair {
                    home: row.get(7)?,
                    away: row.get(8)?,
                },
                fouls: StatPair {
                    home: row.get(9)?,
                    away: row.get(10)?,
                },
                offsides: StatPair {
                    home: row.get(11)?,
                    away: row.get(12)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Overview ──

pub struct OverviewRow {
    pub title: String,
    pub country: String,
    pub season: String,
    pub division: String,
    pub teams_count: String,
    pub blocked: bool,
    pub match_count: i64,
}

pub fn fetch_overview(
    conn: &Connection,
    country: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let where_clause = match country {
        Some(_) => " WHERE l.country = ?1 COLLATE NOCASE",
        None => "",
    };
    let sql = format!(
        "SELECT l.title, l.country, l.season, l.division, l.teams_count, l.blocked,
                (SELECT COUNT(*) FROM matches m WHERE m.league_hash = l.hash)
         FROM leagues l{}
         ORDER BY l.country, l.title, l.season
         LIMIT {}",
        where_clause, limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let map_row = |row: &rusqlite::Row| -> rusqlite::Result<OverviewRow> {
        Ok(OverviewRow {
            title: row.get(0)?,
            country: row.get(1)?,
            season: row.get(2)?,
            division: row.get(3)?,
            teams_count: row.get(4)?,
            blocked: row.get(5)?,
            match_count: row.get(6)?,
        })
    };
    let rows = match country {
        Some(c) => stmt.query_map(rusqlite::params![c], map_row)?,
        None => stmt.query_map([], map_row)?,
    }
    .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub leagues: usize,
    pub blocked_leagues: usize,
    pub matches: usize,
    pub statistics: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let leagues: usize = conn.query_row("SELECT COUNT(*) FROM leagues", [], |r| r.get(0))?;
    let blocked_leagues: usize = conn.query_row(
        "SELECT COUNT(*) FROM leagues WHERE blocked = 1",
        [],
        |r| r.get(0),
    )?;
    let matches: usize = conn.query_row("SELECT COUNT(*) FROM matches", [], |r| r.get(0))?;
    let statistics: usize =
        conn.query_row("SELECT COUNT(*) FROM statistics", [], |r| r.get(0))?;
    Ok(Stats {
        leagues,
        blocked_leagues,
        matches,
        statistics,
    })
}
