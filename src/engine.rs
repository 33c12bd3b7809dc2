use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::db;
use crate::fetch::{make_url, FetchMode, FetchRequest, Transport, WaitStrategy};
use crate::parser::{self, CrawlContext, PageKind};
use crate::records::Record;

const CONCURRENCY: usize = 10;

/// Counts reported after a crawl pass. Leagues are counted by distinct
/// hash: the paywalled branch re-emits a league under the same identity
/// and the store holds one row for it.
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub leagues: usize,
    pub matches: usize,
    pub statistics: usize,
    pub failed_fetches: usize,
}

impl CrawlStats {
    fn observe(&mut self, record: &Record, seen_leagues: &mut HashSet<String>) {
        match record {
            Record::League(league) => {
                if seen_leagues.insert(league.hash.clone()) {
                    self.leagues += 1;
                }
            }
            Record::Match(_) => self.matches += 1,
            Record::Statistics(_) => self.statistics += 1,
        }
    }
}

/// Options for one crawl pass.
#[derive(Debug, Default)]
pub struct CrawlOptions {
    /// Cap on match-detail fetches (rendered fetches are the expensive
    /// part of a pass).
    pub match_limit: Option<usize>,
    /// Only crawl leagues of this country.
    pub country: Option<String>,
    /// Capture rendered pages after a fixed delay of this many seconds
    /// instead of waiting for the content marker.
    pub settle_delay: Option<u64>,
}

enum CrawlEvent {
    Record(Record),
    BranchFailed,
}

struct Engine {
    transport: Transport,
    semaphore: Semaphore,
    match_budget: Option<AtomicI64>,
    country_filter: Option<String>,
    settle_delay: Option<u64>,
}

impl Engine {
    fn take_match_budget(&self) -> bool {
        match &self.match_budget {
            None => true,
            Some(budget) => budget.fetch_sub(1, Ordering::SeqCst) > 0,
        }
    }

    fn admits(&self, req: &FetchRequest) -> bool {
        if let Some(filter) = &self.country_filter {
            if req.next == PageKind::LeaguePage {
                let matches_filter = req
                    .ctx
                    .country
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(filter));
                if !matches_filter {
                    return false;
                }
            }
        }
        if req.next == PageKind::MatchDetail && !self.take_match_budget() {
            return false;
        }
        true
    }

    /// Applies the configured settle delay to rendered fetches, replacing
    /// the marker-wait the parsers request by default.
    fn prepare(&self, req: &mut FetchRequest) {
        if let Some(secs) = self.settle_delay {
            if let FetchMode::Rendered(wait) = &mut req.mode {
                *wait = WaitStrategy::FixedDelay(secs);
            }
        }
    }
}

/// Run a full crawl pass from the leagues index, streaming every record to
/// the store as it is emitted. Each follow-up request runs as its own task
/// gated by a semaphore; a failed fetch drops that branch of the DAG with
/// a warning and nothing else.
pub async fn run(conn: &Connection, options: CrawlOptions) -> Result<CrawlStats> {
    let engine = Arc::new(Engine {
        transport: Transport::new()?,
        semaphore: Semaphore::new(CONCURRENCY),
        match_budget: options.match_limit.map(|n| AtomicI64::new(n as i64)),
        country_filter: options.country,
        settle_delay: options.settle_delay,
    });

    let (tx, mut rx) = mpsc::channel::<CrawlEvent>(CONCURRENCY * 2);

    let seed = FetchRequest {
        url: make_url("/leagues/"),
        mode: FetchMode::Link,
        next: PageKind::LeaguesIndex,
        ctx: CrawlContext::default(),
    };
    spawn_step(Arc::clone(&engine), seed, tx);
    drop(engine);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} records ({per_sec})")?,
    );

    // Receive and persist each record immediately; the channel closes once
    // every crawl task has finished.
    let mut stats = CrawlStats::default();
    let mut seen_leagues = HashSet::new();
    while let Some(event) = rx.recv().await {
        match event {
            CrawlEvent::Record(record) => {
                match &record {
                    Record::League(league) => db::upsert_league(conn, league)?,
                    Record::Match(m) => db::upsert_match(conn, m)?,
                    Record::Statistics(s) => db::upsert_statistics(conn, s)?,
                }
                stats.observe(&record, &mut seen_leagues);
            }
            CrawlEvent::BranchFailed => {
                stats.failed_fetches += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Crawl finished: {} leagues, {} matches, {} statistics, {} failed fetches",
        stats.leagues, stats.matches, stats.statistics, stats.failed_fetches
    );

    Ok(stats)
}

/// Fetch one page, run its parser, stream the records out and spawn the
/// follow-up requests. Holds a semaphore permit for the fetch+parse only;
/// children acquire their own.
fn spawn_step(engine: Arc<Engine>, req: FetchRequest, tx: mpsc::Sender<CrawlEvent>) {
    tokio::spawn(async move {
        let permit = engine.semaphore.acquire().await.unwrap();

        let html = match engine.transport.fetch(&req).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Fetch failed for {}: {:#}", req.url, e);
                let _ = tx.send(CrawlEvent::BranchFailed).await;
                return;
            }
        };

        let out = parser::parse(req.next, &html, &req.ctx);
        drop(permit);

        for record in out.records {
            let _ = tx.send(CrawlEvent::Record(record)).await;
        }
        for mut child in out.requests {
            engine.prepare(&mut child);
            if engine.admits(&child) {
                spawn_step(Arc::clone(&engine), child, tx.clone());
            }
        }
    });
}
