use regex::Regex;
use scraper::Html;

use crate::parser::{dom, CrawlContext, StepOutput};
use crate::records::{Match, PostMatchStatistics, Record, StatPair};

/// Rows of the statistics panel: label div followed by `bbox` siblings
/// holding one span per side.
const STAT_ROW: &str = "div.w100.m0Auto > div";

/// Panel that only exists when post-match statistics were published.
const STATS_PANEL: &str = "div.w100.cf.ac";

/// Rendered match page. Always emits one Match (hash assigned from the
/// carried league hash plus fixture identity); emits PostMatchStatistics
/// only when the statistics panel is present.
pub fn parse(doc: &Html, ctx: &CrawlContext) -> StepOutput {
    let mut out = StepOutput::default();

    let score = dom::first_text(doc, "div.h2h-final-score div.widget-content h2");
    let (home_result, away_result) = split_score(&score);

    let mut record = Match {
        timestamp: dom::first_attr(doc, "p[data-time]", "data-time"),
        home_team: dom::first_attr(
            doc,
            r#"span[itemprop="homeTeam"] span[itemprop="name"]"#,
            "content",
        ),
        away_team: dom::first_attr(
            doc,
            r#"span[itemprop="awayTeam"] span[itemprop="name"]"#,
            "content",
        ),
        stadium: dom::first_text(doc, r#"small span[itemprop="name"]"#),
        home_result,
        away_result,
        league_hash: ctx.league_hash.clone().unwrap_or_default(),
        hash: String::new(),
    };
    record.compute_hash();
    let match_hash = record.hash.clone();
    out.records.push(Record::Match(record));

    let panel_sel = dom::sel(STATS_PANEL);
    if doc.select(&panel_sel).next().is_some() {
        let statistics = PostMatchStatistics {
            possession: StatPair::from_values(&dom::texts(doc, "span.possession")),
            shots: stat_pair(doc, "Shots"),
            cards: stat_pair(doc, "Cards"),
            corners: stat_pair(doc, "Corners"),
            fouls: stat_pair(doc, "Fouls"),
            offsides: stat_pair(doc, "Offsides"),
            match_hash,
        };
        out.records.push(Record::Statistics(statistics));
    }

    out
}

fn stat_pair(doc: &Html, label: &str) -> StatPair {
    StatPair::from_values(&dom::label_adjacent_values(doc, STAT_ROW, label))
}

/// The final-score widget renders both results in one heading ("2 - 1").
fn split_score(score: &str) -> (String, String) {
    let re = Regex::new(r"(\d+)\s*-\s*(\d+)").unwrap();
    match re.captures(score) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => (String::new(), String::new()),
    }
}
