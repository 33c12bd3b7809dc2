use scraper::Html;

use crate::fetch::{
    make_url, resolve_url, FetchMode, FetchRequest, AJAX_LEAGUE_ENDPOINT, SENTINEL_HREF,
};
use crate::parser::{dom, CrawlContext, PageKind, StepOutput};
use crate::records::{League, Record};

const DETAIL_ROW: &str = "div.league-details div.detail";

/// Season page of a league. Extracts the full League record, assigns its
/// hash, then decides how the match list is reachable:
/// - matches nav href is the `#` sentinel: real list needs an AJAX form
///   POST built from the element's data attributes;
/// - nav link has no href at all: matches are paywalled, the league is
///   re-emitted with `blocked` set and the branch ends here;
/// - any other href: plain link-follow.
/// The league hash rides along on every continuation.
pub fn parse(doc: &Html, ctx: &CrawlContext) -> StepOutput {
    let mut out = StepOutput::default();

    let mut league = League {
        title: dom::first_text(doc, "div#teamSummary h1.teamName"),
        nation: dom::label_sibling_text(doc, DETAIL_ROW, "Nation"),
        division: dom::label_sibling_text(doc, DETAIL_ROW, "Division"),
        league_type: dom::label_sibling_text(doc, DETAIL_ROW, "Type"),
        teams_count: dom::label_sibling_text(doc, DETAIL_ROW, "Teams"),
        season: dom::label_sibling_text(doc, DETAIL_ROW, "Season"),
        all_matches_count: dom::label_sibling_text(doc, DETAIL_ROW, "Matches"),
        image_url: dom::first_attr(doc, "div#teamSummary img", "src"),
        country: ctx.country.clone().unwrap_or_default(),
        blocked: false,
        hash: String::new(),
    };
    league.compute_hash();
    out.records.push(Record::League(league.clone()));

    let next_ctx = CrawlContext {
        country: ctx.country.clone(),
        league_hash: Some(league.hash.clone()),
    };

    let nav_sel = dom::sel("div#teamSummary ul.secondary-nav li.middle a");
    let nav = doc.select(&nav_sel).next();
    let href = nav.and_then(|el| el.value().attr("href"));

    match (nav, href) {
        (Some(el), Some(SENTINEL_HREF)) => {
            let fields = vec![
                ("hash".to_string(), dom::attr_of(el, "data-hash")),
                ("zzz".to_string(), dom::attr_of(el, "data-zzz")),
                ("cur".to_string(), dom::attr_of(el, "data-z")),
            ];
            out.requests.push(FetchRequest {
                url: make_url(AJAX_LEAGUE_ENDPOINT),
                mode: FetchMode::Form(fields),
                next: PageKind::MatchesList,
                ctx: next_ctx,
            });
        }
        (Some(_), Some(href)) => {
            out.requests.push(FetchRequest {
                url: resolve_url(href),
                mode: FetchMode::Link,
                next: PageKind::MatchesList,
                ctx: next_ctx,
            });
        }
        _ => {
            // Premium-only match data: terminal branch.
            league.blocked = true;
            out.records.push(Record::League(league));
        }
    }

    out
}
