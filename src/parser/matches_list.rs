use scraper::Html;

use crate::fetch::{resolve_url, FetchMode, FetchRequest, WaitStrategy, MATCH_READY_SELECTOR};
use crate::parser::{dom, CrawlContext, PageKind, StepOutput};

/// Match list of one league season. Every detail link becomes a rendered
/// fetch: fixture pages populate their data client-side, so the capture
/// waits until the timestamp marker element shows up.
pub fn parse(doc: &Html, ctx: &CrawlContext) -> StepOutput {
    let mut out = StepOutput::default();

    let link_sel = dom::sel("table.matches-table tr td.link a");

    for anchor in doc.select(&link_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        out.requests.push(FetchRequest {
            url: resolve_url(href),
            mode: FetchMode::Rendered(WaitStrategy::UntilSelector(
                MATCH_READY_SELECTOR.to_string(),
            )),
            next: PageKind::MatchDetail,
            ctx: ctx.clone(),
        });
    }

    out
}
