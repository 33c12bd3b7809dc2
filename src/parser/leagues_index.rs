use scraper::Html;

use crate::fetch::{resolve_url, FetchMode, FetchRequest};
use crate::parser::{dom, CrawlContext, PageKind, StepOutput};

/// Top of the crawl: one `div.pt2e` group per country, its `id` attribute
/// being the country name, with one anchor per league underneath. Emits no
/// records, only league-page link requests tagged with their country.
pub fn parse(doc: &Html, _ctx: &CrawlContext) -> StepOutput {
    let mut out = StepOutput::default();

    let group_sel = dom::sel("div.pt2e");
    let link_sel = dom::sel("div table tr td a");

    for group in doc.select(&group_sel) {
        let Some(country) = group.value().attr("id") else {
            continue;
        };
        for anchor in group.select(&link_sel) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            out.requests.push(FetchRequest {
                url: resolve_url(href),
                mode: FetchMode::Link,
                next: PageKind::LeaguePage,
                ctx: CrawlContext {
                    country: Some(country.to_string()),
                    league_hash: None,
                },
            });
        }
    }

    out
}
