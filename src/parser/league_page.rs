use scraper::Html;

use crate::fetch::{make_url, FetchMode, FetchRequest, AJAX_LEAGUE_ENDPOINT};
use crate::parser::{dom, CrawlContext, PageKind, StepOutput};

/// A league page lists its seasons in a drop-down; each entry carries the
/// form tokens for the AJAX endpoint. One POST request per season, country
/// carried forward unchanged.
pub fn parse(doc: &Html, ctx: &CrawlContext) -> StepOutput {
    let mut out = StepOutput::default();

    let season_sel = dom::sel("div.detail.season div.drop-down-parent ul li a");

    for season in doc.select(&season_sel) {
        let fields = vec![
            ("hash".to_string(), dom::attr_of(season, "data-hash")),
            ("zzz".to_string(), dom::attr_of(season, "data-zzz")),
            ("zzzz".to_string(), dom::attr_of(season, "data-zzzz")),
            ("cur".to_string(), dom::attr_of(season, "data-z")),
        ];
        out.requests.push(FetchRequest {
            url: make_url(AJAX_LEAGUE_ENDPOINT),
            mode: FetchMode::Form(fields),
            next: PageKind::SeasonDetail,
            ctx: ctx.clone(),
        });
    }

    out
}
