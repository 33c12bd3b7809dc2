pub mod dom;
pub mod league_page;
pub mod leagues_index;
pub mod match_detail;
pub mod matches_list;
pub mod season_detail;

use scraper::Html;

use crate::fetch::FetchRequest;
use crate::records::Record;

/// States of the crawl chain. Each kind has exactly one parser; edges are
/// whatever requests that parser emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    LeaguesIndex,
    LeaguePage,
    SeasonDetail,
    MatchesList,
    MatchDetail,
}

/// Read-only context threaded along crawl edges: the country a league
/// belongs to (seed → season detail) and the league hash linking matches
/// back to their league (season detail → match detail).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlContext {
    pub country: Option<String>,
    pub league_hash: Option<String>,
}

/// Result of one transition: completed records plus follow-up requests.
#[derive(Debug, Default)]
pub struct StepOutput {
    pub records: Vec<Record>,
    pub requests: Vec<FetchRequest>,
}

/// Transition function of the crawl state machine. Pure and synchronous:
/// takes the fetched page body and the carried context, returns what to
/// persist and what to fetch next.
pub fn parse(kind: PageKind, html: &str, ctx: &CrawlContext) -> StepOutput {
    let doc = Html::parse_document(html);
    match kind {
        PageKind::LeaguesIndex => leagues_index::parse(&doc, ctx),
        PageKind::LeaguePage => league_page::parse(&doc, ctx),
        PageKind::SeasonDetail => season_detail::parse(&doc, ctx),
        PageKind::MatchesList => matches_list::parse(&doc, ctx),
        PageKind::MatchDetail => match_detail::parse(&doc, ctx),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchMode, WaitStrategy};
    use crate::hash;

    fn ctx(country: Option<&str>, league_hash: Option<&str>) -> CrawlContext {
        CrawlContext {
            country: country.map(str::to_string),
            league_hash: league_hash.map(str::to_string),
        }
    }

    const LEAGUES_INDEX: &str = r#"
        <div class="pt2e" id="england">
          <div><table>
            <tr><td><a href="/england/premier-league">Premier League</a></td></tr>
            <tr><td><a href="/england/championship">Championship</a></td></tr>
            <tr><td><a href="/england/league-one">League One</a></td></tr>
          </table></div>
        </div>
        <div class="pt2e" id="spain">
          <div><table>
            <tr><td><a href="/spain/la-liga">La Liga</a></td></tr>
            <tr><td><a href="/spain/segunda">Segunda</a></td></tr>
            <tr><td><a href="/spain/tercera">Tercera</a></td></tr>
          </table></div>
        </div>
    "#;

    #[test]
    fn leagues_index_fans_out_per_country() {
        let out = parse(PageKind::LeaguesIndex, LEAGUES_INDEX, &CrawlContext::default());

        assert!(out.records.is_empty());
        assert_eq!(out.requests.len(), 6);
        assert!(out.requests.iter().all(|r| r.mode == FetchMode::Link));
        assert!(out.requests.iter().all(|r| r.next == PageKind::LeaguePage));

        let countries: Vec<_> = out
            .requests
            .iter()
            .map(|r| r.ctx.country.as_deref().unwrap())
            .collect();
        assert_eq!(
            countries,
            ["england", "england", "england", "spain", "spain", "spain"]
        );
        assert!(out.requests[0].url.ends_with("/england/premier-league"));
        assert!(out.requests[3].url.ends_with("/spain/la-liga"));
    }

    const LEAGUE_PAGE: &str = r#"
        <div class="detail season">
          <div class="drop-down-parent w100">
            <ul>
              <li><a data-hash="h1" data-zzz="a1" data-zzzz="b1" data-z="c1">2020/2021</a></li>
              <li><a data-hash="h2" data-zzz="a2" data-zzzz="b2" data-z="c2">2019/2020</a></li>
            </ul>
          </div>
        </div>
    "#;

    #[test]
    fn league_page_posts_one_form_per_season() {
        let out = parse(PageKind::LeaguePage, LEAGUE_PAGE, &ctx(Some("england"), None));

        assert!(out.records.is_empty());
        assert_eq!(out.requests.len(), 2);

        let req = &out.requests[0];
        assert!(req.url.ends_with("/ajax_league.php"));
        assert_eq!(req.next, PageKind::SeasonDetail);
        assert_eq!(req.ctx.country.as_deref(), Some("england"));

        let FetchMode::Form(fields) = &req.mode else {
            panic!("expected form request");
        };
        assert_eq!(
            fields,
            &vec![
                ("hash".to_string(), "h1".to_string()),
                ("zzz".to_string(), "a1".to_string()),
                ("zzzz".to_string(), "b1".to_string()),
                ("cur".to_string(), "c1".to_string()),
            ]
        );
    }

    fn season_detail_page(nav_anchor: &str) -> String {
        format!(
            r#"
            <div id="teamSummary">
              <img src="/images/premier-league.png"/>
              <h1 class="teamName"> Premier League </h1>
              <ul class="secondary-nav cf">
                <li class="first"><a href="/overview">Overview</a></li>
                <li class="middle">{nav_anchor}</li>
              </ul>
            </div>
            <div class="league-details">
              <div class="detail"><div>Nation</div><div><a href="/england">England</a></div></div>
              <div class="detail"><div>Division</div><div>1</div></div>
              <div class="detail"><div>Type</div><div>Domestic League</div></div>
              <div class="detail"><div>Teams</div><div>20</div></div>
              <div class="detail season"><div>Season</div><div>2020/2021</div></div>
              <div class="detail season"><div>Matches</div><div>380</div></div>
            </div>
            "#
        )
    }

    #[test]
    fn season_detail_extracts_league_fields_and_hash() {
        let page = season_detail_page(r#"<a href="/england/premier-league/matches">Matches</a>"#);
        let out = parse(PageKind::SeasonDetail, &page, &ctx(Some("england"), None));

        assert_eq!(out.records.len(), 1);
        let Record::League(league) = &out.records[0] else {
            panic!("expected league record");
        };
        assert_eq!(league.title, "Premier League");
        assert_eq!(league.nation, "England");
        assert_eq!(league.division, "1");
        assert_eq!(league.league_type, "Domestic League");
        assert_eq!(league.teams_count, "20");
        assert_eq!(league.season, "2020/2021");
        assert_eq!(league.all_matches_count, "380");
        assert_eq!(league.image_url, "/images/premier-league.png");
        assert_eq!(league.country, "england");
        assert!(!league.blocked);
        assert_eq!(league.hash, hash::digest(&["Premier League", "2020/2021"]));
    }

    #[test]
    fn season_detail_sentinel_href_goes_through_form() {
        let page = season_detail_page(
            r##"<a href="#" data-hash="mh" data-zzz="mz" data-z="mc">Matches</a>"##,
        );
        let out = parse(PageKind::SeasonDetail, &page, &ctx(Some("england"), None));

        // One league, blocked unset, and exactly one form continuation.
        assert_eq!(out.records.len(), 1);
        let Record::League(league) = &out.records[0] else {
            panic!("expected league record");
        };
        assert!(!league.blocked);

        assert_eq!(out.requests.len(), 1);
        let req = &out.requests[0];
        assert!(req.url.ends_with("/ajax_league.php"));
        assert_eq!(req.next, PageKind::MatchesList);
        assert_eq!(req.ctx.league_hash.as_deref(), Some(league.hash.as_str()));

        let FetchMode::Form(fields) = &req.mode else {
            panic!("expected form request, not a link follow");
        };
        assert_eq!(
            fields,
            &vec![
                ("hash".to_string(), "mh".to_string()),
                ("zzz".to_string(), "mz".to_string()),
                ("cur".to_string(), "mc".to_string()),
            ]
        );
    }

    #[test]
    fn season_detail_direct_href_is_followed() {
        let page = season_detail_page(r#"<a href="/england/premier-league/matches">Matches</a>"#);
        let out = parse(PageKind::SeasonDetail, &page, &ctx(Some("england"), None));

        assert_eq!(out.requests.len(), 1);
        let req = &out.requests[0];
        assert_eq!(req.mode, FetchMode::Link);
        assert_eq!(req.next, PageKind::MatchesList);
        assert!(req.url.ends_with("/england/premier-league/matches"));
        assert!(req.ctx.league_hash.is_some());
    }

    #[test]
    fn season_detail_missing_href_means_paywalled() {
        let page = season_detail_page("<a>Matches</a>");
        let out = parse(PageKind::SeasonDetail, &page, &ctx(Some("england"), None));

        assert!(out.requests.is_empty());

        let blocked: Vec<_> = out
            .records
            .iter()
            .filter_map(|r| match r {
                Record::League(l) if l.blocked => Some(l),
                _ => None,
            })
            .collect();
        assert_eq!(blocked.len(), 1);

        // Re-emission carries the same identity, so the sink overwrites.
        let Record::League(first) = &out.records[0] else {
            panic!("expected league record");
        };
        assert_eq!(blocked[0].hash, first.hash);
    }

    #[test]
    fn season_detail_empty_page_still_emits_league() {
        let out = parse(PageKind::SeasonDetail, "<html></html>", &ctx(None, None));

        // All queries missed, nav link absent: one plain league plus the
        // blocked re-emission, nothing to follow.
        assert!(out.requests.is_empty());
        let Record::League(league) = &out.records[0] else {
            panic!("expected league record");
        };
        assert!(league.title.is_empty());
        assert!(league.season.is_empty());
        assert_eq!(league.hash, hash::digest(&["", ""]));
    }

    const MATCHES_LIST: &str = r#"
        <table class="matches-table w100">
          <tr>
            <td class="date">14 Aug</td>
            <td class="link"><a href="/england/arsenal-vs-chelsea-h2h">2 - 1</a></td>
          </tr>
          <tr>
            <td class="date">21 Aug</td>
            <td class="link"><a href="/england/liverpool-vs-everton-h2h">0 - 0</a></td>
          </tr>
        </table>
    "#;

    #[test]
    fn matches_list_requests_rendered_fetches() {
        let out = parse(PageKind::MatchesList, MATCHES_LIST, &ctx(None, Some("lh")));

        assert!(out.records.is_empty());
        assert_eq!(out.requests.len(), 2);
        for req in &out.requests {
            assert_eq!(req.next, PageKind::MatchDetail);
            assert_eq!(req.ctx.league_hash.as_deref(), Some("lh"));
            assert_eq!(
                req.mode,
                FetchMode::Rendered(WaitStrategy::UntilSelector("p[data-time]".to_string()))
            );
        }
        assert!(out.requests[0].url.ends_with("/england/arsenal-vs-chelsea-h2h"));
    }

    const MATCH_DETAIL: &str = r#"
        <p data-time="1610200800">Sat 9 January</p>
        <span itemprop="homeTeam"><span itemprop="name" content="Arsenal"></span></span>
        <span itemprop="awayTeam"><span itemprop="name" content="Chelsea"></span></span>
        <small><span itemprop="name">Emirates Stadium</span></small>
        <div class="h2h-final-score cf">
          <div class="widget-content"><h2>3 - 1</h2></div>
        </div>
    "#;

    const STATS_PANEL: &str = r#"
        <div class="w100 cf ac">
          <span class="possession">61%</span>
          <span class="possession">39%</span>
        </div>
        <div class="w100 m0Auto">
          <div><div>Shots</div><div class="bbox"><span>14</span></div><div class="bbox"><span>7</span></div></div>
          <div><div>Cards</div><div class="bbox"><span>2</span></div><div class="bbox"><span>3</span></div></div>
          <div><div>Corners</div><div class="bbox"><span>8</span></div><div class="bbox"><span>4</span></div></div>
          <div><div>Fouls</div><div class="bbox"><span>10</span></div><div class="bbox"><span>12</span></div></div>
          <div><div>Offsides</div><div class="bbox"><span>1</span></div><div class="bbox"><span>2</span></div></div>
        </div>
    "#;

    #[test]
    fn match_detail_without_stats_panel() {
        let out = parse(PageKind::MatchDetail, MATCH_DETAIL, &ctx(None, Some("lh")));

        assert_eq!(out.records.len(), 1);
        assert!(out.requests.is_empty());

        let Record::Match(m) = &out.records[0] else {
            panic!("expected match record");
        };
        assert_eq!(m.timestamp, "1610200800");
        assert_eq!(m.home_team, "Arsenal");
        assert_eq!(m.away_team, "Chelsea");
        assert_eq!(m.stadium, "Emirates Stadium");
        assert_eq!(m.home_result, "3");
        assert_eq!(m.away_result, "1");
        assert_eq!(m.league_hash, "lh");
        assert_eq!(
            m.hash,
            hash::digest(&["lh", "1610200800", "Arsenal", "Chelsea"])
        );
    }

    #[test]
    fn match_detail_with_stats_panel() {
        let page = format!("{MATCH_DETAIL}{STATS_PANEL}");
        let out = parse(PageKind::MatchDetail, &page, &ctx(None, Some("lh")));

        assert_eq!(out.records.len(), 2);
        let Record::Match(m) = &out.records[0] else {
            panic!("expected match record first");
        };
        let Record::Statistics(s) = &out.records[1] else {
            panic!("expected statistics record");
        };

        assert_eq!(s.match_hash, m.hash);
        assert_eq!((s.possession.home.as_str(), s.possession.away.as_str()), ("61%", "39%"));
        assert_eq!((s.shots.home.as_str(), s.shots.away.as_str()), ("14", "7"));
        assert_eq!((s.cards.home.as_str(), s.cards.away.as_str()), ("2", "3"));
        assert_eq!((s.corners.home.as_str(), s.corners.away.as_str()), ("8", "4"));
        assert_eq!((s.fouls.home.as_str(), s.fouls.away.as_str()), ("10", "12"));
        assert_eq!((s.offsides.home.as_str(), s.offsides.away.as_str()), ("1", "2"));
    }

    #[test]
    fn match_detail_tolerates_missing_fields() {
        let out = parse(
            PageKind::MatchDetail,
            "<p data-time='1610200800'></p>",
            &ctx(None, None),
        );

        assert_eq!(out.records.len(), 1);
        let Record::Match(m) = &out.records[0] else {
            panic!("expected match record");
        };
        assert_eq!(m.timestamp, "1610200800");
        assert!(m.home_team.is_empty());
        assert!(m.home_result.is_empty());
        assert_eq!(m.hash, hash::digest(&["", "1610200800", "", ""]));
    }
}
