mod db;
mod engine;
mod fetch;
mod hash;
mod parser;
mod records;

use std::time::Instant;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "footy_scraper", about = "footystats.org league and match scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full crawl pass from the leagues index
    Crawl {
        /// Max match pages to fetch (default: all discovered)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Only crawl leagues of this country (index group name)
        #[arg(short, long)]
        country: Option<String>,
        /// Capture rendered match pages after a fixed delay in seconds
        /// instead of waiting for the content marker
        #[arg(long, value_name = "SECS")]
        settle: Option<u64>,
    },
    /// Show stored record counts
    Stats,
    /// Leagues overview table
    Overview {
        /// Filter by country
        #[arg(short, long)]
        country: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Dump a collection as JSON lines
    Export {
        /// Collection to dump: leagues, matches or statistics
        collection: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Crawl { limit, country, settle } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let stats = engine::run(
                &conn,
                engine::CrawlOptions {
                    match_limit: limit,
                    country,
                    settle_delay: settle,
                },
            )
            .await?;
            println!(
                "Done: {} leagues, {} matches, {} statistics ({} failed fetches).",
                stats.leagues, stats.matches, stats.statistics, stats.failed_fetches
            );
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Leagues:    {}", s.leagues);
            println!("  blocked:  {}", s.blocked_leagues);
            println!("Matches:    {}", s.matches);
            println!("Statistics: {}", s.statistics);
            Ok(())
        }
        Commands::Overview { country, limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, country.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No leagues found. Run 'crawl' first.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<28} | {:<14} | {:<10} | {:<8} | {:>5} | {:>7} | {}",
                "#", "League", "Country", "Season", "Division", "Teams", "Matches", "Blocked"
            );
            println!("{}", "-".repeat(100));

            for (i, r) in rows.iter().enumerate() {
                println!(
                    "{:>3} | {:<28} | {:<14} | {:<10} | {:<8} | {:>5} | {:>7} | {}",
                    i + 1,
                    truncate(&r.title, 28),
                    truncate(&r.country, 14),
                    truncate(&r.season, 10),
                    truncate(&r.division, 8),
                    r.teams_count,
                    r.match_count,
                    if r.blocked { "yes" } else { "" }
                );
            }

            println!("\n{} leagues", rows.len());
            Ok(())
        }
        Commands::Export { collection } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            match collection.as_str() {
                "leagues" => {
                    for league in db::fetch_leagues(&conn)? {
                        println!("{}", serde_json::to_string(&league)?);
                    }
                }
                "matches" => {
                    for record in db::fetch_matches(&conn)? {
                        println!("{}", serde_json::to_string(&record)?);
                    }
                }
                "statistics" => {
                    for statistics in db::fetch_statistics(&conn)? {
                        println!("{}", serde_json::to_string(&statistics)?);
                    }
                }
                other => {
                    anyhow::bail!(
                        "Unknown collection '{}': expected leagues, matches or statistics",
                        other
                    );
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
