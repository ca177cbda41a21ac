use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use roster_sync::feed::{parse_assignment_feed, parse_contract_feed};
use roster_sync::resolve::AliasTable;
use roster_sync::roster::RosterDocument;
use roster_sync::sync::{SyncOptions, SyncReport, check_document, sync_contracts, sync_teams};
use roster_sync::teams::TeamDirectory;

struct Args {
    command: String,
    roster: PathBuf,
    feed: Option<PathBuf>,
    aliases: Option<PathBuf>,
    season: Option<u16>,
    dry_run: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = parse_args()?;
    let directory = TeamDirectory::nba();
    let aliases = match &args.aliases {
        Some(path) => AliasTable::load(path)?,
        None => AliasTable::builtin(),
    };

    let raw_doc = fs::read_to_string(&args.roster)
        .with_context(|| format!("read roster document {}", args.roster.display()))?;
    let doc = RosterDocument::parse(&raw_doc)?;

    match args.command.as_str() {
        "contracts" => {
            let feed_path = require_feed(&args)?;
            let raw_feed = fs::read_to_string(feed_path)
                .with_context(|| format!("read contract feed {}", feed_path.display()))?;
            let feed = parse_contract_feed(&raw_feed, &directory)?;
            report_unknown_teams(&feed.unknown_teams);

            let season = args
                .season
                .or_else(env_season)
                .unwrap_or_else(roster_sync::merge::default_current_season);
            let opts = SyncOptions {
                current_season: season,
            };
            println!(
                "Contract sync: {} feed records, season {season}",
                feed.records.len()
            );

            let (new_doc, report) = sync_contracts(&doc, &feed.records, &aliases, opts)?;
            print_report(&report);
            finish(&args, &doc, &new_doc)?;
        }
        "teams" => {
            let feed_path = require_feed(&args)?;
            let raw_feed = fs::read_to_string(feed_path)
                .with_context(|| format!("read roster feed {}", feed_path.display()))?;
            let feed = parse_assignment_feed(&raw_feed, &directory)?;
            report_unknown_teams(&feed.unknown_teams);

            println!("Team sync: {} feed records", feed.assignments.len());
            let (new_doc, report) = sync_teams(&doc, &feed.assignments, &aliases)?;
            for change in &report.team_changes {
                println!(
                    "  {}: {} -> {} [matched: {}]",
                    change.name, change.old_team, change.new_team, change.matched_name
                );
            }
            print_report(&report);
            finish(&args, &doc, &new_doc)?;
        }
        "check" => {
            let findings = check_document(&doc, &directory);
            println!(
                "Checked {} entries: {} findings",
                doc.entries.len(),
                findings.len()
            );
            for finding in &findings {
                println!("  {finding}");
            }
            if !findings.is_empty() {
                std::process::exit(1);
            }
        }
        other => bail!("unknown command {other:?}"),
    }

    Ok(())
}

fn print_report(report: &SyncReport) {
    println!(
        "Total: {}, Matched: {} (index {}, fallback {}, alias {}), Updated: {}, Unchanged: {}",
        report.total,
        report.matched(),
        report.matched_indexed,
        report.matched_fallback,
        report.matched_alias,
        report.updated,
        report.unchanged,
    );
    if !report.skipped.is_empty() {
        println!("\nSkipped ({}):", report.skipped.len());
        for name in &report.skipped {
            println!("  {name}");
        }
    }
    if !report.not_found.is_empty() {
        println!("\nNot found ({}):", report.not_found.len());
        for name in &report.not_found {
            println!("  {name}");
        }
    }
}

fn report_unknown_teams(unknown: &[String]) {
    for code in unknown {
        println!("[WARN] Dropping feed records for unknown team {code}");
    }
}

fn finish(args: &Args, old_doc: &RosterDocument, new_doc: &RosterDocument) -> Result<()> {
    if new_doc.text == old_doc.text {
        println!("\nNo changes to write");
        return Ok(());
    }
    if args.dry_run {
        println!("\nDry run: document not written");
        return Ok(());
    }
    write_atomic(&args.roster, &new_doc.text)?;
    println!("\nRoster document updated: {}", args.roster.display());
    Ok(())
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

fn env_season() -> Option<u16> {
    std::env::var("SYNC_SEASON")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
}

fn require_feed(args: &Args) -> Result<&PathBuf> {
    args.feed
        .as_ref()
        .context("missing --feed <path> for this command")
}

fn parse_args() -> Result<Args> {
    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = argv.first().cloned() else {
        bail!("usage: roster_sync <contracts|teams|check> --roster <path> [--feed <path>] [--aliases <path>] [--season <year>] [--dry-run]");
    };

    let mut roster = None;
    let mut feed = None;
    let mut aliases = None;
    let mut season = None;
    let mut dry_run = false;

    let mut idx = 1;
    while idx < argv.len() {
        let arg = &argv[idx];
        let mut take_value = |name: &str| -> Result<Option<String>> {
            if let Some(value) = arg.strip_prefix(&format!("{name}=")) {
                return Ok(Some(value.to_string()));
            }
            if arg == name {
                idx += 1;
                return match argv.get(idx) {
                    Some(value) => Ok(Some(value.clone())),
                    None => bail!("{name} requires a value"),
                };
            }
            Ok(None)
        };

        if let Some(value) = take_value("--roster")? {
            roster = Some(PathBuf::from(value));
        } else if let Some(value) = take_value("--feed")? {
            feed = Some(PathBuf::from(value));
        } else if let Some(value) = take_value("--aliases")? {
            aliases = Some(PathBuf::from(value));
        } else if let Some(value) = take_value("--season")? {
            season = Some(value.parse::<u16>().context("bad --season value")?);
        } else if arg == "--dry-run" {
            dry_run = true;
        } else {
            bail!("unknown argument {arg:?}");
        }
        idx += 1;
    }

    Ok(Args {
        command,
        roster: roster.context("missing --roster <path>")?,
        feed,
        aliases,
        season,
        dry_run,
    })
}
