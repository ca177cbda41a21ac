use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::resolve::Named;
use crate::roster::OptionType;
use crate::teams::TeamDirectory;

/// One player's contract detail from the contracts feed, with the team key
/// already mapped onto our canonical code.
#[derive(Debug, Clone)]
pub struct ContractRecord {
    pub name: String,
    pub team_code: String,
    pub age: Option<u32>,
    pub salary_by_year: BTreeMap<u16, f64>,
    pub contract_end_year: Option<u16>,
    pub option_type: Option<OptionType>,
    /// Remaining guaranteed money; carried for reporting, never merged.
    pub guaranteed: Option<f64>,
}

impl Named for ContractRecord {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// One player's current team from the roster feed.
#[derive(Debug, Clone)]
pub struct RosterAssignment {
    pub name: String,
    pub team_code: String,
}

impl Named for RosterAssignment {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Parsed feed plus the team keys we could not map; their records are dropped
/// rather than guessed at, and the caller reports them.
#[derive(Debug, Clone)]
pub struct ContractFeed {
    pub records: Vec<ContractRecord>,
    pub unknown_teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawContract {
    name: String,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    salary_by_year: BTreeMap<String, f64>,
    #[serde(default)]
    contract_end_year: Option<u16>,
    #[serde(default)]
    option_type: Option<String>,
    #[serde(default)]
    guaranteed: Option<f64>,
}

/// Contract feed shape: `{"BOS": [{name, salary_by_year, ...}], "BRK": [...]}`
/// keyed by the source's own team taxonomy. Records are flattened in feed
/// order so the fallback tier scans deterministically.
pub fn parse_contract_feed(raw: &str, directory: &TeamDirectory) -> Result<ContractFeed> {
    let by_team: BTreeMap<String, Vec<RawContract>> =
        serde_json::from_str(raw.trim()).context("invalid contract feed json")?;

    let mut records = Vec::new();
    let mut unknown_teams = Vec::new();
    for (source_code, players) in by_team {
        let Some(team_code) = directory.to_canonical(&source_code) else {
            unknown_teams.push(source_code);
            continue;
        };
        for player in players {
            records.push(build_record(player, team_code));
        }
    }

    Ok(ContractFeed {
        records,
        unknown_teams,
    })
}

fn build_record(raw: RawContract, team_code: &str) -> ContractRecord {
    let mut salary_by_year = BTreeMap::new();
    for (year_raw, amount) in raw.salary_by_year {
        if let Ok(year) = year_raw.parse::<u16>() {
            salary_by_year.insert(year, amount);
        }
    }
    // Feeds write the option as a bare string; anything unrecognised is
    // treated the same as an unspecified option.
    let option_type = raw.option_type.as_deref().and_then(OptionType::parse);

    ContractRecord {
        name: raw.name,
        team_code: team_code.to_string(),
        age: raw.age,
        salary_by_year,
        contract_end_year: raw.contract_end_year,
        option_type,
        guaranteed: raw.guaranteed,
    }
}

/// Parsed assignment feed plus dropped unknown-team entries.
#[derive(Debug, Clone)]
pub struct AssignmentFeed {
    pub assignments: Vec<RosterAssignment>,
    pub unknown_teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawAssignment {
    name: String,
    team: String,
}

/// Roster feed shape: `{"lower-cased name": {"name": "...", "team": "BKN"}}`.
/// Keys are the feed's own lookup convenience; only the values matter here.
pub fn parse_assignment_feed(raw: &str, directory: &TeamDirectory) -> Result<AssignmentFeed> {
    let by_name: BTreeMap<String, RawAssignment> =
        serde_json::from_str(raw.trim()).context("invalid roster feed json")?;

    let mut assignments = Vec::new();
    let mut unknown_teams = Vec::new();
    let mut seen_unknown = HashSet::new();
    for (_, raw) in by_name {
        let Some(team_code) = directory.to_canonical(&raw.team) else {
            if seen_unknown.insert(raw.team.clone()) {
                unknown_teams.push(raw.team);
            }
            continue;
        };
        assignments.push(RosterAssignment {
            name: raw.name,
            team_code: team_code.to_string(),
        });
    }

    Ok(AssignmentFeed {
        assignments,
        unknown_teams,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_feed_maps_source_team_taxonomy() {
        let raw = r#"{
            "BRK": [
                {"name": "Nicolas Claxton", "age": 26,
                 "salary_by_year": {"2025": 25.4, "2026": 27.6},
                 "contract_end_year": 2027, "option_type": "none"}
            ],
            "PHO": [
                {"name": "Devin Booker", "salary_by_year": {"2025": 49.2}}
            ],
            "ZZZ": [
                {"name": "Nobody", "salary_by_year": {}}
            ]
        }"#;
        let feed = parse_contract_feed(raw, &TeamDirectory::nba()).expect("feed should parse");
        assert_eq!(feed.records.len(), 2);
        assert_eq!(feed.unknown_teams, vec!["ZZZ".to_string()]);

        let claxton = feed
            .records
            .iter()
            .find(|r| r.name == "Nicolas Claxton")
            .unwrap();
        assert_eq!(claxton.team_code, "BKN");
        assert_eq!(claxton.age, Some(26));
        assert_eq!(claxton.salary_by_year.get(&2026), Some(&27.6));
        assert_eq!(claxton.contract_end_year, Some(2027));
        assert_eq!(claxton.option_type, Some(OptionType::None));

        let booker = feed
            .records
            .iter()
            .find(|r| r.name == "Devin Booker")
            .unwrap();
        assert_eq!(booker.team_code, "PHX");
        assert_eq!(booker.option_type, None);
    }

    #[test]
    fn assignment_feed_reads_values_not_keys() {
        let raw = r#"{
            "nic claxton": {"name": "Nicolas Claxton", "team": "BKN"},
            "jayson tatum": {"name": "Jayson Tatum", "team": "BOS"},
            "nobody": {"name": "Nobody", "team": "ABC"}
        }"#;
        let feed = parse_assignment_feed(raw, &TeamDirectory::nba()).expect("feed should parse");
        assert_eq!(feed.assignments.len(), 2);
        assert_eq!(feed.unknown_teams, vec!["ABC".to_string()]);
        assert!(
            feed.assignments
                .iter()
                .any(|a| a.name == "Nicolas Claxton" && a.team_code == "BKN")
        );
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse_contract_feed("[1, 2", &TeamDirectory::nba()).is_err());
        assert!(parse_assignment_feed("{", &TeamDirectory::nba()).is_err());
    }
}
