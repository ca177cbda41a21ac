use anyhow::Result;

use crate::feed::{ContractRecord, RosterAssignment};
use crate::merge::{default_current_season, merge_contract};
use crate::patch::{RecordUpdate, apply_updates};
use crate::resolve::{AliasTable, MatchTier, SourceIndex};
use crate::roster::RosterDocument;
use crate::teams::TeamDirectory;

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub current_season: u16,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            current_season: default_current_season(),
        }
    }
}

/// One roster reassignment the team path decided to apply.
#[derive(Debug, Clone)]
pub struct TeamChange {
    pub name: String,
    pub old_team: String,
    pub new_team: String,
    /// The source-side spelling that matched, for audit of fuzzy tiers.
    pub matched_name: String,
}

/// Outcome of one reconciliation run. Partial success is the steady state:
/// unmatched and skipped names are the operator's work queue, resolved by
/// growing the alias table and rerunning.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub total: usize,
    pub matched_indexed: usize,
    pub matched_fallback: usize,
    pub matched_alias: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub team_changes: Vec<TeamChange>,
    pub not_found: Vec<String>,
    pub skipped: Vec<String>,
}

impl SyncReport {
    pub fn matched(&self) -> usize {
        self.matched_indexed + self.matched_fallback + self.matched_alias
    }

    fn count_tier(&mut self, tier: MatchTier) {
        match tier {
            MatchTier::Exact | MatchTier::Normalized | MatchTier::ShortKey => {
                self.matched_indexed += 1
            }
            MatchTier::Fallback => self.matched_fallback += 1,
            MatchTier::Alias => self.matched_alias += 1,
        }
    }
}

/// Contract reconciliation: for every canonical entry, resolve a contract
/// record and merge its detail in. The document is only rewritten after all
/// updates for the run are computed, in one pass over an in-memory copy.
pub fn sync_contracts(
    doc: &RosterDocument,
    records: &[ContractRecord],
    aliases: &AliasTable,
    opts: SyncOptions,
) -> Result<(RosterDocument, SyncReport)> {
    let index = SourceIndex::build(records);
    let mut report = SyncReport::default();
    let mut updates = Vec::new();

    for player in doc.players() {
        report.total += 1;
        match index.resolve(&player.name, aliases) {
            Some((record, tier)) => {
                report.count_tier(tier);
                updates.push(RecordUpdate {
                    team_code: player.team_code.clone(),
                    name: player.name.clone(),
                    player: merge_contract(player, record, opts.current_season),
                });
            }
            None => {
                report
                    .not_found
                    .push(format!("{} ({})", player.name, player.team_code));
            }
        }
    }

    let (new_doc, outcome) = apply_updates(doc, &updates)?;
    report.updated = outcome.applied;
    report.unchanged = outcome.unchanged;
    report.skipped = outcome.skipped;
    report.not_found.sort();
    Ok((new_doc, report))
}

/// Roster reconciliation: resolve each canonical entry against the assignment
/// feed and move players whose team differs. Team code is the one field where
/// a mismatch is the update signal, and the only field this path touches.
pub fn sync_teams(
    doc: &RosterDocument,
    assignments: &[RosterAssignment],
    aliases: &AliasTable,
) -> Result<(RosterDocument, SyncReport)> {
    let index = SourceIndex::build(assignments);
    let mut report = SyncReport::default();
    let mut updates = Vec::new();

    for player in doc.players() {
        report.total += 1;
        match index.resolve(&player.name, aliases) {
            Some((assignment, tier)) => {
                report.count_tier(tier);
                if assignment.team_code != player.team_code {
                    let mut moved = player.clone();
                    moved.team_code = assignment.team_code.clone();
                    report.team_changes.push(TeamChange {
                        name: player.name.clone(),
                        old_team: player.team_code.clone(),
                        new_team: assignment.team_code.clone(),
                        matched_name: assignment.name.clone(),
                    });
                    updates.push(RecordUpdate {
                        team_code: player.team_code.clone(),
                        name: player.name.clone(),
                        player: moved,
                    });
                }
            }
            None => {
                report
                    .not_found
                    .push(format!("{} ({})", player.name, player.team_code));
            }
        }
    }

    let (new_doc, outcome) = apply_updates(doc, &updates)?;
    report.updated = outcome.applied;
    report.unchanged = outcome.unchanged;
    report.skipped = outcome.skipped;
    report.not_found.sort();
    Ok((new_doc, report))
}

/// Report-only validation of a document against the invariants the sync paths
/// rely on. Returns one finding per violation, empty when clean.
pub fn check_document(doc: &RosterDocument, directory: &TeamDirectory) -> Vec<String> {
    let mut findings = Vec::new();
    let mut seen = std::collections::HashMap::new();

    for player in doc.players() {
        let label = format!("{} ({})", player.name, player.team_code);
        if !directory.is_known(&player.team_code) {
            findings.push(format!("{label}: unknown team code"));
        }
        if player.sport != "NBA" {
            findings.push(format!("{label}: unexpected sport tag {:?}", player.sport));
        }
        if let Some(salaries) = &player.salary_by_year {
            if salaries.values().any(|amount| *amount <= 0.0) {
                findings.push(format!("{label}: non-positive salary entry"));
            }
            if player.contract_years as usize != salaries.len() {
                findings.push(format!(
                    "{label}: contractYears {} != {} salary seasons",
                    player.contract_years,
                    salaries.len()
                ));
            }
        }
        let count = seen
            .entry((player.team_code.clone(), player.name.clone()))
            .or_insert(0usize);
        *count += 1;
        if *count == 2 {
            findings.push(format!("{label}: duplicate anchor"));
        }
    }

    findings
}
