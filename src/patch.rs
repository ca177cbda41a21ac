use std::collections::HashMap;

use anyhow::Result;

use crate::roster::{RosterDocument, RosterPlayer, render_entry};

/// One scoped rewrite: the anchor that locates the record in the document plus
/// the full replacement entry. The anchor is always the pre-update team code
/// and name, so a team reassignment still finds the old line.
#[derive(Debug, Clone)]
pub struct RecordUpdate {
    pub team_code: String,
    pub name: String,
    pub player: RosterPlayer,
}

/// What happened to a batch of updates. Skips carry the `name (team)` label so
/// the run report can surface them for operator follow-up.
#[derive(Debug, Clone, Default)]
pub struct PatchOutcome {
    pub applied: usize,
    pub unchanged: usize,
    pub skipped: Vec<String>,
}

/// Apply every update to an in-memory copy of the document and return the new
/// document. Each update rewrites at most one entry, located by its unique
/// `teamCode`+`name` anchor; anchors that are absent or ambiguous are skipped
/// and counted, never applied to the wrong entry. Text outside the rewritten
/// spans is preserved byte-for-byte, and re-applying the same updates to the
/// output is a no-op.
pub fn apply_updates(
    doc: &RosterDocument,
    updates: &[RecordUpdate],
) -> Result<(RosterDocument, PatchOutcome)> {
    let mut anchors: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
    for (idx, entry) in doc.entries.iter().enumerate() {
        anchors
            .entry((entry.player.team_code.as_str(), entry.player.name.as_str()))
            .or_default()
            .push(idx);
    }

    let mut outcome = PatchOutcome::default();
    let mut replacements: HashMap<usize, String> = HashMap::new();

    for update in updates {
        let label = format!("{} ({})", update.name, update.team_code);
        let found = anchors.get(&(update.team_code.as_str(), update.name.as_str()));
        let idx = match found.map(Vec::as_slice) {
            Some([only]) => *only,
            // Missing anchor: the document drifted since the update was
            // computed. Ambiguous anchor: duplicate entries we refuse to pick
            // between. Both are skips, not errors.
            _ => {
                outcome.skipped.push(label);
                continue;
            }
        };
        if replacements.contains_key(&idx) {
            outcome.skipped.push(label);
            continue;
        }

        let rendered = render_entry(&update.player);
        let current = &doc.text[doc.entries[idx].start..doc.entries[idx].end];
        if rendered == current {
            outcome.unchanged += 1;
            continue;
        }
        replacements.insert(idx, rendered);
        outcome.applied += 1;
    }

    let new_doc = if replacements.is_empty() {
        doc.clone()
    } else {
        RosterDocument::parse(&splice(doc, &replacements))?
    };
    Ok((new_doc, outcome))
}

fn splice(doc: &RosterDocument, replacements: &HashMap<usize, String>) -> String {
    let mut out = String::with_capacity(doc.text.len());
    let mut cursor = 0;
    for (idx, entry) in doc.entries.iter().enumerate() {
        out.push_str(&doc.text[cursor..entry.start]);
        match replacements.get(&idx) {
            Some(rendered) => out.push_str(rendered),
            None => out.push_str(&doc.text[entry.start..entry.end]),
        }
        cursor = entry.end;
    }
    out.push_str(&doc.text[cursor..]);
    out
}
