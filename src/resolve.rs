use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::name_key::{first_token, last_token, normalize, short_key};

/// Anything the resolver can match against. Both feed record shapes carry a
/// display name; that is all the tiers look at.
pub trait Named {
    fn display_name(&self) -> &str;
}

/// Which tier produced a match. Reported so the operator can audit what the
/// fuzzy tiers are doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Alias,
    Exact,
    Normalized,
    ShortKey,
    Fallback,
}

/// Operator-maintained respellings for names the automatic tiers cannot
/// bridge. Keys are matched against the lower-cased query name; values are the
/// spelling the source feed uses. Grown by hand from the not-found report of
/// prior runs.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// Respellings that have come up repeatedly across source feeds.
    pub fn builtin() -> Self {
        let entries = [
            ("nic claxton", "Nicolas Claxton"),
            ("cam thomas", "Cameron Thomas"),
            ("cam johnson", "Cameron Johnson"),
            ("kj martin", "Kenyon Martin Jr."),
            ("herb jones", "Herbert Jones"),
            ("lu dort", "Luguentz Dort"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
        Self { entries }
    }

    /// Builtin table with a JSON file of `{"query name": "source spelling"}`
    /// entries merged over it.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read alias file {}", path.display()))?;
        let extra: HashMap<String, String> =
            serde_json::from_str(&raw).context("parse alias file")?;
        let mut table = Self::builtin();
        for (from, to) in extra {
            table.entries.insert(from.to_lowercase(), to);
        }
        Ok(table)
    }

    pub fn lookup(&self, query: &str) -> Option<&str> {
        self.entries.get(&query.to_lowercase()).map(|s| s.as_str())
    }

    #[cfg(test)]
    pub fn with_entry(mut self, from: &str, to: &str) -> Self {
        self.entries.insert(from.to_lowercase(), to.to_string());
        self
    }
}

/// Lookup index over a source collection. Exact display names, primary
/// normalized keys, and `first last` shorthand keys all point at the first
/// record observed for that key; later collisions are dropped from the index
/// but stay reachable through the fallback scan, which walks the full
/// collection in insertion order.
pub struct SourceIndex<'a, T: Named> {
    records: &'a [T],
    by_exact: HashMap<&'a str, usize>,
    by_key: HashMap<String, usize>,
}

impl<'a, T: Named> SourceIndex<'a, T> {
    pub fn build(records: &'a [T]) -> Self {
        let mut by_exact = HashMap::new();
        let mut by_key = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            let name = record.display_name();
            if name.trim().is_empty() {
                continue;
            }
            by_exact.entry(name).or_insert(idx);
            by_key.entry(normalize(name)).or_insert(idx);
            if let Some(short) = short_key(name) {
                by_key.entry(short).or_insert(idx);
            }
        }
        Self {
            records,
            by_exact,
            by_key,
        }
    }

    /// Tiered resolution, first success wins. Returns the matched record and
    /// the tier that produced it, or `None` when every tier misses; the caller
    /// reports misses, never drops them.
    pub fn resolve(&self, query: &str, aliases: &AliasTable) -> Option<(&'a T, MatchTier)> {
        if let Some(respelled) = aliases.lookup(query) {
            if let Some(record) = self.lookup_indexed(respelled) {
                return Some((record, MatchTier::Alias));
            }
        }
        if let Some(&idx) = self.by_exact.get(query) {
            return Some((&self.records[idx], MatchTier::Exact));
        }
        if let Some(&idx) = self.by_key.get(&normalize(query)) {
            return Some((&self.records[idx], MatchTier::Normalized));
        }
        if let Some(short) = short_key(query) {
            if let Some(&idx) = self.by_key.get(&short) {
                return Some((&self.records[idx], MatchTier::ShortKey));
            }
        }
        self.fallback_scan(query)
            .map(|record| (record, MatchTier::Fallback))
    }

    fn lookup_indexed(&self, name: &str) -> Option<&'a T> {
        if let Some(&idx) = self.by_exact.get(name) {
            return Some(&self.records[idx]);
        }
        if let Some(&idx) = self.by_key.get(&normalize(name)) {
            return Some(&self.records[idx]);
        }
        if let Some(short) = short_key(name) {
            if let Some(&idx) = self.by_key.get(&short) {
                return Some(&self.records[idx]);
            }
        }
        None
    }

    /// O(n) last-tier scan. A candidate matches on an equal last token plus
    /// either a shared three-character first-name prefix or a short query
    /// first token ("PJ", "GG") that prefixes the candidate's first token.
    /// First qualifying candidate in collection order wins; no scoring.
    fn fallback_scan(&self, query: &str) -> Option<&'a T> {
        let query_last = last_token(query)?;
        let query_first = first_token(query)?;

        for record in self.records {
            let name = record.display_name();
            let Some(cand_last) = last_token(name) else {
                continue;
            };
            if cand_last != query_last {
                continue;
            }
            let Some(cand_first) = first_token(name) else {
                continue;
            };
            if prefix3(&cand_first) == prefix3(&query_first) {
                return Some(record);
            }
            if query_first.chars().count() <= 3 && cand_first.starts_with(query_first.as_str()) {
                return Some(record);
            }
        }
        None
    }
}

fn prefix3(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(3)
        .map(|(idx, _)| idx)
        .unwrap_or(token.len());
    &token[..end]
}
