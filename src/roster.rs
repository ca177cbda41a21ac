use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

/// Contract option attached to the final season of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    None,
    Player,
    Team,
    EarlyTermination,
}

impl OptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::None => "none",
            OptionType::Player => "player",
            OptionType::Team => "team",
            OptionType::EarlyTermination => "early_termination",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(OptionType::None),
            "player" => Some(OptionType::Player),
            "team" => Some(OptionType::Team),
            "early_termination" => Some(OptionType::EarlyTermination),
            _ => None,
        }
    }
}

/// One canonical player entry as persisted in the seed document.
///
/// Salary figures are in millions. `salary_by_year` is keyed by season start
/// year and, when present, should hold strictly positive values with
/// `contract_years` equal to its size; the merge step repairs violations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub team_code: String,
    pub name: String,
    pub position: String,
    pub depth_order: u32,
    pub age: u32,
    pub cap_hit: f64,
    pub contract_years: u32,
    pub status: String,
    pub sport: String,
    #[serde(default)]
    pub salary_by_year: Option<BTreeMap<u16, f64>>,
    #[serde(default)]
    pub contract_end_year: Option<u16>,
    #[serde(default)]
    pub option_type: Option<OptionType>,
}

/// One parsed entry plus the byte range it occupies in the document text.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub start: usize,
    pub end: usize,
    pub player: RosterPlayer,
}

/// The seed document: raw text plus every player entry found in it.
/// Everything outside the entry spans is opaque and preserved byte-for-byte.
#[derive(Debug, Clone)]
pub struct RosterDocument {
    pub text: String,
    pub entries: Vec<RosterEntry>,
}

impl RosterDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let entries = scan_entries(text)?;
        Ok(Self {
            text: text.to_string(),
            entries,
        })
    }

    pub fn players(&self) -> impl Iterator<Item = &RosterPlayer> {
        self.entries.iter().map(|e| &e.player)
    }
}

/// Render one entry in the document's fixed field order. Optional trailing
/// fields are emitted only when set, so an entry never gains fields it did
/// not already carry unless the merge put them there.
pub fn render_entry(player: &RosterPlayer) -> String {
    let mut out = String::with_capacity(160);
    out.push_str("{ ");
    out.push_str(&format!("teamCode: \"{}\", ", escape(&player.team_code)));
    out.push_str(&format!("name: \"{}\", ", escape(&player.name)));
    out.push_str(&format!("position: \"{}\", ", escape(&player.position)));
    out.push_str(&format!("depthOrder: {}, ", player.depth_order));
    out.push_str(&format!("age: {}, ", player.age));
    out.push_str(&format!("capHit: {}, ", fmt_millions(player.cap_hit)));
    out.push_str(&format!("contractYears: {}, ", player.contract_years));
    out.push_str(&format!("status: \"{}\", ", escape(&player.status)));
    out.push_str(&format!("sport: \"{}\"", escape(&player.sport)));
    if let Some(salaries) = &player.salary_by_year {
        out.push_str(", salaryByYear: ");
        out.push_str(&fmt_salary_map(salaries));
    }
    if let Some(end_year) = player.contract_end_year {
        out.push_str(&format!(", contractEndYear: {end_year}"));
    }
    if let Some(option) = player.option_type {
        out.push_str(&format!(", optionType: \"{}\"", option.as_str()));
    }
    out.push_str(" }");
    out
}

pub fn fmt_millions(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn fmt_salary_map(salaries: &BTreeMap<u16, f64>) -> String {
    let body = salaries
        .iter()
        .map(|(year, amount)| format!("\"{year}\": {}", fmt_millions(*amount)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}

// --- document scanning -----------------------------------------------------

fn scan_entries(text: &str) -> Result<Vec<RosterEntry>> {
    let bytes = text.as_bytes();
    let mut entries = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let Some(open_rel) = text[i..].find('{') else {
            break;
        };
        let open = i + open_rel;
        if !looks_like_entry(&text[open + 1..]) {
            i = open + 1;
            continue;
        }
        let end = match_brace(text, open)
            .with_context(|| format!("unterminated roster entry at byte {open}"))?;
        let inner = &text[open + 1..end - 1];
        let player = parse_entry_fields(inner)
            .with_context(|| format!("malformed roster entry at byte {open}"))?;
        entries.push(RosterEntry {
            start: open,
            end,
            player,
        });
        i = end;
    }

    Ok(entries)
}

fn looks_like_entry(after_brace: &str) -> bool {
    after_brace.trim_start().starts_with("teamCode")
}

/// Byte offset one past the brace closing the one at `open`. Tracks nesting
/// (the salary map) and skips brace characters inside quoted strings.
fn match_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (off, ch) in text[open..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + off + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone)]
enum FieldValue {
    Str(String),
    Num(f64),
    Map(BTreeMap<u16, f64>),
    Ident(String),
}

fn parse_entry_fields(inner: &str) -> Result<RosterPlayer> {
    let mut cursor = Cursor::new(inner);
    let mut fields: Vec<(String, FieldValue)> = Vec::new();

    loop {
        cursor.skip_ws();
        if cursor.done() {
            break;
        }
        let key = cursor.ident()?;
        cursor.expect(':')?;
        let value = cursor.value()?;
        fields.push((key, value));
        cursor.skip_ws();
        if !cursor.eat(',') {
            break;
        }
    }
    cursor.skip_ws();
    if !cursor.done() {
        bail!("trailing content after fields: {:?}", cursor.rest());
    }

    build_player(fields)
}

fn build_player(fields: Vec<(String, FieldValue)>) -> Result<RosterPlayer> {
    let mut player = RosterPlayer {
        team_code: String::new(),
        name: String::new(),
        position: String::new(),
        depth_order: 0,
        age: 0,
        cap_hit: 0.0,
        contract_years: 0,
        status: String::new(),
        sport: String::new(),
        salary_by_year: None,
        contract_end_year: None,
        option_type: None,
    };
    let mut seen_name = false;
    let mut seen_team = false;

    for (key, value) in fields {
        match (key.as_str(), value) {
            ("teamCode", FieldValue::Str(v)) => {
                player.team_code = v;
                seen_team = true;
            }
            ("name", FieldValue::Str(v)) => {
                player.name = v;
                seen_name = true;
            }
            ("position", FieldValue::Str(v)) => player.position = v,
            ("depthOrder", FieldValue::Num(v)) => player.depth_order = v as u32,
            ("age", FieldValue::Num(v)) => player.age = v as u32,
            ("capHit", FieldValue::Num(v)) => player.cap_hit = v,
            ("contractYears", FieldValue::Num(v)) => player.contract_years = v as u32,
            ("status", FieldValue::Str(v)) => player.status = v,
            ("sport", FieldValue::Str(v)) => player.sport = v,
            ("salaryByYear", FieldValue::Map(v)) => player.salary_by_year = Some(v),
            ("contractEndYear", FieldValue::Num(v)) => player.contract_end_year = Some(v as u16),
            // Earlier tooling sometimes wrote a bare null/undefined here.
            ("contractEndYear", FieldValue::Ident(_)) => player.contract_end_year = None,
            ("optionType", FieldValue::Str(v)) => {
                player.option_type =
                    Some(OptionType::parse(&v).ok_or_else(|| anyhow!("bad optionType {v:?}"))?);
            }
            (other, _) => bail!("unexpected field {other:?}"),
        }
    }

    if !seen_team || !seen_name {
        bail!("entry missing teamCode or name");
    }
    Ok(player)
}

struct Cursor<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, pos: 0 }
    }

    fn done(&self) -> bool {
        self.pos >= self.s.len()
    }

    fn rest(&self) -> &str {
        &self.s[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_ws();
        if self.eat(expected) {
            Ok(())
        } else {
            bail!("expected {expected:?} at {:?}", truncate(self.rest()));
        }
    }

    fn ident(&mut self) -> Result<String> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            bail!("expected identifier at {:?}", truncate(self.rest()));
        }
        Ok(self.s[start..self.pos].to_string())
    }

    fn value(&mut self) -> Result<FieldValue> {
        self.skip_ws();
        match self.peek() {
            Some('"') => Ok(FieldValue::Str(self.string()?)),
            Some('{') => Ok(FieldValue::Map(self.salary_map()?)),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => {
                Ok(FieldValue::Num(self.number()?))
            }
            Some(c) if c.is_ascii_alphabetic() => Ok(FieldValue::Ident(self.ident()?)),
            other => bail!("unexpected value start {other:?}"),
        }
    }

    fn string(&mut self) -> Result<String> {
        if !self.eat('"') {
            bail!("expected string at {:?}", truncate(self.rest()));
        }
        let mut out = String::new();
        let mut escaped = false;
        while let Some(c) = self.peek() {
            self.pos += c.len_utf8();
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                return Ok(out);
            } else {
                out.push(c);
            }
        }
        bail!("unterminated string");
    }

    fn number(&mut self) -> Result<f64> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        self.s[start..self.pos]
            .parse::<f64>()
            .with_context(|| format!("bad number {:?}", &self.s[start..self.pos]))
    }

    fn salary_map(&mut self) -> Result<BTreeMap<u16, f64>> {
        self.expect('{')?;
        let mut map = BTreeMap::new();
        self.skip_ws();
        if self.eat('}') {
            return Ok(map);
        }
        loop {
            self.skip_ws();
            let year_raw = self.string()?;
            let year = year_raw
                .parse::<u16>()
                .with_context(|| format!("bad season year {year_raw:?}"))?;
            self.expect(':')?;
            self.skip_ws();
            let amount = self.number()?;
            map.insert(year, amount);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            return Ok(map);
        }
    }
}

fn truncate(s: &str) -> &str {
    let end = s
        .char_indices()
        .nth(24)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"import type { InsertRosterPlayer } from "@shared/schema";

export const nbaRosters2026: InsertRosterPlayer[] = [
  // ========== BOS - Boston Celtics ==========
  { teamCode: "BOS", name: "Jayson Tatum", position: "F", depthOrder: 1, age: 27, capHit: 34.0, contractYears: 1, status: "active", sport: "NBA" },
  { teamCode: "BOS", name: "Derrick White", position: "G", depthOrder: 1, age: 31, capHit: 28.1, contractYears: 4, status: "active", sport: "NBA", salaryByYear: {"2025": 28.1, "2026": 30.0, "2027": 31.9, "2028": 33.8}, contractEndYear: 2029, optionType: "player" },
];
"#;

    #[test]
    fn parses_entries_with_and_without_optional_fields() {
        let doc = RosterDocument::parse(DOC).expect("doc should parse");
        assert_eq!(doc.entries.len(), 2);

        let tatum = &doc.entries[0].player;
        assert_eq!(tatum.team_code, "BOS");
        assert_eq!(tatum.name, "Jayson Tatum");
        assert_eq!(tatum.cap_hit, 34.0);
        assert!(tatum.salary_by_year.is_none());
        assert!(tatum.option_type.is_none());

        let white = &doc.entries[1].player;
        assert_eq!(white.contract_years, 4);
        assert_eq!(white.contract_end_year, Some(2029));
        assert_eq!(white.option_type, Some(OptionType::Player));
        let salaries = white.salary_by_year.as_ref().unwrap();
        assert_eq!(salaries.len(), 4);
        assert_eq!(salaries.get(&2026), Some(&30.0));
    }

    #[test]
    fn spans_cover_exact_entry_text() {
        let doc = RosterDocument::parse(DOC).expect("doc should parse");
        for entry in &doc.entries {
            let span = &doc.text[entry.start..entry.end];
            assert!(span.starts_with('{'));
            assert!(span.ends_with('}'));
            assert!(span.contains(&entry.player.name));
        }
    }

    #[test]
    fn render_round_trips_through_parse() {
        let doc = RosterDocument::parse(DOC).expect("doc should parse");
        for entry in &doc.entries {
            let rendered = render_entry(&entry.player);
            let reparsed = RosterDocument::parse(&rendered).expect("rendered should parse");
            assert_eq!(reparsed.entries.len(), 1);
            assert_eq!(reparsed.entries[0].player, entry.player);
            // Rendering a parse of our own output is stable.
            assert_eq!(render_entry(&reparsed.entries[0].player), rendered);
        }
    }

    #[test]
    fn render_keeps_field_order_and_formats_millions() {
        let mut player = RosterDocument::parse(DOC).unwrap().entries[1].player.clone();
        player.cap_hit = 28.0;
        let rendered = render_entry(&player);
        assert!(rendered.starts_with("{ teamCode: \"BOS\", name: \"Derrick White\""));
        assert!(rendered.contains("capHit: 28.0,"));
        assert!(rendered.contains("salaryByYear: {\"2025\": 28.1, \"2026\": 30.0,"));
        assert!(rendered.ends_with("optionType: \"player\" }"));
    }

    #[test]
    fn tolerates_bare_null_contract_end_year() {
        let raw = r#"{ teamCode: "LAL", name: "Test Player", position: "C", depthOrder: 2, age: 30, capHit: 2.0, contractYears: 1, status: "active", sport: "NBA", salaryByYear: {"2025": 2.0}, contractEndYear: null, optionType: "none" }"#;
        let doc = RosterDocument::parse(raw).expect("doc should parse");
        assert_eq!(doc.entries[0].player.contract_end_year, None);
    }

    #[test]
    fn rejects_malformed_entry() {
        let raw = r#"{ teamCode: "LAL", name: }"#;
        assert!(RosterDocument::parse(raw).is_err());
    }

    #[test]
    fn skips_non_entry_braces() {
        let raw = "const x = { other: 1 };\n{ teamCode: \"MIA\", name: \"Bam Adebayo\", position: \"C\", depthOrder: 1, age: 28, capHit: 37.1, contractYears: 2, status: \"active\", sport: \"NBA\" }";
        let doc = RosterDocument::parse(raw).expect("doc should parse");
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].player.name, "Bam Adebayo");
    }
}
