use std::collections::BTreeMap;

use chrono::Datelike;

use crate::feed::ContractRecord;
use crate::roster::{OptionType, RosterPlayer};

/// Season start year to treat as "current". Seasons roll over mid-year, so
/// before July the running season is still the previous calendar year's.
pub fn default_current_season() -> u16 {
    let now = chrono::Utc::now();
    let year = now.year() as u16;
    if now.month() < 7 { year - 1 } else { year }
}

/// Apply the matched contract record onto an existing roster entry.
///
/// Identity fields (name, position, sport, depth order, status) and the team
/// code are never touched here; the source of truth wins on contract detail,
/// with each field falling back to the existing value when the feed has
/// nothing usable.
pub fn merge_contract(
    existing: &RosterPlayer,
    matched: &ContractRecord,
    current_season: u16,
) -> RosterPlayer {
    let salaries = positive_salaries(&matched.salary_by_year);

    let cap_hit = salaries
        .get(&current_season)
        .or_else(|| salaries.get(&(current_season + 1)))
        .copied()
        .or_else(|| salaries.values().next().copied())
        .unwrap_or(existing.cap_hit);

    // Contract length always mirrors the filtered salary map, repairing any
    // drift between the two in the existing entry.
    let contract_years = if salaries.is_empty() {
        existing.contract_years
    } else {
        salaries.len() as u32
    };

    RosterPlayer {
        cap_hit,
        contract_years,
        age: matched.age.unwrap_or(existing.age),
        contract_end_year: matched.contract_end_year.or(existing.contract_end_year),
        option_type: Some(matched.option_type.unwrap_or(OptionType::None)),
        salary_by_year: if salaries.is_empty() {
            existing.salary_by_year.clone()
        } else {
            Some(salaries)
        },
        ..existing.clone()
    }
}

/// Drop non-positive seasons (option placeholders, scrape artifacts).
fn positive_salaries(raw: &BTreeMap<u16, f64>) -> BTreeMap<u16, f64> {
    raw.iter()
        .filter(|(_, amount)| **amount > 0.0)
        .map(|(year, amount)| (*year, *amount))
        .collect()
}
