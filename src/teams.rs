use std::collections::HashMap;

/// Canonical three-letter team codes, in seed-document order.
pub const TEAM_CODES: [&str; 30] = [
    "ATL", "BOS", "BKN", "CHA", "CHI", "CLE", "DAL", "DEN", "DET", "GSW",
    "HOU", "IND", "LAC", "LAL", "MEM", "MIA", "MIL", "MIN", "NOP", "NYK",
    "OKC", "ORL", "PHI", "PHX", "POR", "SAC", "SAS", "TOR", "UTA", "WAS",
];

/// Immutable team lookup data. Built once per run and passed into feed parsing
/// and document checks rather than living in module-level state.
#[derive(Debug, Clone)]
pub struct TeamDirectory {
    names: HashMap<&'static str, &'static str>,
    // Source feeds key teams by their own taxonomy (basketball-reference);
    // most codes agree with ours, three do not.
    source_aliases: HashMap<&'static str, &'static str>,
}

impl TeamDirectory {
    pub fn nba() -> Self {
        let names = HashMap::from([
            ("ATL", "Atlanta Hawks"),
            ("BOS", "Boston Celtics"),
            ("BKN", "Brooklyn Nets"),
            ("CHA", "Charlotte Hornets"),
            ("CHI", "Chicago Bulls"),
            ("CLE", "Cleveland Cavaliers"),
            ("DAL", "Dallas Mavericks"),
            ("DEN", "Denver Nuggets"),
            ("DET", "Detroit Pistons"),
            ("GSW", "Golden State Warriors"),
            ("HOU", "Houston Rockets"),
            ("IND", "Indiana Pacers"),
            ("LAC", "LA Clippers"),
            ("LAL", "Los Angeles Lakers"),
            ("MEM", "Memphis Grizzlies"),
            ("MIA", "Miami Heat"),
            ("MIL", "Milwaukee Bucks"),
            ("MIN", "Minnesota Timberwolves"),
            ("NOP", "New Orleans Pelicans"),
            ("NYK", "New York Knicks"),
            ("OKC", "Oklahoma City Thunder"),
            ("ORL", "Orlando Magic"),
            ("PHI", "Philadelphia 76ers"),
            ("PHX", "Phoenix Suns"),
            ("POR", "Portland Trail Blazers"),
            ("SAC", "Sacramento Kings"),
            ("SAS", "San Antonio Spurs"),
            ("TOR", "Toronto Raptors"),
            ("UTA", "Utah Jazz"),
            ("WAS", "Washington Wizards"),
        ]);
        let source_aliases = HashMap::from([("BRK", "BKN"), ("CHO", "CHA"), ("PHO", "PHX")]);
        Self {
            names,
            source_aliases,
        }
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.names.contains_key(code)
    }

    pub fn display_name(&self, code: &str) -> Option<&'static str> {
        self.names.get(code).copied()
    }

    /// Map a feed team key onto our canonical code, if it is one we recognise.
    pub fn to_canonical<'a>(&self, source_code: &'a str) -> Option<&'a str> {
        if let Some(mapped) = self.source_aliases.get(source_code) {
            return Some(mapped);
        }
        if self.is_known(source_code) {
            return Some(source_code);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_covers_all_codes() {
        let dir = TeamDirectory::nba();
        for code in TEAM_CODES {
            assert!(dir.is_known(code), "missing {code}");
        }
        assert_eq!(dir.display_name("BOS"), Some("Boston Celtics"));
    }

    #[test]
    fn source_taxonomy_maps_to_canonical() {
        let dir = TeamDirectory::nba();
        assert_eq!(dir.to_canonical("BRK"), Some("BKN"));
        assert_eq!(dir.to_canonical("CHO"), Some("CHA"));
        assert_eq!(dir.to_canonical("PHO"), Some("PHX"));
        assert_eq!(dir.to_canonical("BOS"), Some("BOS"));
        assert_eq!(dir.to_canonical("XYZ"), None);
    }
}
