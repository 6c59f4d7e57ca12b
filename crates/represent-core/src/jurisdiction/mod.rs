//! Jurisdiction identity - OCD division ids to module, class and display names
//!
//! # Architecture
//!
//! ```text
//! ReferenceSource ─load─▶ ReferenceData ─▶ Resolver ─resolve─▶ JurisdictionIdentity
//!                                             │
//!                         Registry ───tidy────┘──▶ TidyReport
//! ```
//!
//! Reference data is loaded once and never mutated; the resolver is a pure
//! function of (division id, aggregation flag, reference data).

pub mod reference;
pub mod registry;
pub mod resolver;

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub use reference::{Dataset, DirectorySource, HttpSource, MemorySource, ReferenceData, ReferenceSource};
pub use registry::{Field, Finding, JurisdictionRecord, Registry, ScraperType, Severity, TidyReport};
pub use resolver::Resolver;

/// Everything derivable about a jurisdiction from its division id
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JurisdictionIdentity {
    pub module_name: String,
    pub class_name: String,
    pub jurisdiction_id: String,
    pub division_id: String,
    pub division_name: String,
    pub display_name: String,
    /// Standard Geographical Classification code; boroughs have none
    pub geographic_code: Option<String>,
    /// Census division or subdivision type code (`CY`, `RM`, `MÉ`, ...)
    pub division_type: Option<String>,
    /// Official website, empty when the reference data has none
    pub url: String,
}

/// Scope suffix appended to a jurisdiction id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JurisdictionScope {
    Legislature,
    Municipalities,
    Council,
}

impl JurisdictionScope {
    pub fn as_str(self) -> &'static str {
        match self {
            JurisdictionScope::Legislature => "legislature",
            JurisdictionScope::Municipalities => "municipalities",
            JurisdictionScope::Council => "council",
        }
    }
}

/// `ocd-division/…` → `ocd-jurisdiction/…/<scope>`
pub fn jurisdiction_id(division_id: &str, scope: JurisdictionScope) -> String {
    format!(
        "{}/{}",
        division_id.replace("ocd-division", "ocd-jurisdiction"),
        scope.as_str()
    )
}

fn jurisdiction_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:jurisdiction:)?ocd-jurisdiction/").expect("jurisdiction prefix pattern is valid")
    })
}

fn jurisdiction_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/(council|legislature|municipalities)$").expect("jurisdiction suffix pattern is valid")
    })
}

/// Recover the division id from a jurisdiction id
///
/// Returns the division id and whether the jurisdiction is a municipalities
/// aggregate. Division ids are returned unchanged.
pub fn split_jurisdiction_id(id: &str) -> (String, bool) {
    let division = jurisdiction_prefix_re().replace(id, "ocd-division/");
    let aggregation = jurisdiction_suffix_re()
        .captures(&division)
        .is_some_and(|caps| &caps[1] == "municipalities");
    let division = jurisdiction_suffix_re().replace(&division, "");
    (division.into_owned(), aggregation)
}

/// Fold to ASCII: strip diacritics, expand common ligatures, drop the rest
pub fn ascii_fold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfkd() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'ß' => out.push_str("ss"),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            _ => {}
        }
    }
    out
}

/// Module-name fragment for a division name
///
/// Lowercased; spaces, hyphens, en dashes and em dashes become `_`;
/// apostrophes and periods are removed; then folded to ASCII.
///
/// ```
/// use represent_core::jurisdiction::slug;
///
/// assert_eq!(slug("Côte-Saint-Luc"), "cote_saint_luc");
/// assert_eq!(slug("St. John's"), "st_johns");
/// ```
pub fn slug(name: &str) -> String {
    let translated: String = name
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' | '\u{2013}' | '\u{2014}' => Some('_'),
            '\'' | '\u{2018}' | '\u{2019}' | '.' => None,
            c => Some(c),
        })
        .collect();
    ascii_fold(&translated)
}

/// Class name for a division name: words capitalized and joined, ASCII only
///
/// ```
/// use represent_core::jurisdiction::class_name;
///
/// assert_eq!(class_name("St. John's"), "StJohns");
/// assert_eq!(class_name("Rivière-du-Loup"), "RiviereDuLoup");
/// ```
pub fn class_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '.'))
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            c => c,
        })
        .collect();

    let joined: String = cleaned
        .split([' ', '-'])
        .map(|word| {
            if word.starts_with(|c: char| c.is_ascii_uppercase()) {
                word.to_string()
            } else {
                capitalize(word)
            }
        })
        .collect();
    ascii_fold(&joined)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jurisdiction_id() {
        assert_eq!(
            jurisdiction_id("ocd-division/country:ca/csd:5915022", JurisdictionScope::Council),
            "ocd-jurisdiction/country:ca/csd:5915022/council"
        );
        assert_eq!(
            jurisdiction_id("ocd-division/country:ca/province:ns", JurisdictionScope::Municipalities),
            "ocd-jurisdiction/country:ca/province:ns/municipalities"
        );
    }

    #[test]
    fn test_split_jurisdiction_id() {
        assert_eq!(
            split_jurisdiction_id("ocd-jurisdiction/country:ca/csd:5915022/council"),
            ("ocd-division/country:ca/csd:5915022".to_string(), false)
        );
        assert_eq!(
            split_jurisdiction_id("jurisdiction:ocd-jurisdiction/country:ca/province:qc/legislature"),
            ("ocd-division/country:ca/province:qc".to_string(), false)
        );
        assert_eq!(
            split_jurisdiction_id("ocd-jurisdiction/country:ca/province:pe/municipalities"),
            ("ocd-division/country:ca/province:pe".to_string(), true)
        );
        assert_eq!(
            split_jurisdiction_id("ocd-division/country:ca/cd:3521"),
            ("ocd-division/country:ca/cd:3521".to_string(), false)
        );
    }

    #[test]
    fn test_ascii_fold() {
        assert_eq!(ascii_fold("Québec"), "Quebec");
        assert_eq!(ascii_fold("Lévis"), "Levis");
        assert_eq!(ascii_fold("Saint-Jérôme"), "Saint-Jerome");
        assert_eq!(ascii_fold("Œuvre"), "OEuvre");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Vancouver"), "vancouver");
        assert_eq!(slug("Grande Prairie"), "grande_prairie");
        assert_eq!(slug("Côte-Saint-Luc"), "cote_saint_luc");
        assert_eq!(slug("St. John\u{2019}s"), "st_johns");
        assert_eq!(slug("Lévis"), "levis");
        assert_eq!(slug("Abitibi\u{2014}Témiscamingue"), "abitibi_temiscamingue");
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("Vancouver"), "Vancouver");
        assert_eq!(class_name("Grande Prairie"), "GrandePrairie");
        assert_eq!(class_name("Côte-Saint-Luc"), "CoteSaintLuc");
        assert_eq!(class_name("Québec"), "Quebec");
        assert_eq!(class_name("Prince Edward Island"), "PrinceEdwardIsland");
        assert_eq!(class_name("Newfoundland and Labrador"), "NewfoundlandAndLabrador");
        assert_eq!(class_name("Baie-d'Urfé"), "BaieDurfe");
    }

    #[test]
    fn test_class_name_drops_typographic_apostrophes() {
        assert_eq!(class_name("St. John\u{2019}s"), "StJohns");
        assert_eq!(class_name("Baie-d\u{2018}Urfé"), "BaieDurfe");
        assert_eq!(slug("Baie-d\u{2018}Urfé"), "baie_durfe");
    }
}
