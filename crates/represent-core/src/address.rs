//! Address canonicalizer - postal codes, province names, last-line layout
//!
//! # Pipeline
//!
//! `raw → fix postal-code digits → abbreviate province/territory → reformat last line`
//!
//! The last line is laid out as `Toronto  ON  M4B 1B3`: two spaces before the
//! region and two before the postal code. Downstream consumers match on this
//! exact spacing. Input whose tail does not look like a region and postal code
//! keeps only the first two steps.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Province and territory names with their postal abbreviations, tried in order
pub const PROVINCE_ABBREVIATIONS: [(&str, &str); 14] = [
    ("Newfoundland and Labrador", "NL"),
    ("Prince Edward Island", "PE"),
    ("Nova Scotia", "NS"),
    ("New Brunswick", "NB"),
    ("Québec", "QC"),
    ("Ontario", "ON"),
    ("Manitoba", "MB"),
    ("Saskatchewan", "SK"),
    ("Alberta", "AB"),
    ("British Columbia", "BC"),
    ("Yukon", "YT"),
    ("Northwest Territories", "NT"),
    ("Nunavut", "NU"),
    ("PEI", "PE"),
];

const SEPARATOR: &str = r"[,\n ]+";
const POSTAL_CODE: &str = r"[A-Z][0-9][A-Z]\s?[0-9][A-Z][0-9]";

fn postal_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Z][O0-9][A-Z]\s?[O0-9][A-Z][O0-9]\b")
            .expect("postal code pattern is valid")
    })
}

fn province_res() -> &'static [(Regex, &'static str)] {
    static RES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RES.get_or_init(|| {
        PROVINCE_ABBREVIATIONS
            .iter()
            .map(|(name, abbreviation)| {
                let pattern = format!(
                    r"{sep}\(?{name}\)?((?:{sep}Canada)?(?:{sep}{postal})?)$",
                    sep = SEPARATOR,
                    name = regex::escape(name),
                    postal = POSTAL_CODE,
                );
                let re = Regex::new(&pattern).expect("province pattern is valid");
                (re, *abbreviation)
            })
            .collect()
    })
}

fn last_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"[,\n ]+([A-Z]{2})(?:[,\n ]+Canada)?[,\n ]+([A-Z][0-9][A-Z])\s?([0-9][A-Z][0-9])$",
        )
        .expect("last line pattern is valid")
    })
}

/// Canonicalize a Canadian mailing address
///
/// ```
/// use represent_core::address::clean_address;
///
/// assert_eq!(
///     clean_address("123 Main St, Toronto, Ontario, M4B 1B3"),
///     "123 Main St, Toronto  ON  M4B 1B3"
/// );
/// ```
pub fn clean_address(s: &str) -> String {
    let corrected = fix_postal_codes(s);
    let abbreviated = abbreviate_region(&corrected);
    last_line_re()
        .replace(&abbreviated, "  ${1}  ${2} ${3}")
        .into_owned()
}

/// Replace the letter `O` with the digit `0` in the digit positions of every
/// postal-code-shaped token
pub fn fix_postal_codes(s: &str) -> String {
    postal_code_re()
        .replace_all(s, |caps: &Captures| {
            let mut position = 0;
            caps[0]
                .chars()
                .map(|c| {
                    if c.is_whitespace() {
                        return c;
                    }
                    let fixed = if c == 'O' && position % 2 == 1 { '0' } else { c };
                    position += 1;
                    fixed
                })
                .collect::<String>()
        })
        .into_owned()
}

/// Abbreviate a trailing province or territory name
///
/// The name must be followed only by an optional `Canada` and an optional
/// postal code.
pub fn abbreviate_region(s: &str) -> String {
    let mut out = s.to_string();
    for (re, abbreviation) in province_res() {
        let replacement = format!(" {}${{1}}", abbreviation);
        out = re.replace(&out, replacement.as_str()).into_owned();
    }
    out
}
