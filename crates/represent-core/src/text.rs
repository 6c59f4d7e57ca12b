//! Text normalizer - whitespace and character cleanup shared by every field
//!
//! # Guarantees
//!
//! - **Idempotent**: `clean_string(clean_string(x)) == clean_string(x)`
//! - **Total**: never fails, never panics
//! - **Line preserving**: newlines survive, the spaces around them do not

use std::sync::OnceLock;

use regex::Regex;

/// Normalize whitespace and problem characters
///
/// 1. Zero-width spaces are dropped, right single quotes become `'`, and a
///    stray `Â` (Latin-1 leaking into UTF-8 around non-breaking spaces)
///    becomes a space
/// 2. Runs of non-newline whitespace collapse to a single space
/// 3. Leading and trailing whitespace is trimmed
/// 4. Spaces around a newline are removed
pub fn clean_string(s: &str) -> String {
    let mut collapsed = String::with_capacity(s.len());
    let mut in_space = false;
    for ch in s.chars() {
        let ch = match ch {
            '\u{200B}' => continue,
            '\u{2019}' => '\'',
            '\u{00C2}' => ' ',
            c => c,
        };
        if ch != '\n' && ch.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
                in_space = true;
            }
        } else {
            collapsed.push(ch);
            in_space = false;
        }
    }

    let trimmed = collapsed.trim();
    let mut out = String::with_capacity(trimmed.len());
    for (i, line) in trimmed.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.trim_matches(' '));
    }
    out
}

fn honorific_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:Councillor|Dr|Hon|M|Mayor|Mme|Mr|Mrs|Ms|Miss)\.? ")
            .expect("honorific prefix pattern is valid")
    })
}

fn honorific_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r", Ph\.D$").expect("honorific suffix pattern is valid"))
}

/// Clean a person's name: `clean_string`, then drop one leading honorific
/// and a trailing `, Ph.D`
pub fn clean_name(s: &str) -> String {
    let cleaned = clean_string(s);
    let without_prefix = honorific_prefix_re().replace(&cleaned, "");
    honorific_suffix_re().replace(&without_prefix, "").into_owned()
}
