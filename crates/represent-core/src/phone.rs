//! Phone canonicalizer - free-form NANP numbers to `1-AAA-BBB-CCCC[ xEXT]`
//!
//! Formatting follows the Government of Canada typography guide for
//! telephone numbers. Input that does not look like exactly one NANP number
//! with at most one extension is returned unchanged.

/// Extension markers, in the order they are tried at each position.
/// `ext.` is tried before `ext` so the period is consumed when present.
const EXTENSION_MARKERS: [&str; 5] = ["/", "x", "ext.", "ext", "poste"];

/// Canonicalize a telephone number
///
/// The number is split on extension markers (`/`, `x`, `ext`, `ext.`,
/// `poste`, any case, optionally followed by one space or hyphen). The
/// digits before the first marker must form a 10-digit number, or an
/// 11-digit number starting with `1`. At most one extension may follow,
/// and it is appended verbatim after ` x`.
///
/// ```
/// use represent_core::phone::clean_telephone_number;
///
/// assert_eq!(clean_telephone_number("(416) 555-1234"), "1-416-555-1234");
/// assert_eq!(clean_telephone_number("416-555-1234 ext. 9"), "1-416-555-1234 x9");
/// assert_eq!(clean_telephone_number("555-1234"), "555-1234");
/// ```
pub fn clean_telephone_number(s: &str) -> String {
    let splits = split_extensions(s);

    let mut digits: String = splits[0].chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        digits.insert(0, '1');
    }

    if digits.len() == 11 && digits.starts_with('1') && splits.len() <= 2 {
        let number = format!(
            "{}-{}-{}-{}",
            &digits[..1],
            &digits[1..4],
            &digits[4..7],
            &digits[7..]
        );
        match splits.get(1) {
            Some(extension) => format!("{} x{}", number, extension),
            None => number,
        }
    } else {
        s.to_string()
    }
}

/// Split `s` on every extension marker, left to right, without overlap
fn split_extensions(s: &str) -> Vec<&str> {
    let mut splits = Vec::new();
    let mut segment_start = 0;
    let mut pos = 0;

    while pos < s.len() {
        if let Some(end) = marker_at(s, pos) {
            splits.push(&s[segment_start..pos]);
            segment_start = end;
            pos = end;
        } else {
            pos += s[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }
    splits.push(&s[segment_start..]);
    splits
}

/// Byte offset just past the marker starting at `pos`, if one matches there
///
/// A marker only counts when the text after it (and after its optional
/// separator) starts at a word boundary or with a digit.
fn marker_at(s: &str, pos: usize) -> Option<usize> {
    let rest = &s.as_bytes()[pos..];
    for marker in EXTENSION_MARKERS {
        let len = marker.len();
        if rest.len() < len || !rest[..len].eq_ignore_ascii_case(marker.as_bytes()) {
            continue;
        }
        let marker_end = pos + len;
        let separator_end = s[marker_end..]
            .chars()
            .next()
            .filter(|c| c.is_whitespace() || *c == '-')
            .map(|c| marker_end + c.len_utf8());

        for end in separator_end.into_iter().chain(std::iter::once(marker_end)) {
            if extension_follows(s, end) {
                return Some(end);
            }
        }
    }
    None
}

fn extension_follows(s: &str, end: usize) -> bool {
    let before = s[..end].chars().next_back();
    let after = s[end..].chars().next();
    if after.is_some_and(|c| c.is_ascii_digit()) {
        return true;
    }
    before.is_some_and(is_word_char) != after.is_some_and(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
