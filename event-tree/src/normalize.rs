//! Event title normalization
//!
//! Source catalogs deliver titles with leftover escape sequences and HTML entities.
//! [`normalize`] turns them into display text with a fixed pipeline:
//!
//! 1. `\uXXXX` escapes (backslash, `u`, 4 hex digits) become the encoded character
//! 2. remaining `uXXXX` sequences become the encoded character. This also matches
//!    inside ordinary words; that is a known quirk of the source data and is kept
//! 3. literal `\n` becomes a single space
//! 4. `&deg;` `&amp;` `&lt;` `&gt;` `&quot;` `&#39;` are decoded, in that order
//!
//! The order matters: each step runs over the output of the previous one.
//! Escapes encode UTF-16 code units. A high and a low surrogate that end up next
//! to each other form one character, whichever escape form each came from.
//! Unpaired surrogates become U+FFFD.

use crate::types::EventData;

/// Entity replacements, applied one after the other
const ENTITIES: [(&str, &str); 6] = [
    ("&deg;", "\u{00B0}"),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Title shown when neither the payload nor the node carry a usable label
pub const UNKNOWN_EVENT_TITLE: &str = "Unknown Event";

/// Normalize a raw event title for display
///
/// Total function: any input that matches none of the rules passes through unchanged.
///
/// # Example
/// ```
/// use event_tree::normalize;
///
/// assert_eq!(normalize(&format!("{}u03b1 Cen", '\\')), "\u{3b1} Cen");
/// assert_eq!(normalize(r"Line1\nLine2"), "Line1 Line2");
/// assert_eq!(normalize("A &amp; B"), "A & B");
/// ```
pub fn normalize(raw: &str) -> String {
    let units: Vec<u16> = raw.encode_utf16().collect();
    let pass1 = decode_hex_escapes(&units, EscapeForm::Backslash);
    let pass2 = decode_hex_escapes(&pass1, EscapeForm::Bare);

    let mut text = String::from_utf16_lossy(&pass2).replace("\\n", " ");
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }
    text
}

/// Pick and normalize the title of an event
///
/// Prefers `short_label`, then `label` from the payload, then the node's own label.
/// Empty strings are skipped.
pub fn display_title(label: &str, event_data: &EventData) -> String {
    let from_data = |field: &str| {
        event_data
            .get(field)
            .and_then(|value| value.as_str())
            .filter(|s| !s.is_empty())
    };

    let chosen = from_data("short_label")
        .or_else(|| from_data("label"))
        .or_else(|| Some(label).filter(|s| !s.is_empty()))
        .unwrap_or(UNKNOWN_EVENT_TITLE);

    normalize(chosen)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeForm {
    /// `\uXXXX`
    Backslash,
    /// `uXXXX`
    Bare,
}

const BACKSLASH: u16 = b'\\' as u16;
const LOWER_U: u16 = b'u' as u16;

impl EscapeForm {
    /// Length of the escape prefix before the hex digits
    fn prefix_len(self) -> usize {
        match self {
            EscapeForm::Backslash => 2,
            EscapeForm::Bare => 1,
        }
    }

    /// Decode an escape starting at unit `at`, returning the encoded unit and the end offset
    fn match_at(self, units: &[u16], at: usize) -> Option<(u16, usize)> {
        let prefix_ok = match self {
            EscapeForm::Backslash => {
                units.get(at) == Some(&BACKSLASH) && units.get(at + 1) == Some(&LOWER_U)
            }
            EscapeForm::Bare => units.get(at) == Some(&LOWER_U),
        };
        if !prefix_ok {
            return None;
        }
        let start = at + self.prefix_len();
        let unit = parse_hex4(units.get(start..start + 4)?)?;
        Some((unit, start + 4))
    }
}

fn parse_hex4(digits: &[u16]) -> Option<u16> {
    digits.iter().try_fold(0u16, |acc, &d| {
        let nibble = char::from_u32(u32::from(d))?.to_digit(16)?;
        Some((acc << 4) | nibble as u16)
    })
}

/// Replace every non-overlapping escape of the given form, scanning left to right
///
/// Works on UTF-16 code units so a surrogate decoded by one pass can pair up with
/// one decoded by a later pass. Unpaired surrogates survive until the final
/// conversion turns them into U+FFFD.
fn decode_hex_escapes(input: &[u16], form: EscapeForm) -> Vec<u16> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        match form.match_at(input, i) {
            Some((unit, end)) => {
                out.push(unit);
                i = end;
            }
            None => {
                out.push(input[i]);
                i += 1;
            }
        }
    }
    out
}
