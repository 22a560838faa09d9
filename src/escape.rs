//! Entity escaping and line-break placeholders for comment text.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Stands for a native line break inside a single line of comment text.
pub const BREAK_PLACEHOLDER: &str = "<br/>";

/// Stands for a tab inside table markup.
pub const TAB_PLACEHOLDER: &str = "<tab/>";

static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,7});").unwrap());

// Tolerate the spellings hand-written comments use.
static RE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static RE_TAB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<tab\s*/?>").unwrap());

static RE_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

/// Escape the characters that are significant in markup.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape text for a table cell: entities, then breaks and tabs as
/// placeholder elements.
pub fn escape_cell(s: &str) -> String {
    let escaped = escape_html(s);
    let escaped = RE_NEWLINE.replace_all(&escaped, BREAK_PLACEHOLDER);
    escaped.replace('\t', TAB_PLACEHOLDER)
}

/// Escape text for a compact comment line; only `&`, `<` and `>` are touched.
pub fn escape_compact(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Break and tab placeholders back to native characters.
pub fn restore_placeholders(s: &str) -> String {
    let s = RE_BREAK.replace_all(s, "\n");
    RE_TAB.replace_all(&s, "\t").into_owned()
}

/// Resolve named and numeric character references. Unknown names are kept.
pub fn unescape_html(s: &str) -> String {
    RE_ENTITY
        .replace_all(s, |caps: &Captures| {
            let body = &caps[1];
            let resolved = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match resolved {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "ndash" => '–',
        "mdash" => '—',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "auml" => 'ä',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "Auml" => 'Ä',
        "Ouml" => 'Ö',
        "Uuml" => 'Ü',
        "szlig" => 'ß',
        "euro" => '€',
        _ => return None,
    };
    Some(c)
}

/// Placeholders first, entities second, so an escaped `&lt;br/&gt;` written
/// by the user stays literal text.
pub fn decode_text(s: &str) -> String {
    unescape_html(&restore_placeholders(s))
}
