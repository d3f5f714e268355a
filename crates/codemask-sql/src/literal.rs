//! String literal masking.

use codemask_core::LiteralMasker;

const WILDCARDS: [char; 2] = ['%', '_'];

/// `YYYY-MM-DD`, optionally followed by ` HH:MM:SS` or `THH:MM:SS`.
pub fn is_timestamp(content: &str) -> bool {
    let bytes = content.as_bytes();
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    let date = |b: &[u8]| b.len() >= 10 && b[4] == b'-' && b[7] == b'-';

    match bytes.len() {
        10 => date(bytes) && digits(0..4) && digits(5..7) && digits(8..10),
        19 => {
            date(bytes)
                && digits(0..4)
                && digits(5..7)
                && digits(8..10)
                && matches!(bytes[10], b' ' | b'T')
                && bytes[13] == b':'
                && bytes[16] == b':'
                && digits(11..13)
                && digits(14..16)
                && digits(17..19)
        }
        _ => false,
    }
}

/// Content that already is a placeholder: a listed phrase or one past the
/// end of the list (`lorem 2`).
fn is_placeholder(content: &str, phrases: &[String]) -> bool {
    if phrases.iter().any(|p| p == content) {
        return true;
    }
    let stem = phrases
        .first()
        .and_then(|p| p.split_whitespace().next())
        .unwrap_or("Lorem");
    content
        .strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix(' '))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Rewrite one quoted literal token (quotes included).
///
/// Dates and timestamps are kept. Leading and trailing `LIKE` wildcards
/// survive around the placeholder so the pattern keeps its shape.
pub fn mask(raw: &str, phrases: &[String], masker: &mut LiteralMasker<'_>) -> String {
    let inner = raw.strip_prefix('\'').unwrap_or(raw);
    let inner = inner.strip_suffix('\'').unwrap_or(inner);
    if is_timestamp(inner) {
        return raw.to_string();
    }

    let rest = inner.trim_start_matches(WILDCARDS);
    let lead = &inner[..inner.len() - rest.len()];
    let core = rest.trim_end_matches(WILDCARDS);
    let trail = &rest[core.len()..];
    if core.is_empty() || is_placeholder(core, phrases) {
        return raw.to_string();
    }

    let phrase = masker.mask(core).replace('\'', "''");
    format!("'{lead}{phrase}{trail}'")
}
