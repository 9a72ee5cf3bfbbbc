// Canonical identifiers and display text from heterogeneous source fields.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel id substituted when no real identifier can be recovered.
pub const PLACEHOLDER_IDENTIFIER: &str = "OL12345678M";

// Values the upstream sheet writes into the cover column when its own
// lookup failed.
const COVER_ERROR_STRINGS: [&str; 3] = ["No Cover Available", "Not Found", "Fetch Error"];

// The three cover URL shapes carrying an embedded id, each followed by a
// size suffix and image extension.
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)/id/(\d+)-[A-Z]\.jpg").unwrap());
static OLID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)/olid/([A-Z0-9]+)-[A-Z]\.jpg").unwrap());
static ISBN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)/isbn/(\d+)-[A-Z]\.jpg").unwrap());

// Labels already phrased as a full sentence pass through unchanged.
const FULL_PHRASE_PREFIX: &str = "read a";

// Short forms with a fixed expansion.
const SPECIAL_FORMS: [&str; 3] = ["memoir", "mystery or thriller", "graphic novel or comic"];

// Prefixes that read naturally as "Read a book <label>".
const BOOK_PREFIXES: [&str; 5] = ["recommended by", "with ", "about ", "published ", "over "];

/// Expands an abbreviated challenge label into its display sentence.
///
/// Total and deterministic: empty input and labels that already read as a
/// full sentence come back unchanged.
pub fn expand_challenge(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }
    let lower = code.to_lowercase();
    if lower.starts_with(FULL_PHRASE_PREFIX) {
        return code.to_string();
    }
    if SPECIAL_FORMS.contains(&lower.as_str()) {
        return format!("Read a {}", lower);
    }
    if BOOK_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        format!("Read a book {}", lower)
    } else {
        format!("Read a {}", lower)
    }
}

/// Recovers the canonical book id embedded in a cover URL.
///
/// The fallback is uniform: absent URLs, known error strings and
/// unrecognized shapes all yield the placeholder sentinel, so an
/// identifier is never empty.
pub fn extract_identifier(cover_url: Option<&str>) -> String {
    let url = match cover_url {
        Some(u) if !u.is_empty() && !COVER_ERROR_STRINGS.contains(&u) => u,
        _ => return PLACEHOLDER_IDENTIFIER.to_string(),
    };
    for re in [&*OLID_RE, &*ID_RE, &*ISBN_RE] {
        if let Some(m) = re.captures(url).and_then(|caps| caps.get(1)) {
            return m.as_str().to_string();
        }
    }
    debug!("extract_identifier: no id pattern in {:?}", url);
    PLACEHOLDER_IDENTIFIER.to_string()
}

/// Resolves the cover image URL for a book entry.
///
/// A raw value with an http(s) scheme is used verbatim; anything else is
/// replaced by a canonical cover-service URL built from the identifier,
/// so the result is always a well-formed URL.
pub fn resolve_cover_url(raw: Option<&str>, identifier: &str) -> String {
    if let Some(u) = raw {
        if u.starts_with("http://") || u.starts_with("https://") {
            return u.to_string();
        }
    }
    format!("https://covers.openlibrary.org/b/olid/{}-M.jpg", identifier)
}

/// The numeric ISBN embedded in a cover URL, when present.
pub fn extract_isbn(cover_url: Option<&str>) -> Option<String> {
    let url = cover_url?;
    ISBN_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Cover URL for a review card.
///
/// The raw value survives only when it is a real URL rather than an
/// upstream error marker; rendering falls back to the identifier or ISBN
/// carried on the entry.
pub fn review_cover_url(raw: Option<&str>) -> Option<String> {
    let url = raw?;
    if !url.starts_with("http") {
        return None;
    }
    if COVER_ERROR_STRINGS.contains(&url) {
        return None;
    }
    let lower = url.to_lowercase();
    if lower.contains("error") || lower.contains("failed") {
        return None;
    }
    Some(url.to_string())
}
