//! Artist extraction from loosely formatted archive file names.
//!
//! Recognised shapes, with the extension already stripped:
//!
//! ```text
//! (Convention) [Circle (Artist)] Title
//! [Circle (Artist)] Title
//! [Artist] Title
//! ```

use lazy_static::lazy_static;
use regex::Regex;

pub const UNKNOWN_ARTIST: &str = "UNKNOWN ARTIST";

lazy_static! {
    static ref SHAPE: Regex = Regex::new(r"^(\(.+\))?\s*\[.+(\(.+\))?\].+$").unwrap();
    static ref GROUP_FIELD: Regex = Regex::new(r"\[[^\]\(]*(\([^\)]*\))?[^\]]*").unwrap();
    static ref PAREN_SPAN: Regex = Regex::new(r"\([^\)]*").unwrap();
}

/// Pull the artist (or circle) out of a file stem.
///
/// Never fails: anything that does not look like `[...] Title` yields
/// [`UNKNOWN_ARTIST`]. A parenthesised list of several authors is not a usable
/// key, so the circle name in front of it is returned instead, untrimmed.
pub fn extract_artist(stem: &str) -> String {
    if !SHAPE.is_match(stem) {
        return UNKNOWN_ARTIST.to_string();
    }

    let group_field = match GROUP_FIELD.find(stem) {
        Some(m) => &m.as_str()[1..],
        None => return UNKNOWN_ARTIST.to_string(),
    };

    match PAREN_SPAN.find(group_field) {
        None => group_field.to_string(),
        Some(m) => {
            let candidate = &m.as_str()[1..];
            if candidate.contains(',') {
                group_field.split('(').next().unwrap_or_default().to_string()
            } else {
                candidate.to_string()
            }
        }
    }
}

/// Upper-case the first character of every space-separated word and lower-case the rest.
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Directory name used for the artist of `stem`.
pub fn resolve_artist_name(stem: &str) -> String {
    let name = capitalize_words(&extract_artist(stem).to_lowercase());
    let name = name.trim();
    if name.is_empty() {
        capitalize_words(&UNKNOWN_ARTIST.to_lowercase())
    } else {
        name.to_string()
    }
}
