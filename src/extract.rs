//! Link extraction from free-text cells.
//!
//! Rows arrive as whatever the intake form put in the watch column — usually
//! a URL surrounded by commentary. Extraction looks for `http://` or
//! `https://` (scheme matched case-insensitively, original casing preserved)
//! followed by at least one non-terminator character.

/// Returns the first link in `text`, terminated by whitespace.
pub fn first_link(text: &str) -> Option<String> {
    links_until(text, char::is_whitespace).into_iter().next()
}

/// Returns every link in `text`.
///
/// Multiple links may be packed into one cell separated by commas, so the
/// terminator set here is whitespace plus `,`.
pub fn all_links(text: &str) -> Vec<String> {
    links_until(text, |c| c.is_whitespace() || c == ',')
}

fn links_until(text: &str, is_terminator: fn(char) -> bool) -> Vec<String> {
    // `to_ascii_lowercase` only rewrites ASCII letters, so byte offsets into
    // `lower` are valid offsets into `text`.
    let lower = text.to_ascii_lowercase();
    let mut links = Vec::new();
    let mut at = 0;

    while let Some(found) = lower[at..].find("http") {
        let start = at + found;
        let mut scheme_end = start + 4;
        if lower[scheme_end..].starts_with('s') {
            scheme_end += 1;
        }
        if !lower[scheme_end..].starts_with("://") {
            at = scheme_end;
            continue;
        }
        let body = &text[scheme_end + 3..];
        let body_len = body
            .find(|c: char| is_terminator(c))
            .unwrap_or(body.len());
        if body_len == 0 {
            // Bare "http://" with nothing after it.
            at = scheme_end + 3;
            continue;
        }
        let end = scheme_end + 3 + body_len;
        links.push(text[start..end].to_string());
        at = end;
    }

    links
}
