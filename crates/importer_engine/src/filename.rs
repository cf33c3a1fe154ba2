use std::path::Path;

use percent_encoding::percent_decode_str;
use url::Url;

const FALLBACK_NAME: &str = "image";
const DEFAULT_EXTENSION: &str = "jpg";

/// Local filename for a cover downloaded from `url`: the last segment of the
/// percent-decoded path, `image` when empty, `.jpg` appended when it has no
/// extension. Query and fragment are ignored.
pub fn cover_filename(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let decoded = percent_decode_str(&path).decode_utf8_lossy();
    let last = decoded.rsplit('/').next().unwrap_or_default();

    let mut name = sanitize(last);
    if name.is_empty() {
        name = FALLBACK_NAME.to_string();
    }
    if Path::new(&name).extension().is_none() {
        name.push('.');
        name.push_str(DEFAULT_EXTENSION);
    }
    name
}

fn sanitize(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned.trim_matches(&[' ', '.'][..]).to_string()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}
