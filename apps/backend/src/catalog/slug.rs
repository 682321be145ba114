use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// URL-safe slug: NFKD, combining marks dropped, lowercased, every run of
/// non-alphanumerics collapsed to a single `-`, no leading or trailing dash.
///
/// `"São Paulo"` becomes `"sao-paulo"`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    out
}

/// `true` for a non-empty `[a-z0-9-]+` label without edge or doubled dashes.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && !label.contains("--")
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
