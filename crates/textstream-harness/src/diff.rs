//! Diff rendering for fixture comparison.

/// `text` with control characters escaped, so NULs and newlines stay
/// visible in a one-line report.
#[must_use]
pub fn escape(text: &str) -> String {
    text.escape_debug().to_string()
}

/// Render a diff between expected and actual committed text, anchored at the
/// first differing character.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let offset = expected
        .char_indices()
        .zip(actual.chars())
        .find(|((_, e), a)| e != a)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| expected.len().min(actual.len()));

    let mut out = String::new();
    out.push_str("--- expected\n");
    out.push_str("+++ actual\n");
    out.push_str(&format!(
        "@@ byte {offset} (len {} vs {}) @@\n",
        expected.len(),
        actual.len()
    ));
    out.push_str(&format!("-{}\n", escape(expected)));
    out.push_str(&format!("+{}\n", escape(actual)));
    out
}
