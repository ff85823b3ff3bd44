//! Markup stripping and HTML escaping for free text.

use std::sync::OnceLock;

use regex::Regex;

/// Patterns removed from free text, applied in order.
fn dangerous_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        [
            // Script blocks, including their body, up to the first closing tag.
            r"(?is)<script\b.*?</script>",
            // Inline event handlers such as onclick="...".
            r#"(?i)on[A-Za-z0-9_]+\s*=\s*["'][^"']*["']"#,
            r"(?i)javascript:",
            r"(?i)data:text/html",
            r"(?i)<iframe",
            r"(?i)<object",
            r"(?i)<embed",
            r"(?i)<link",
            r"(?i)<meta",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("failed to compile sanitizer regex"))
        .collect()
    })
}

/// Remove script blocks, event-handler attributes, script-capable URIs, and
/// embedding tag openers.
pub fn strip_dangerous(input: &str) -> String {
    dangerous_patterns()
        .iter()
        .fold(input.to_string(), |text, pattern| {
            pattern.replace_all(&text, "").into_owned()
        })
}

/// Escape `& < > " ' /` as HTML entities.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Reverse [`escape_html`], restoring the text it was given.
pub fn unescape_html(input: &str) -> String {
    const ENTITIES: [(&str, char); 6] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#x27;", '\''),
        ("&#x2F;", '/'),
    ];

    let mut unescaped = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(at) = rest.find('&') {
        unescaped.push_str(&rest[..at]);
        rest = &rest[at..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, c)) => {
                unescaped.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                unescaped.push('&');
                rest = &rest[1..];
            }
        }
    }
    unescaped.push_str(rest);
    unescaped
}
