/// Storage key for a generated image: whitespace becomes `-`, the result is
/// percent-encoded the way browsers' `encodeURIComponent` does it, and
/// `.jpeg` is appended. Distinct prompts may map to the same key.
pub fn object_key(prompt: &str) -> String {
    let slug: String = prompt
        .chars()
        .map(|c| if is_js_whitespace(c) { '-' } else { c })
        .collect();

    format!("{}.jpeg", encode_uri_component(&slug))
}

// Matches the ECMAScript `\s` class, which differs from char::is_whitespace
// on U+0085 and U+FEFF.
fn is_js_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

fn encode_uri_component(input: &str) -> String {
    // urlencoding escapes these too; encodeURIComponent leaves them alone.
    const UNESCAPED: [(&str, &str); 5] = [
        ("%21", "!"),
        ("%27", "'"),
        ("%28", "("),
        ("%29", ")"),
        ("%2A", "*"),
    ];

    let mut encoded = urlencoding::encode(input).into_owned();
    for (escaped, raw) in UNESCAPED {
        encoded = encoded.replace(escaped, raw);
    }
    encoded
}
