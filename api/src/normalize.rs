/// The model used when no model name is configured.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Hyphen-like code points which creep into model names pasted from rich text.
const HYPHEN_LIKE: [char; 10] = [
    '\u{2010}', // hyphen
    '\u{2011}', // non-breaking hyphen
    '\u{2012}', // figure dash
    '\u{2013}', // en dash
    '\u{2014}', // em dash
    '\u{2015}', // horizontal bar
    '\u{2212}', // minus sign
    '\u{FE58}', // small em dash
    '\u{FE63}', // small hyphen-minus
    '\u{FF0D}', // fullwidth hyphen-minus
];

/// Normalizes a model name: every hyphen-like character becomes an ASCII `-` and surrounding
/// whitespace is trimmed. Returns [`DEFAULT_MODEL`] when no name is given.
pub fn normalize_model(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => raw
            .chars()
            .map(|c| if HYPHEN_LIKE.contains(&c) { '-' } else { c })
            .collect::<String>()
            .trim()
            .to_string(),
        None => DEFAULT_MODEL.to_string(),
    }
}
