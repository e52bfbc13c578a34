//! Canonical identity keys for task text

/// Normalize task text into an identity key.
///
/// Lower-cases, turns every run of characters that are not alphanumeric into
/// a single space, and trims. Punctuation-only edits therefore map to the
/// same key.
pub fn normalize(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut gap = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if gap && !key.is_empty() {
                key.push(' ');
            }
            gap = false;
            key.extend(ch.to_lowercase().filter(|c| c.is_alphanumeric()));
        } else {
            gap = true;
        }
    }

    key
}
