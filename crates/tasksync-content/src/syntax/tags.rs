//! Tag decorations

use super::config::TagsSyntax;

const TAG_ICON: &str = "🏷\u{FE0F}";
const TAG_ICON_BARE: char = '🏷';

/// The form a tag literal takes in a line.
///
/// Characters outside `[alnum _ - /]` become `-`, runs of `-` collapse and
/// leading or trailing `-` are dropped, so `Q&A` is written `Q-A` and
/// `home office` is written `home-office`. Returns `None` for a tag no line
/// can carry: empty after cleaning, or purely numeric.
pub fn canonical_tag(tag: &str) -> Option<String> {
    let mut out = String::with_capacity(tag.len());
    for c in tag.trim().trim_start_matches('#').chars() {
        let c = if is_tag_char(c) { c } else { '-' };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    let out = out.trim_matches('-');
    let valid = !out.is_empty() && !out.chars().all(|c| c.is_ascii_digit());
    valid.then(|| out.to_string())
}

pub(crate) fn render(tags: &[&str], syntax: TagsSyntax) -> Option<String> {
    let mut shown: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().filter_map(|t| canonical_tag(t)) {
        if !shown.contains(&tag) {
            shown.push(tag);
        }
    }
    if shown.is_empty() {
        return None;
    }
    match syntax {
        TagsSyntax::Hidden => None,
        TagsSyntax::Symbol => Some(
            shown
                .iter()
                .map(|t| format!("#{t}"))
                .collect::<Vec<_>>()
                .join(" "),
        ),
        TagsSyntax::Emoji => Some(
            shown
                .iter()
                .map(|t| format!("{TAG_ICON}{t}"))
                .collect::<Vec<_>>()
                .join(" "),
        ),
        TagsSyntax::Dataview => Some(format!("[tags:: {}]", shown.join(", "))),
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '/')
}

/// `#tag`; a purely numeric tag such as `#42` is ordinary text
pub(crate) fn from_hash(token: &str) -> Option<&str> {
    let tag = token.strip_prefix('#')?;
    let valid = !tag.is_empty()
        && tag.chars().all(is_tag_char)
        && !tag.chars().all(|c| c.is_ascii_digit());
    valid.then_some(tag)
}

/// `🏷️tag`, with or without the variation selector
pub(crate) fn from_emoji(token: &str) -> Option<&str> {
    let rest = token.strip_prefix(TAG_ICON_BARE)?;
    let tag = rest.trim_start_matches('\u{FE0F}');
    (!tag.is_empty() && tag.chars().all(is_tag_char)).then_some(tag)
}

/// Comma- or space-separated list from a `[tags:: ...]` field; canonical
/// tags never contain either separator
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|t| t.trim_start_matches('#'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
