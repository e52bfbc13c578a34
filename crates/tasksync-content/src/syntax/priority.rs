//! Priority decorations

use crate::model::Priority;

use super::config::PrioritySyntax;

const VARIATION_SELECTOR: char = '\u{FE0F}';

const EMOJI: [(Priority, &str); 6] = [
    (Priority::Lowest, "⏬"),
    (Priority::Low, "🔽"),
    (Priority::Normal, "🔹"),
    (Priority::Medium, "🔼"),
    (Priority::High, "⏫"),
    (Priority::Highest, "🔺"),
];

pub(crate) fn render(priority: Priority, syntax: PrioritySyntax) -> Option<String> {
    match syntax {
        PrioritySyntax::Hidden => None,
        PrioritySyntax::Symbol => Some("!".repeat(priority.rank())),
        PrioritySyntax::Emoji => EMOJI
            .iter()
            .find(|(p, _)| *p == priority)
            .map(|(_, icon)| icon.to_string()),
        PrioritySyntax::Dataview => Some(format!("[priority:: {}]", priority.name())),
    }
}

/// A standalone priority emoji, with or without a variation selector
pub(crate) fn from_emoji(token: &str) -> Option<Priority> {
    let bare = token.trim_end_matches(VARIATION_SELECTOR);
    EMOJI
        .iter()
        .find(|(_, icon)| *icon == bare)
        .map(|(p, _)| *p)
}

/// A standalone run of one to six `!`
pub(crate) fn from_symbol(token: &str) -> Option<Priority> {
    if token.is_empty() || !token.chars().all(|c| c == '!') {
        return None;
    }
    Priority::from_rank(token.len())
}
