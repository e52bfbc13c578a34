//! Recovering stable task ids from document text
//!
//! Each task line is keyed by its normalized text. A pass resolves every
//! line of a document against the identity table in three phases: exact key
//! matches first, then fuzzy matches in document order against entries not
//! yet claimed, then freshly minted ids. An entry is claimed by at most one
//! line per pass.

use std::collections::{BTreeMap, HashSet};

use tasksync_content::normalize;
use tasksync_content::similarity::{ratio, within_length_tolerance};
use uuid::Uuid;

use crate::config::MatchThresholds;

const OCCURRENCE_SEPARATOR: char = '#';

/// Identity key of one line, including its occurrence among lines with the
/// same normalized text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineKey {
    pub base: String,
    /// 1 for the first line with this text, 2 for the second, ...
    pub occurrence: usize,
}

impl LineKey {
    /// Table key: the base for the first occurrence, `base#n` after that
    pub fn key(&self) -> String {
        if self.occurrence <= 1 {
            self.base.clone()
        } else {
            format!("{}{OCCURRENCE_SEPARATOR}{}", self.base, self.occurrence)
        }
    }
}

/// Normalized text of a table key, without its occurrence suffix
pub fn base_key(key: &str) -> &str {
    match key.rsplit_once(OCCURRENCE_SEPARATOR) {
        Some((base, n)) if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) => base,
        _ => key,
    }
}

/// Key every text in order, numbering repeats
pub fn line_keys<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<LineKey> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    texts
        .into_iter()
        .map(|text| {
            let base = normalize(text);
            let count = seen.entry(base.clone()).or_default();
            *count += 1;
            LineKey {
                base,
                occurrence: *count,
            }
        })
        .collect()
}

/// How one line got its id
#[derive(Debug, Clone, PartialEq)]
pub enum MatchKind {
    Exact,
    /// Matched the entry stored under `previous_key`
    Fuzzy { previous_key: String, ratio: f64 },
    Minted,
}

/// Identity of one document line
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub id: String,
    pub key: LineKey,
    pub kind: MatchKind,
}

/// Result of resolving one document
#[derive(Debug, Clone, Default)]
pub struct IdentityPass {
    /// One resolution per input line, in input order
    pub resolutions: Vec<Resolution>,
    /// Entries no line claimed: `(key, id)`
    pub unclaimed: Vec<(String, String)>,
}

impl IdentityPass {
    /// Table after the pass: claimed lines under their current keys, plus
    /// the unclaimed entries unless they are being pruned
    pub fn table(&self, keep_unclaimed: bool) -> BTreeMap<String, String> {
        let mut table = BTreeMap::new();
        if keep_unclaimed {
            table.extend(self.unclaimed.iter().cloned());
        }
        for resolution in &self.resolutions {
            table.insert(resolution.key.key(), resolution.id.clone());
        }
        table
    }

    pub fn minted(&self) -> impl Iterator<Item = &Resolution> {
        self.resolutions
            .iter()
            .filter(|r| r.kind == MatchKind::Minted)
    }
}

/// Resolves document lines to task ids
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver {
    thresholds: MatchThresholds,
}

impl IdentityResolver {
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self { thresholds }
    }

    /// Resolve `texts` (one per task line, in document order) against `table`
    pub fn resolve<'a>(
        &self,
        texts: impl IntoIterator<Item = &'a str>,
        table: &BTreeMap<String, String>,
    ) -> IdentityPass {
        let keys = line_keys(texts);
        let mut claimed_keys: HashSet<&str> = HashSet::new();
        let mut claimed_ids: HashSet<&str> = HashSet::new();
        let mut found: Vec<Option<(String, MatchKind)>> = vec![None; keys.len()];

        for (slot, key) in found.iter_mut().zip(&keys) {
            let key = key.key();
            if let Some((stored_key, id)) = table.get_key_value(&key)
                && !claimed_ids.contains(id.as_str())
            {
                claimed_keys.insert(stored_key.as_str());
                claimed_ids.insert(id.as_str());
                *slot = Some((id.clone(), MatchKind::Exact));
            }
        }

        for (slot, key) in found.iter_mut().zip(&keys) {
            if slot.is_some() {
                continue;
            }
            let best = self.best_fuzzy(&key.base, table, &claimed_keys, &claimed_ids);
            if let Some((stored_key, id, score)) = best {
                tracing::debug!(
                    from = stored_key,
                    to = %key.key(),
                    ratio = score,
                    "fuzzy identity match"
                );
                claimed_keys.insert(stored_key);
                claimed_ids.insert(id);
                *slot = Some((
                    id.to_string(),
                    MatchKind::Fuzzy {
                        previous_key: stored_key.to_string(),
                        ratio: score,
                    },
                ));
            }
        }

        let resolutions = keys
            .into_iter()
            .zip(found)
            .map(|(key, slot)| {
                let (id, kind) = slot.unwrap_or_else(|| {
                    let id = Uuid::new_v4().to_string();
                    tracing::debug!(key = %key.key(), %id, "minted identity");
                    (id, MatchKind::Minted)
                });
                Resolution { id, key, kind }
            })
            .collect();

        let unclaimed = table
            .iter()
            .filter(|(key, id)| {
                !claimed_keys.contains(key.as_str()) && !claimed_ids.contains(id.as_str())
            })
            .map(|(key, id)| (key.clone(), id.clone()))
            .collect();

        IdentityPass {
            resolutions,
            unclaimed,
        }
    }

    /// Best unclaimed entry for `query`.
    ///
    /// The first entry at or above the accept ratio wins outright; otherwise
    /// the highest ratio at or above the minimum wins, earliest on ties.
    fn best_fuzzy<'t>(
        &self,
        query: &str,
        table: &'t BTreeMap<String, String>,
        claimed_keys: &HashSet<&str>,
        claimed_ids: &HashSet<&str>,
    ) -> Option<(&'t str, &'t str, f64)> {
        let MatchThresholds {
            accept_ratio,
            min_ratio,
            length_tolerance,
        } = self.thresholds;
        let mut best: Option<(&str, &str, f64)> = None;

        for (key, id) in table {
            if claimed_keys.contains(key.as_str()) || claimed_ids.contains(id.as_str()) {
                continue;
            }
            let candidate = base_key(key);
            if !within_length_tolerance(query, candidate, length_tolerance) {
                continue;
            }

            let score = ratio(query, candidate);
            if score >= accept_ratio {
                return Some((key, id, score));
            }
            if score >= min_ratio && best.is_none_or(|(_, _, b)| score > b) {
                best = Some((key, id, score));
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn occurrence_keys_number_repeats() {
        let keys: Vec<_> = line_keys(["Buy milk", "call mom", "buy MILK!", "Buy milk"])
            .iter()
            .map(LineKey::key)
            .collect();
        assert_eq!(keys, ["buy milk", "call mom", "buy milk#2", "buy milk#3"]);
        assert_eq!(base_key("buy milk#3"), "buy milk");
        assert_eq!(base_key("buy milk"), "buy milk");
    }

    #[test]
    fn exact_match_survives_punctuation_edits() {
        let pass = IdentityResolver::default().resolve(
            ["Fix the bug!"],
            &table(&[("fix the bug", "id-1")]),
        );
        assert_eq!(pass.resolutions[0].id, "id-1");
        assert_eq!(pass.resolutions[0].kind, MatchKind::Exact);
        assert!(pass.unclaimed.is_empty());
    }

    #[test]
    fn small_text_edit_is_a_fuzzy_match_and_rekeys() {
        let pass = IdentityResolver::default().resolve(
            ["Fix the bugs"],
            &table(&[("fix the bug", "id-1")]),
        );
        let resolution = &pass.resolutions[0];
        assert_eq!(resolution.id, "id-1");
        assert!(matches!(resolution.kind, MatchKind::Fuzzy { .. }));
        assert_eq!(
            pass.table(false),
            table(&[("fix the bugs", "id-1")])
        );
    }

    #[test]
    fn unrelated_text_mints_and_leaves_entry_unclaimed() {
        let pass = IdentityResolver::default().resolve(
            ["Water the plants"],
            &table(&[("fix the bug", "id-1")]),
        );
        assert_eq!(pass.resolutions[0].kind, MatchKind::Minted);
        assert_ne!(pass.resolutions[0].id, "id-1");
        assert_eq!(pass.unclaimed, [("fix the bug".to_string(), "id-1".to_string())]);
        assert_eq!(pass.table(true).len(), 2);
        assert_eq!(pass.table(false).len(), 1);
    }

    #[test]
    fn exact_matches_are_taken_before_fuzzy_ones() {
        // "fix the bugs" would fuzzily claim "fix the bug" if it ran first
        let pass = IdentityResolver::default().resolve(
            ["Fix the bugs", "Fix the bug"],
            &table(&[("fix the bug", "id-1")]),
        );
        assert_eq!(pass.resolutions[1].id, "id-1");
        assert_eq!(pass.resolutions[0].kind, MatchKind::Minted);
    }

    #[test]
    fn one_entry_is_claimed_at_most_once() {
        let pass = IdentityResolver::default().resolve(
            ["Fix the bugs", "Fix the bugz"],
            &table(&[("fix the bug", "id-1")]),
        );
        let ids: Vec<_> = pass.resolutions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids[0], "id-1");
        assert_ne!(ids[1], "id-1");
    }

    #[test]
    fn duplicate_lines_keep_distinct_stable_ids() {
        let stored = table(&[("buy milk", "id-1"), ("buy milk#2", "id-2")]);
        let pass = IdentityResolver::default().resolve(["Buy milk", "Buy milk"], &stored);
        let ids: Vec<_> = pass.resolutions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["id-1", "id-2"]);
        assert_eq!(pass.table(false), stored);
    }

    #[test]
    fn length_tolerance_skips_distant_candidates() {
        let thresholds = MatchThresholds {
            accept_ratio: 0.5,
            min_ratio: 0.5,
            length_tolerance: 0.1,
        };
        let pass = IdentityResolver::new(thresholds).resolve(
            ["write the report"],
            &table(&[("write the report for q3 planning", "id-1")]),
        );
        assert_eq!(pass.resolutions[0].kind, MatchKind::Minted);
    }

    #[test]
    fn accept_ratio_short_circuits_in_table_order() {
        let thresholds = MatchThresholds {
            accept_ratio: 0.8,
            min_ratio: 0.5,
            length_tolerance: 1.0,
        };
        let pass = IdentityResolver::new(thresholds).resolve(
            ["abcdefghij"],
            &table(&[("abcdefahij", "first"), ("abcdefghijk", "second")]),
        );
        assert_eq!(pass.resolutions[0].id, "first");
    }
}
