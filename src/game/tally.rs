use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

use super::shuffle::pick;

/// How a plurality with several candidates sharing the top count is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// A tied top count produces no winner.
    #[default]
    NoResolution,
    /// One of the tied candidates is drawn uniformly.
    Random,
}

/// Counts how many times each candidate appears.
pub fn count<'a, K, I>(choices: I) -> HashMap<K, usize>
where
    K: Eq + Hash + Clone + 'a,
    I: IntoIterator<Item = &'a K>,
{
    let mut counts = HashMap::new();
    for choice in choices {
        *counts.entry(choice.clone()).or_insert(0) += 1;
    }
    counts
}

/// The candidate with the strictly highest count, with ties settled by `tie_break`.
///
/// Returns the winner and its count. Iteration order of the input never
/// influences the outcome.
pub fn plurality<K>(counts: &HashMap<K, usize>, tie_break: TieBreak) -> Option<(K, usize)>
where
    K: Eq + Hash + Clone + Ord,
{
    let max = counts.values().copied().max().filter(|max| *max > 0)?;
    let mut leaders: Vec<&K> = counts
        .iter()
        .filter(|(_, votes)| **votes == max)
        .map(|(candidate, _)| candidate)
        .collect();
    leaders.sort();

    match (leaders.len(), tie_break) {
        (1, _) => Some((leaders[0].clone(), max)),
        (_, TieBreak::NoResolution) => None,
        (_, TieBreak::Random) => pick(&leaders).map(|leader| ((*leader).clone(), max)),
    }
}
