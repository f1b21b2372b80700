//! Reshaping trials into AUTO/OFF pairs
//!
//! Each prompt may be presented several times under each condition. The
//! `k`-th presentation of a prompt under AUTO is matched with the `k`-th
//! presentation of the same prompt (and difficulty) under OFF. The running
//! presentation count is the *occurrence index*, assigned in input order.
//!
//! Only keys present under both conditions form a pair. Trials without a
//! prompt cannot be matched and are skipped.

use std::collections::{BTreeMap, HashMap};

use crate::trial::{Condition, Difficulty, Metric, Trial};

/// Identity of a matched observation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub prompt: String,
    pub difficulty: Difficulty,
    pub occurrence: usize,
}

/// One metric observed under both conditions for the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: PairKey,
    pub auto: f64,
    pub off: f64,
}

/// Wide-format table of pairs for a single metric, ordered by key.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedTable {
    metric: Metric,
    pairs: Vec<Pair>,
}

/// Occurrence index of each trial, aligned with `trials`.
///
/// Trials without a prompt get `None`.
#[must_use]
pub fn occurrences(trials: &[Trial]) -> Vec<Option<usize>> {
    let mut seen = HashMap::<(&str, Difficulty, Condition), usize>::new();
    trials
        .iter()
        .map(|trial| {
            let prompt = trial.prompt.as_deref()?;
            let count = seen
                .entry((prompt, trial.prompt_type, trial.condition))
                .or_insert(0);
            let occurrence = *count;
            *count += 1;
            Some(occurrence)
        })
        .collect()
}

impl PairedTable {
    /// Builds the table of `metric` values matched by (prompt, difficulty, occurrence).
    ///
    /// Keys are unique per condition by construction; if duplicates ever
    /// occurred, the first value would be kept.
    #[must_use]
    pub fn build(trials: &[Trial], metric: Metric) -> Self {
        let mut cells = BTreeMap::<PairKey, (Option<f64>, Option<f64>)>::new();
        for (trial, occurrence) in trials.iter().zip(occurrences(trials)) {
            let (Some(prompt), Some(occurrence)) = (&trial.prompt, occurrence) else {
                continue;
            };
            let key = PairKey {
                prompt: prompt.clone(),
                difficulty: trial.prompt_type,
                occurrence,
            };
            let (auto, off) = cells.entry(key).or_default();
            let slot = match trial.condition {
                Condition::Auto => auto,
                Condition::Off => off,
            };
            slot.get_or_insert(metric.value(trial));
        }

        let pairs = cells
            .into_iter()
            .filter_map(|(key, values)| match values {
                (Some(auto), Some(off)) => Some(Pair { key, auto, off }),
                _ => None,
            })
            .collect();
        Self { metric, pairs }
    }

    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    #[must_use]
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `(auto, off)` values, optionally restricted to one difficulty.
    pub fn values(&self, difficulty: Option<Difficulty>) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.pairs
            .iter()
            .filter(move |pair| difficulty.is_none_or(|d| pair.key.difficulty == d))
            .map(|pair| (pair.auto, pair.off))
    }
}
