//! Cleaning of raw trial logs
//!
//! Cleaning always drops rows that lack a key field (condition, difficulty,
//! ms, wpm or cer). On top of that one [`CleaningPolicy`] is applied:
//!
//! - [`CleaningPolicy::KeepAll`]: keep every complete row
//! - [`CleaningPolicy::ZScore`]: within each condition x difficulty cell,
//!   drop rows whose ms, wpm or cer lies more than `threshold` sample
//!   standard deviations from the cell mean
//!
//! Cells with fewer than two rows have no defined standard deviation and are
//! passed through unfiltered.

use std::{collections::BTreeMap, fmt, io, path::Path};

use csv::StringRecord;
use typewise_stats::{descriptive::DescriptiveStats, zscore::outlier_mask};

use crate::{
    load::TrialLog,
    trial::{Condition, Difficulty, TRIAL_COLUMNS, Trial},
};

/// Default |z| cut-off for [`CleaningPolicy::ZScore`].
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Outlier handling applied after dropping incomplete rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CleaningPolicy {
    /// Keep every row with complete key fields.
    #[default]
    KeepAll,
    /// Drop rows with any of ms, wpm, cer beyond `threshold` (strictly) in
    /// absolute z-score within their condition x difficulty cell.
    ZScore { threshold: f64 },
}

impl fmt::Display for CleaningPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleaningPolicy::KeepAll => write!(f, "no outlier removal"),
            CleaningPolicy::ZScore { threshold } => {
                write!(f, "z-score outlier removal (|z| > {threshold})")
            }
        }
    }
}

/// Cleaned trials with the bookkeeping of what was removed.
#[derive(Debug, Clone)]
pub struct CleanedTrials {
    /// Surviving trials in their original order.
    pub trials: Vec<Trial>,
    /// Header of the source log.
    pub headers: StringRecord,
    /// Source record of each surviving trial, index-aligned with `trials`.
    pub records: Vec<StringRecord>,
    pub raw_count: usize,
    pub incomplete_count: usize,
    pub outlier_count: usize,
}

impl CleanedTrials {
    /// Cleans `log` according to `policy`.
    #[must_use]
    pub fn from_log(log: TrialLog, policy: CleaningPolicy) -> Self {
        let raw_count = log.len();
        let (complete, records): (Vec<Trial>, Vec<StringRecord>) = log
            .rows
            .into_iter()
            .filter_map(|row| Trial::from_raw(row.raw).map(|trial| (trial, row.record)))
            .unzip();
        let incomplete_count = raw_count - complete.len();

        let rejected = match policy {
            CleaningPolicy::KeepAll => vec![false; complete.len()],
            CleaningPolicy::ZScore { threshold } => outlier_rows(&complete, threshold),
        };
        let (trials, records): (Vec<Trial>, Vec<StringRecord>) = complete
            .into_iter()
            .zip(records)
            .zip(rejected)
            .filter_map(|(row, rejected)| (!rejected).then_some(row))
            .unzip();
        let outlier_count = raw_count - incomplete_count - trials.len();

        Self {
            trials,
            headers: log.headers,
            records,
            raw_count,
            incomplete_count,
            outlier_count,
        }
    }

    /// Number of trials per difficulty x condition cell.
    #[must_use]
    pub fn cell_counts(&self) -> CellCounts {
        CellCounts::from_trials(&self.trials)
    }

    /// Writes the surviving rows as CSV in the layout of the source log.
    ///
    /// The header is always written, even when no rows survive. Records are
    /// copied unchanged, so extra columns and prompt text round-trip as-is.
    pub fn write_csv<W>(&self, writer: W) -> Result<(), csv::Error>
    where
        W: io::Write,
    {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        if self.headers.is_empty() {
            writer.write_record(TRIAL_COLUMNS)?;
        } else {
            writer.write_record(&self.headers)?;
        }
        for record in &self.records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the cleaned trials to `path`, creating parent directories.
    pub fn save_csv(&self, path: &Path) -> Result<(), csv::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_csv(io::BufWriter::new(file))
    }
}

/// Flags trials with any of ms, wpm, cer beyond `threshold` within their cell.
fn outlier_rows(trials: &[Trial], threshold: f64) -> Vec<bool> {
    let mut groups = BTreeMap::<(Condition, Difficulty), Vec<usize>>::new();
    for (i, trial) in trials.iter().enumerate() {
        groups
            .entry((trial.condition, trial.prompt_type))
            .or_default()
            .push(i);
    }

    let columns: [fn(&Trial) -> f64; 3] = [|t| t.ms, |t| t.wpm, |t| t.cer];
    let mut rejected = vec![false; trials.len()];
    for indices in groups.values() {
        for column in columns {
            let values = indices.iter().map(|&i| column(&trials[i])).collect::<Vec<_>>();
            for (&i, outlier) in indices.iter().zip(outlier_mask(&values, threshold)) {
                rejected[i] |= outlier;
            }
        }
    }
    rejected
}

/// Trial counts and WPM summary per difficulty x condition cell.
#[derive(Debug, Clone, Default)]
pub struct CellCounts {
    pub counts: BTreeMap<(Difficulty, Condition), usize>,
}

impl CellCounts {
    #[must_use]
    pub fn from_trials(trials: &[Trial]) -> Self {
        let mut counts = BTreeMap::new();
        for trial in trials {
            *counts
                .entry((trial.prompt_type, trial.condition))
                .or_insert(0) += 1;
        }
        Self { counts }
    }

    #[must_use]
    pub fn get(&self, difficulty: Difficulty, condition: Condition) -> usize {
        self.counts
            .get(&(difficulty, condition))
            .copied()
            .unwrap_or(0)
    }
}

impl fmt::Display for CellCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}", "condition")?;
        for condition in Condition::ALL {
            write!(f, " {:>6}", condition.as_str())?;
        }
        writeln!(f)?;
        writeln!(f, "prompt_type")?;
        for difficulty in Difficulty::ALL {
            write!(f, "{:<12}", difficulty.as_str())?;
            for condition in Condition::ALL {
                write!(f, " {:>6}", self.get(difficulty, condition))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Mean and sample standard deviation of WPM per cell, for console summaries.
#[must_use]
pub fn wpm_summary(trials: &[Trial]) -> BTreeMap<(Difficulty, Condition), DescriptiveStats> {
    let mut values = BTreeMap::<(Difficulty, Condition), Vec<f64>>::new();
    for trial in trials {
        values
            .entry((trial.prompt_type, trial.condition))
            .or_default()
            .push(trial.wpm);
    }
    values
        .into_iter()
        .filter_map(|(cell, values)| DescriptiveStats::new(values).map(|stats| (cell, stats)))
        .collect()
}
