//! Analysis of the autocorrect typing study
//!
//! This crate turns an exported trial log into the statistical comparisons of
//! typing with autocorrect enabled (AUTO) against disabled (OFF), across easy
//! and hard prompts.
//!
//! # Overview
//!
//! The analysis is a single pipeline:
//!
//! 1. **Load** ([`load::InputPattern`], [`load::read_trials`]): Locate the most
//!    recent trial log and read it into a [`load::TrialLog`] that keeps each
//!    source record next to its parsed [`trial::RawTrial`]
//! 2. **Clean** ([`clean::CleanedTrials`]): Drop incomplete rows and, depending
//!    on the [`clean::CleaningPolicy`], per-cell z-score outliers
//! 3. **Pair** ([`pair::PairedTable`]): Match the k-th AUTO presentation of a
//!    prompt with its k-th OFF presentation
//! 4. **Compare** ([`comparison::Comparison`]): Paired t-tests overall and
//!    within each difficulty
//! 5. **Model** ([`factorial::FactorialModel`]): Condition x difficulty
//!    regression with interaction
//! 6. **Report** ([`report::AnalysisReport`]): Render everything as text
//!
//! # Examples
//!
//! ```
//! use typewise_analysis::{
//!     clean::{CleanedTrials, CleaningPolicy},
//!     load::read_trials_from,
//!     report::AnalysisReport,
//! };
//!
//! let log = "\
//! prompt,prompt_type,condition,ms,wpm,cer,backspaces,repair_ms,trial
//! alpha,EASY,AUTO,4100,44.0,0.01,0,0,1
//! alpha,EASY,OFF,4300,41.5,0.03,2,400,2
//! beta,EASY,AUTO,3900,47.0,0.00,0,0,3
//! beta,EASY,OFF,4200,43.0,0.02,1,250,4
//! ";
//! let log = read_trials_from(log.as_bytes()).unwrap();
//! let cleaned = CleanedTrials::from_log(log, CleaningPolicy::KeepAll);
//! let report = AnalysisReport::new(&cleaned.trials);
//!
//! let wpm = report.overall[0].test.as_ref().unwrap();
//! assert_eq!(wpm.n, 2);
//! assert!((wpm.mean_diff - 3.25).abs() < 1e-12);
//! ```

pub mod clean;
pub mod comparison;
pub mod factorial;
pub mod load;
pub mod pair;
pub mod report;
pub mod trial;
