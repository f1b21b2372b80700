//! Trial records exported by the typing-study app
//!
//! Each row of the exported log is one typing attempt: a prompt shown under
//! one experimental condition, with the measured timing, speed and error rate.
//!
//! # Data Structure
//!
//! ```text
//! prompt,prompt_type,condition,ms,wpm,cer,backspaces,repair_ms,trial
//! "the quick brown fox",EASY,AUTO,5123,42.1,0.02,1,350,1
//! "the quick brown fox",EASY,OFF,5540,39.0,0.05,3,910,2
//! ```
//!
//! Two representations are used:
//!
//! - [`RawTrial`]: a row as read from disk. Every field is optional; cells that
//!   are empty or cannot be parsed (including unknown condition or difficulty
//!   labels) are read as missing instead of failing the whole file.
//! - [`Trial`]: a cleaned row whose key fields (condition, difficulty, ms, wpm,
//!   cer) are present.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Experimental condition: autocorrect enabled or disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "AUTO")]
    Auto,
    #[serde(rename = "OFF")]
    Off,
}

impl Condition {
    pub const ALL: [Self; 2] = [Self::Auto, Self::Off];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

/// Prompt difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "EASY")]
    Easy,
    #[serde(rename = "HARD")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 2] = [Self::Easy, Self::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

/// Outcome measure compared between conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Words per minute
    Wpm,
    /// Character error rate
    Cer,
}

impl Metric {
    pub const ALL: [Self; 2] = [Self::Wpm, Self::Cer];

    /// Upper-case label used in report headings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Wpm => "WPM",
            Self::Cer => "CER",
        }
    }

    /// Column name in the trial log.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Wpm => "wpm",
            Self::Cer => "cer",
        }
    }

    #[must_use]
    pub fn value(self, trial: &Trial) -> f64 {
        match self {
            Self::Wpm => trial.wpm,
            Self::Cer => trial.cer,
        }
    }
}

/// Columns of the trial log, in export order.
pub const TRIAL_COLUMNS: [&str; 9] = [
    "prompt",
    "prompt_type",
    "condition",
    "ms",
    "wpm",
    "cer",
    "backspaces",
    "repair_ms",
    "trial",
];

/// Parsed fields of one trial-log row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTrial {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub prompt_type: Option<Difficulty>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub condition: Option<Condition>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub ms: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub wpm: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cer: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub backspaces: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub repair_ms: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub trial: Option<f64>,
}

/// A trial with all key fields present.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub prompt: Option<String>,
    pub prompt_type: Difficulty,
    pub condition: Condition,
    pub ms: f64,
    pub wpm: f64,
    pub cer: f64,
    pub backspaces: Option<f64>,
    pub repair_ms: Option<f64>,
    pub trial: Option<f64>,
}

impl Trial {
    /// Converts a raw row, or returns `None` if any key field is missing.
    ///
    /// `NaN` counts as missing, matching a blank cell.
    #[must_use]
    pub fn from_raw(raw: RawTrial) -> Option<Self> {
        Some(Self {
            prompt: raw.prompt.filter(|p| !p.is_empty()),
            prompt_type: raw.prompt_type?,
            condition: raw.condition?,
            ms: present(raw.ms)?,
            wpm: present(raw.wpm)?,
            cer: present(raw.cer)?,
            backspaces: present(raw.backspaces),
            repair_ms: present(raw.repair_ms),
            trial: present(raw.trial),
        })
    }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}
