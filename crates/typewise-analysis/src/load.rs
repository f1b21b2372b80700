//! Locating and reading trial logs
//!
//! The typing-study app exports one CSV per run into a raw-data directory,
//! using a file name that starts with a fixed prefix and ends with a run
//! identifier (a timestamp), e.g. `typing_study_trials_2025-03-14T10-22-05.csv`.
//! Because the identifier sorts chronologically, the most recent run is the
//! lexicographically-last matching file name.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use csv::StringRecord;

use crate::trial::RawTrial;

/// File-name prefix of exported trial logs.
pub const INPUT_PREFIX: &str = "typing_study_trials_";
/// File-name extension of exported trial logs.
pub const INPUT_EXTENSION: &str = "csv";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("No raw CSV matching '{pattern}' found in {}. Export from the typing app first.", dir.display())]
    NoInputFile { dir: PathBuf, pattern: String },
    #[display("Failed to list {}: {source}", dir.display())]
    ReadDir { dir: PathBuf, source: io::Error },
    #[display("Failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("Failed to parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: csv::Error },
}

/// Naming convention for trial-log files: `<prefix>*.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPattern {
    pub prefix: String,
    pub extension: String,
}

impl Default for InputPattern {
    fn default() -> Self {
        Self {
            prefix: INPUT_PREFIX.to_owned(),
            extension: INPUT_EXTENSION.to_owned(),
        }
    }
}

impl InputPattern {
    /// Pattern restricted to one participant's runs, e.g.
    /// `typing_study_trials_<participant>*.csv`.
    #[must_use]
    pub fn for_participant(participant: &str) -> Self {
        Self {
            prefix: format!("{INPUT_PREFIX}{participant}"),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.prefix)
            && Path::new(file_name)
                .extension()
                .is_some_and(|ext| ext == self.extension.as_str())
    }

    #[must_use]
    pub fn glob(&self) -> String {
        format!("{}*.{}", self.prefix, self.extension)
    }

    /// Returns the lexicographically-last matching file in `dir`.
    ///
    /// A missing directory is reported the same way as an empty one.
    pub fn find_latest(&self, dir: &Path) -> Result<PathBuf, LoadError> {
        let no_input = || LoadError::NoInputFile {
            dir: dir.to_owned(),
            pattern: self.glob(),
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(no_input()),
            Err(source) => {
                return Err(LoadError::ReadDir {
                    dir: dir.to_owned(),
                    source,
                });
            }
        };

        let mut latest: Option<String> = None;
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::ReadDir {
                dir: dir.to_owned(),
                source,
            })?;
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if self.matches(&name) && latest.as_ref().is_none_or(|current| name > *current) {
                latest = Some(name);
            }
        }

        latest.map(|name| dir.join(name)).ok_or_else(no_input)
    }
}

/// One data row of a trial log: the record as written on disk and its parsed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub raw: RawTrial,
    pub record: StringRecord,
}

/// A trial log as read from disk.
///
/// The header and records are kept verbatim so that cleaned output can
/// reproduce the input layout, including columns the analysis does not use.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialLog {
    pub headers: StringRecord,
    pub rows: Vec<LogRow>,
}

impl TrialLog {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads every row of a trial log.
///
/// Only malformed CSV structure is an error; unparsable cells become missing values.
pub fn read_trials(path: &Path) -> Result<TrialLog, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_owned(),
        source,
    })?;
    read_trials_from(file).map_err(|source| LoadError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Reads trial rows from any CSV source with a header row.
///
/// Surrounding whitespace is ignored when parsing labels and numbers, but
/// `prompt` text is taken exactly as written since it identifies the prompt
/// when pairing.
pub fn read_trials_from<R>(reader: R) -> Result<TrialLog, csv::Error>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let mut lookup = headers.clone();
    lookup.trim();
    let prompt_column = lookup.iter().position(|name| name == "prompt");

    let rows = reader
        .records()
        .map(|record| {
            let record = record?;
            let mut trimmed = record.clone();
            trimmed.trim();
            let mut raw = trimmed.deserialize::<RawTrial>(Some(&lookup))?;
            raw.prompt = prompt_column
                .and_then(|i| record.get(i))
                .filter(|prompt| !prompt.is_empty())
                .map(str::to_owned);
            Ok(LogRow { raw, record })
        })
        .collect::<Result<Vec<_>, csv::Error>>()?;

    Ok(TrialLog { headers, rows })
}
