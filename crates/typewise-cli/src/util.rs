use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

/// Where `--summary-json` sends the summary; `-` selects stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonSink {
    Stdout,
    File(PathBuf),
}

impl JsonSink {
    pub const STDOUT_ARG: &'static str = "-";

    #[must_use]
    pub fn from_arg(path: &Path) -> Self {
        if path.as_os_str() == Self::STDOUT_ARG {
            JsonSink::Stdout
        } else {
            JsonSink::File(path.to_owned())
        }
    }

    #[must_use]
    pub fn is_stdout(&self) -> bool {
        matches!(self, JsonSink::Stdout)
    }

    pub fn save<T>(&self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        match self {
            JsonSink::Stdout => write_json(&mut io::stdout().lock(), value, self),
            JsonSink::File(path) => {
                create_parent_dir(path)?;
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                write_json(&mut BufWriter::new(file), value, self)
            }
        }
    }
}

impl fmt::Display for JsonSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonSink::Stdout => f.write_str("stdout"),
            JsonSink::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Writes `value` as pretty JSON followed by a newline, then flushes.
pub fn write_json<W, T>(writer: &mut W, value: &T, target: &JsonSink) -> anyhow::Result<()>
where
    W: Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut *writer, value)
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writeln!(writer).with_context(|| format!("Failed to write JSON to {target}"))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output to {target}"))
}

/// Creates the directory that will hold `path`, if any.
pub fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Writes a text file, creating its directory first.
pub fn write_text_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    create_parent_dir(path)?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
