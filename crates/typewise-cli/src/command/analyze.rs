//! Analysis command
//!
//! Cleans the most recent trial log, writes the cleaned CSV and the text
//! report of AUTO vs OFF comparisons, and draws the summary figures.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context;
use typewise_analysis::{
    clean::{self, CleanedTrials, CleaningPolicy, DEFAULT_Z_THRESHOLD},
    load::{self, InputPattern},
    report::AnalysisReport,
    trial::Metric,
};

use crate::{
    plot,
    schema::summary::AnalysisSummary,
    util::{self, JsonSink},
};

const DEFAULT_ROOT: &str = ".";
const RAW_DIR: &str = "data/raw";
const CLEAN_CSV: &str = "data/clean/typing_clean.csv";
const RESULTS_TXT: &str = "data/clean/typing_results.txt";
const FIGURE_DIR: &str = "figures";

/// Outlier handling selectable on the command line.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum CleaningMode {
    /// Keep every complete row
    #[default]
    None,
    /// Drop per-cell z-score outliers
    Zscore,
}

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub(crate) struct AnalyzeArg {
    /// Study directory containing `data/raw/`
    #[arg(long, default_value = DEFAULT_ROOT)]
    pub root: PathBuf,
    /// Outlier handling after dropping incomplete rows [none, zscore]
    #[arg(long, default_value = "none")]
    pub cleaning: CleaningMode,
    /// |z| cut-off used by zscore cleaning
    #[arg(long, default_value_t = DEFAULT_Z_THRESHOLD)]
    pub z_threshold: f64,
    /// Read the latest log of this participant only
    #[arg(long)]
    pub participant: Option<String>,
    /// Also write a JSON summary to this path (`-` for stdout)
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

impl Default for AnalyzeArg {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            cleaning: CleaningMode::default(),
            z_threshold: DEFAULT_Z_THRESHOLD,
            participant: None,
            summary_json: None,
        }
    }
}

impl AnalyzeArg {
    pub(crate) fn cleaning_policy(&self) -> CleaningPolicy {
        match self.cleaning {
            CleaningMode::None => CleaningPolicy::KeepAll,
            CleaningMode::Zscore => CleaningPolicy::ZScore {
                threshold: self.z_threshold,
            },
        }
    }

    pub(crate) fn input_pattern(&self) -> InputPattern {
        self.participant
            .as_deref()
            .map_or_else(InputPattern::default, InputPattern::for_participant)
    }

    fn json_sink(&self) -> Option<JsonSink> {
        self.summary_json.as_deref().map(JsonSink::from_arg)
    }
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let root = &arg.root;
    let policy = arg.cleaning_policy();
    let sink = arg.json_sink();

    let input = arg.input_pattern().find_latest(&root.join(RAW_DIR))?;
    eprintln!("Reading {}", input.display());
    let log = load::read_trials(&input)?;

    let cleaned = CleanedTrials::from_log(log, policy);
    eprintln!(
        "Kept {} of {} rows ({} incomplete, {} outliers; {policy})",
        cleaned.trials.len(),
        cleaned.raw_count,
        cleaned.incomplete_count,
        cleaned.outlier_count,
    );

    let clean_path = root.join(CLEAN_CSV);
    cleaned
        .save_csv(&clean_path)
        .with_context(|| format!("Failed to write cleaned data: {}", clean_path.display()))?;
    eprintln!("[ok] Cleaned data saved -> {}", clean_path.display());

    let report = AnalysisReport::new(&cleaned.trials);
    let results_path = root.join(RESULTS_TXT);
    let text = report.to_string();
    util::write_text_file(&results_path, &text)?;

    // Stdout is reserved for the JSON document when it is requested there
    let tables = format!("{}{text}", cell_tables(&cleaned));
    if sink.as_ref().is_some_and(JsonSink::is_stdout) {
        eprintln!("{tables}");
    } else {
        println!("{tables}");
    }
    eprintln!("\n[ok] Statistical results saved -> {}", results_path.display());

    let figure_dir = root.join(FIGURE_DIR);
    draw_figures(&figure_dir, &cleaned)?;
    eprintln!("[ok] Figures saved -> {}", figure_dir.display());

    if let Some(sink) = &sink {
        let summary = AnalysisSummary::new(&input, policy, &cleaned, &report);
        sink.save(&summary)?;
        eprintln!("[ok] Summary saved -> {sink}");
    }

    eprintln!("[ok] Results written to -> {}", results_path.display());
    Ok(())
}

fn cell_tables(cleaned: &CleanedTrials) -> String {
    let mut out = format!(
        "\nCounts per cell (after cleaning):\n{}\nWPM per cell (after cleaning):\n",
        cleaned.cell_counts()
    );
    for ((difficulty, condition), stats) in clean::wpm_summary(&cleaned.trials) {
        let _ = writeln!(
            out,
            "  {difficulty:<4} {condition:<4}  mean={:.3}, sd={:.3}, median={:.3}, range=[{:.3}, {:.3}]",
            stats.mean, stats.std_dev, stats.median, stats.min, stats.max
        );
    }
    out
}

fn draw_figures(dir: &Path, cleaned: &CleanedTrials) -> anyhow::Result<()> {
    let trials = &cleaned.trials;
    let figures = [
        ("wpm_box.png", Metric::Wpm, "WPM by Difficulty × Condition"),
        (
            "cer_box.png",
            Metric::Cer,
            "CER by Difficulty × Condition (lower is better)",
        ),
    ];
    for (file_name, metric, caption) in figures {
        let path = dir.join(file_name);
        plot::cell_boxplot(&path, trials, metric, caption)
            .with_context(|| format!("Failed to draw {}", path.display()))?;
    }

    let path = dir.join("wpm_bar.png");
    plot::cell_mean_bars(&path, trials, Metric::Wpm)
        .with_context(|| format!("Failed to draw {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const HEADER: &str = "prompt,prompt_type,condition,ms,wpm,cer,backspaces,repair_ms,trial\n";

    fn write_log(root: &Path, name: &str, rows: &[String]) {
        let dir = root.join(RAW_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), format!("{HEADER}{}", rows.join("\n"))).unwrap();
    }

    fn study_rows() -> Vec<String> {
        let mut rows = Vec::new();
        let mut trial = 0;
        for (difficulty, base) in [("EASY", 45.0), ("HARD", 32.0)] {
            for i in 0..6 {
                let jitter = f64::from(i) * 0.7;
                for (condition, offset) in [("AUTO", 3.0), ("OFF", 0.0)] {
                    trial += 1;
                    let wpm = base + offset + jitter + f64::from(trial % 3) * 0.2;
                    rows.push(format!(
                        "prompt {difficulty} {i},{difficulty},{condition},{},{wpm},0.0{},1,200,{trial}",
                        5000 + trial * 10,
                        i + 1
                    ));
                }
            }
        }
        rows
    }

    #[test]
    fn test_cleaning_policy_from_args() {
        assert_eq!(AnalyzeArg::default().cleaning_policy(), CleaningPolicy::KeepAll);
        let arg = AnalyzeArg {
            cleaning: CleaningMode::Zscore,
            z_threshold: 2.0,
            ..AnalyzeArg::default()
        };
        assert_eq!(
            arg.cleaning_policy(),
            CleaningPolicy::ZScore { threshold: 2.0 }
        );
    }

    #[test]
    fn test_run_fails_without_input() {
        let dir = tempfile::tempdir().unwrap();
        let arg = AnalyzeArg {
            root: dir.path().to_owned(),
            ..AnalyzeArg::default()
        };
        let err = run(&arg).unwrap_err();
        assert!(err.to_string().contains("typing_study_trials_*.csv"));
    }

    #[test]
    fn test_run_writes_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_log(root, "typing_study_trials_2024-01-01.csv", &["broken".to_owned()]);
        write_log(root, "typing_study_trials_2025-06-30.csv", &study_rows());

        let summary_path = root.join("out").join("summary.json");
        let arg = AnalyzeArg {
            root: root.to_owned(),
            cleaning: CleaningMode::Zscore,
            summary_json: Some(summary_path.clone()),
            ..AnalyzeArg::default()
        };
        run(&arg).unwrap();

        let cleaned = fs::read_to_string(root.join(CLEAN_CSV)).unwrap();
        assert_eq!(cleaned.lines().count(), 25);

        let results = fs::read_to_string(root.join(RESULTS_TXT)).unwrap();
        assert!(results.starts_with("\n== WPM (AUTO - OFF) overall ==\nn=12, "));
        assert!(results.contains("== CER HARD (AUTO - OFF) =="));
        assert!(results.contains("=== OLS 2×2 (cer) ==="));

        for figure in ["wpm_box.png", "cer_box.png", "wpm_bar.png"] {
            assert!(root.join(FIGURE_DIR).join(figure).is_file(), "{figure}");
        }

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(summary_path).unwrap()).unwrap();
        assert_eq!(summary["rows"]["kept"], 24);
        assert_eq!(summary["comparisons"].as_array().unwrap().len(), 6);
        assert_eq!(summary["comparisons"][0]["test"]["n"], 12);
        assert_eq!(summary["cells"][0]["prompt_type"], "EASY");
        assert!(summary["models"][0]["note"].is_null());
        assert_eq!(summary["models"][0]["fit"]["rank"], 4);
    }

    #[test]
    fn test_participant_selects_their_latest_log() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_log(root, "typing_study_trials_Tiffany_2025-01-02.csv", &study_rows());
        write_log(root, "typing_study_trials_Zoe_2025-03-04.csv", &["broken".to_owned()]);

        let arg = AnalyzeArg {
            root: root.to_owned(),
            participant: Some("Tiffany".to_owned()),
            ..AnalyzeArg::default()
        };
        let latest = arg.input_pattern().find_latest(&root.join(RAW_DIR)).unwrap();
        assert!(latest.ends_with("typing_study_trials_Tiffany_2025-01-02.csv"));
        run(&arg).unwrap();
        let cleaned = fs::read_to_string(root.join(CLEAN_CSV)).unwrap();
        assert_eq!(cleaned.lines().count(), 25);

        let arg = AnalyzeArg {
            participant: Some("Nobody".to_owned()),
            ..arg
        };
        let err = run(&arg).unwrap_err();
        assert!(err.to_string().contains("typing_study_trials_Nobody*.csv"));
    }

    #[test]
    fn test_summary_json_dash_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_log(root, "typing_study_trials_2025-06-30.csv", &study_rows());

        let arg = AnalyzeArg {
            root: root.to_owned(),
            summary_json: Some(PathBuf::from("-")),
            ..AnalyzeArg::default()
        };
        assert_eq!(arg.json_sink(), Some(JsonSink::Stdout));
        run(&arg).unwrap();
        assert!(!root.join("-").exists());
        assert!(root.join(RESULTS_TXT).is_file());
    }

    #[test]
    fn test_cell_tables_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, format!("{HEADER}{}", study_rows().join("\n"))).unwrap();
        let log = load::read_trials(&path).unwrap();
        let cleaned = CleanedTrials::from_log(log, CleaningPolicy::KeepAll);
        let tables = cell_tables(&cleaned);
        assert!(tables.starts_with("\nCounts per cell (after cleaning):\n"));
        assert!(tables.contains("WPM per cell (after cleaning):\n  EASY AUTO  mean="));
        assert_eq!(tables.matches("range=[").count(), 4);
    }
}
