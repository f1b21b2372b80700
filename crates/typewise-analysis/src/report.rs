//! Full AUTO vs OFF analysis and its text report

use std::fmt;

use crate::{
    comparison::{Comparison, Scope},
    factorial::FactorialModel,
    pair::PairedTable,
    trial::{Difficulty, Metric, Trial},
};

/// Every comparison and model computed from one cleaned dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Overall comparisons per metric.
    pub overall: Vec<Comparison>,
    /// Per-difficulty comparisons, grouped by metric then difficulty.
    pub within: Vec<Comparison>,
    /// Factorial models per metric.
    pub models: Vec<FactorialModel>,
}

impl AnalysisReport {
    #[must_use]
    pub fn new(trials: &[Trial]) -> Self {
        let tables = Metric::ALL.map(|metric| PairedTable::build(trials, metric));

        let overall = tables
            .iter()
            .map(|table| Comparison::new(table, Scope::Overall))
            .collect();
        let within = tables
            .iter()
            .flat_map(|table| {
                Difficulty::ALL.map(|difficulty| Comparison::new(table, Scope::Within(difficulty)))
            })
            .collect();
        let models = tables.iter().map(FactorialModel::fit).collect();

        Self {
            overall,
            within,
            models,
        }
    }

    /// Report sections in output order.
    #[must_use]
    pub fn blocks(&self) -> Vec<String> {
        let mut blocks = self
            .overall
            .iter()
            .chain(&self.within)
            .map(|comparison| format!("\n{comparison}"))
            .collect::<Vec<_>>();
        for model in &self.models {
            blocks.push(format!(
                "\n=== OLS 2×2 ({}) ===\n{}",
                model.metric.column(),
                model.summary()
            ));
            blocks.push(format!("\nCell means:\n{}", model.means_table()));
        }
        blocks
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.blocks().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::Condition;

    fn trial(prompt: &str, difficulty: Difficulty, condition: Condition, wpm: f64, cer: f64) -> Trial {
        Trial {
            prompt: Some(prompt.to_owned()),
            prompt_type: difficulty,
            condition,
            ms: 1000.0,
            wpm,
            cer,
            backspaces: None,
            repair_ms: None,
            trial: None,
        }
    }

    #[test]
    fn test_block_order() {
        let mut trials = Vec::new();
        for (i, difficulty) in [Difficulty::Easy, Difficulty::Easy, Difficulty::Easy, Difficulty::Hard]
            .into_iter()
            .enumerate()
        {
            let prompt = format!("p{i}");
            let i = f64::from(u8::try_from(i).unwrap());
            trials.push(trial(&prompt, difficulty, Condition::Auto, 40.0 + i * i, 0.01 * i));
            trials.push(trial(&prompt, difficulty, Condition::Off, 38.0 + i, 0.02));
        }

        let report = AnalysisReport::new(&trials);
        let blocks = report.blocks();
        assert_eq!(blocks.len(), 10);
        let headings = blocks
            .iter()
            .map(|b| b.lines().nth(1).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            headings,
            vec![
                "== WPM (AUTO - OFF) overall ==",
                "== CER (AUTO - OFF) overall ==",
                "== WPM EASY (AUTO - OFF) ==",
                "== WPM HARD: insufficient pairs ==",
                "== CER EASY (AUTO - OFF) ==",
                "== CER HARD: insufficient pairs ==",
                "=== OLS 2×2 (wpm) ===",
                "Cell means:",
                "=== OLS 2×2 (cer) ===",
                "Cell means:",
            ]
        );
        assert!(blocks.iter().all(|b| b.starts_with('\n')));

        let text = report.to_string();
        assert!(text.starts_with("\n== WPM (AUTO - OFF) overall =="));
        assert!(text.contains("\n\n== CER HARD: insufficient pairs ==\n\n=== OLS 2×2 (wpm) ===\n"));
    }

    #[test]
    fn test_empty_dataset() {
        let report = AnalysisReport::new(&[]);
        assert!(report.overall.iter().all(|c| c.test.is_none()));
        assert!(report.models.iter().all(|m| m.fit.is_err()));
        assert!(report.to_string().contains("== CER: insufficient pairs =="));
    }
}
