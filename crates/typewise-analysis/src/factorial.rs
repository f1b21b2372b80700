//! Condition x difficulty factorial model
//!
//! The paired table is melted back into long form (one row per pair and
//! condition) and regressed on dummy codes:
//!
//! ```text
//! metric ~ cond_coded + hard_coded + interaction
//! cond_coded  = 1 if condition == AUTO
//! hard_coded  = 1 if prompt_type == HARD
//! interaction = cond_coded * hard_coded
//! ```
//!
//! Only matched observations enter the model, so both conditions contribute
//! the same rows per difficulty.

use std::{collections::BTreeMap, fmt};

use typewise_stats::regression::{OlsError, OlsFit};

use crate::{
    pair::PairedTable,
    trial::{Condition, Difficulty, Metric},
};

/// Regressor names, in design-column order.
pub const REGRESSORS: [&str; 3] = ["cond_coded", "hard_coded", "interaction"];

const RULE_WIDTH: usize = 78;

/// Fitted (or unfittable) 2x2 model with the per-cell means of its data.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorialModel {
    pub metric: Metric,
    pub fit: Result<OlsFit, OlsError>,
    pub cell_means: BTreeMap<(Difficulty, Condition), f64>,
}

impl FactorialModel {
    #[must_use]
    pub fn fit(table: &PairedTable) -> Self {
        let mut rows = Vec::with_capacity(table.len() * 2);
        let mut y = Vec::with_capacity(table.len() * 2);
        let mut cells = BTreeMap::<(Difficulty, Condition), (f64, usize)>::new();

        for pair in table.pairs() {
            let difficulty = pair.key.difficulty;
            for (condition, value) in [(Condition::Auto, pair.auto), (Condition::Off, pair.off)] {
                let cond_coded = indicator(condition == Condition::Auto);
                let hard_coded = indicator(difficulty == Difficulty::Hard);
                rows.push([cond_coded, hard_coded, cond_coded * hard_coded]);
                y.push(value);

                let (sum, count) = cells.entry((difficulty, condition)).or_default();
                *sum += value;
                *count += 1;
            }
        }

        #[expect(clippy::cast_precision_loss)]
        let cell_means = cells
            .into_iter()
            .map(|(cell, (sum, count))| (cell, sum / count as f64))
            .collect();

        Self {
            metric: table.metric(),
            fit: OlsFit::fit(&REGRESSORS, &rows, &y),
            cell_means,
        }
    }

    /// Mean of the long-form data in one cell, if the cell has any pairs.
    #[must_use]
    pub fn cell_mean(&self, difficulty: Difficulty, condition: Condition) -> Option<f64> {
        self.cell_means.get(&(difficulty, condition)).copied()
    }

    /// Displays the model summary table, or a note when it could not be fitted.
    #[must_use]
    pub fn summary(&self) -> Summary<'_> {
        Summary(self)
    }

    /// Displays the cell-means table (values rounded to 3 decimals).
    #[must_use]
    pub fn means_table(&self) -> MeansTable<'_> {
        MeansTable(self)
    }
}

fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

pub struct Summary<'a>(&'a FactorialModel);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.0;
        let fit = match &model.fit {
            Ok(fit) => fit,
            Err(err) => return write!(f, "Model not estimable: {err}"),
        };
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{:^RULE_WIDTH$}", "OLS Regression Results")?;
        writeln!(f, "{heavy}")?;
        let left = [
            ("Dep. Variable:", model.metric.column().to_owned()),
            ("Model:", "OLS".to_owned()),
            ("Method:", "Least Squares".to_owned()),
            ("No. Observations:", fit.n_obs.to_string()),
            ("Df Residuals:", fit.df_resid.to_string()),
            ("Df Model:", fit.df_model.to_string()),
            ("", String::new()),
        ];
        let right = [
            ("R-squared:", format!("{:.3}", fit.r_squared)),
            ("Adj. R-squared:", format!("{:.3}", fit.adj_r_squared)),
            ("F-statistic:", format!("{:.3}", fit.f_statistic)),
            ("Prob (F-statistic):", format!("{:.4}", fit.f_p_value)),
            ("Log-Likelihood:", format!("{:.3}", fit.log_likelihood)),
            ("AIC:", format!("{:.3}", fit.aic)),
            ("BIC:", format!("{:.3}", fit.bic)),
        ];
        for ((lk, lv), (rk, rv)) in left.iter().zip(&right) {
            writeln!(f, "{lk:<20}{lv:>19} {rk:<22}{rv:>16}")?;
        }
        writeln!(f, "{heavy}")?;
        writeln!(
            f,
            "{:<14}{:>10}{:>11}{:>11}{:>11}{:>11}{:>10}",
            "", "coef", "std err", "t", "P>|t|", "[0.025", "0.975]"
        )?;
        writeln!(f, "{light}")?;
        for coef in &fit.coefficients {
            writeln!(
                f,
                "{:<14}{:>10.4}{:>11.3}{:>11.3}{:>11.3}{:>11.3}{:>10.3}",
                coef.name, coef.estimate, coef.std_err, coef.t, coef.p, coef.ci.0, coef.ci.1
            )?;
        }
        write!(f, "{heavy}")?;
        if fit.is_rank_deficient() {
            write!(
                f,
                "\n\nNotes:\n[1] The design matrix is rank deficient (rank {} of {} columns); \
                 aliased coefficients are minimum-norm estimates.",
                fit.rank,
                fit.coefficients.len()
            )?;
        }
        Ok(())
    }
}

pub struct MeansTable<'a>(&'a FactorialModel);

impl fmt::Display for MeansTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.0;
        write!(f, "{:<12}", "condition")?;
        for condition in Condition::ALL {
            write!(f, " {:>8}", condition.as_str())?;
        }
        writeln!(f)?;
        write!(f, "prompt_type")?;
        for difficulty in Difficulty::ALL {
            write!(f, "\n{:<12}", difficulty.as_str())?;
            for condition in Condition::ALL {
                match model.cell_mean(difficulty, condition) {
                    Some(mean) => write!(f, " {mean:>8.3}")?,
                    None => write!(f, " {:>8}", "NaN")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::Trial;

    fn trial(prompt: &str, difficulty: Difficulty, condition: Condition, wpm: f64) -> Trial {
        Trial {
            prompt: Some(prompt.to_owned()),
            prompt_type: difficulty,
            condition,
            ms: 1000.0,
            wpm,
            cer: 0.0,
            backspaces: None,
            repair_ms: None,
            trial: None,
        }
    }

    /// Noise-free 2x2 data: 40 + 5 auto - 10 hard + 2 auto*hard, with a
    /// symmetric per-prompt jitter so that residuals are non-zero.
    fn balanced_trials() -> Vec<Trial> {
        let mut trials = Vec::new();
        for difficulty in Difficulty::ALL {
            let hard = if difficulty == Difficulty::Hard { 1.0 } else { 0.0 };
            for (i, jitter) in [-1.0, 1.0, -0.5, 0.5].into_iter().enumerate() {
                let prompt = format!("{difficulty}-{i}");
                let off = 40.0 - 10.0 * hard + jitter;
                let auto = off + 5.0 + 2.0 * hard;
                trials.push(trial(&prompt, difficulty, Condition::Auto, auto));
                trials.push(trial(&prompt, difficulty, Condition::Off, off));
            }
        }
        trials
    }

    #[test]
    fn test_recovers_cell_structure() {
        let table = PairedTable::build(&balanced_trials(), Metric::Wpm);
        let model = FactorialModel::fit(&table);
        let fit = model.fit.as_ref().unwrap();
        assert_eq!(fit.n_obs, 16);

        let expected = [("Intercept", 40.0), ("cond_coded", 5.0), ("hard_coded", -10.0), ("interaction", 2.0)];
        for (name, value) in expected {
            let coef = fit.coefficient(name).unwrap();
            assert!((coef.estimate - value).abs() < 1e-9, "{name}: {}", coef.estimate);
        }

        assert!((model.cell_mean(Difficulty::Easy, Condition::Off).unwrap() - 40.0).abs() < 1e-12);
        assert!((model.cell_mean(Difficulty::Hard, Condition::Auto).unwrap() - 37.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_difficulty_fits_with_aliased_terms() {
        let trials = balanced_trials()
            .into_iter()
            .filter(|t| t.prompt_type == Difficulty::Easy)
            .collect::<Vec<_>>();
        let model = FactorialModel::fit(&PairedTable::build(&trials, Metric::Wpm));
        let fit = model.fit.as_ref().unwrap();
        assert_eq!(fit.rank, 2);
        assert_eq!(fit.df_model, 1);

        let expected = [("Intercept", 40.0), ("cond_coded", 5.0), ("hard_coded", 0.0), ("interaction", 0.0)];
        for (name, value) in expected {
            let coef = fit.coefficient(name).unwrap();
            assert!((coef.estimate - value).abs() < 1e-9, "{name}: {}", coef.estimate);
        }

        let summary = model.summary().to_string();
        assert!(summary.starts_with(&format!("{:^RULE_WIDTH$}", "OLS Regression Results")));
        assert!(summary.ends_with("aliased coefficients are minimum-norm estimates."));
        assert!(summary.contains("rank 2 of 4 columns"));
        assert_eq!(model.cell_mean(Difficulty::Hard, Condition::Auto), None);
        assert!(model.means_table().to_string().contains("NaN"));
    }

    #[test]
    fn test_too_few_pairs_is_not_estimable() {
        let trials = [
            trial("a", Difficulty::Easy, Condition::Auto, 1.0),
            trial("a", Difficulty::Easy, Condition::Off, 2.0),
            trial("b", Difficulty::Hard, Condition::Auto, 3.0),
            trial("b", Difficulty::Hard, Condition::Off, 4.0),
        ];
        let model = FactorialModel::fit(&PairedTable::build(&trials, Metric::Cer));
        assert!(matches!(model.fit, Err(OlsError::TooFewObservations { .. })));
        assert!(model.summary().to_string().starts_with("Model not estimable"));
    }

    #[test]
    fn test_rendered_tables() {
        let model = FactorialModel::fit(&PairedTable::build(&balanced_trials(), Metric::Wpm));
        let summary = model.summary().to_string();
        assert!(summary.contains("OLS Regression Results"));
        assert!(summary.contains("Dep. Variable:"));
        assert!(summary.contains("interaction"));
        assert!(summary.contains("R-squared:"));
        assert!(!summary.contains("Notes:"));

        let means = model.means_table().to_string();
        let lines = means.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "EASY           45.000   40.000");
        assert_eq!(lines[3], "HARD           37.000   30.000");
    }
}
