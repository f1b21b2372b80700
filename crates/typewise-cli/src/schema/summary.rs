use std::path::{Path, PathBuf};

use serde::Serialize;
use typewise_analysis::{
    clean::{CleanedTrials, CleaningPolicy},
    comparison::{Comparison, Scope},
    factorial::FactorialModel,
    report::AnalysisReport,
    trial::{Condition, Difficulty},
};
use typewise_stats::{paired::PairedTTest, regression::Coefficient};

/// Machine-readable summary of one `analyze` run.
///
/// Non-finite statistics (for example `t` of zero-variance differences)
/// are written as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    /// Trial log the analysis was computed from
    pub input: PathBuf,
    /// Outlier handling applied during cleaning
    pub cleaning: String,
    pub rows: RowCounts,
    /// Trials per difficulty x condition cell after cleaning
    pub cells: Vec<CellCount>,
    /// Overall comparisons first, then per-difficulty comparisons
    pub comparisons: Vec<ComparisonSummary>,
    pub models: Vec<ModelSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowCounts {
    pub raw: usize,
    pub incomplete: usize,
    pub outliers: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellCount {
    pub prompt_type: Difficulty,
    pub condition: Condition,
    pub trials: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    pub metric: &'static str,
    /// `overall`, `EASY` or `HARD`
    pub scope: &'static str,
    /// `None` when there were fewer than two pairs
    pub test: Option<TestSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestSummary {
    pub n: usize,
    pub mean_auto: f64,
    pub mean_off: f64,
    pub mean_diff: f64,
    pub t: f64,
    pub p: f64,
    pub dz: f64,
    pub ci: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub metric: &'static str,
    /// `None` when the model could not be estimated; see `note`
    pub fit: Option<FitSummary>,
    pub note: Option<String>,
    pub cell_means: Vec<CellMean>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitSummary {
    pub n_obs: usize,
    /// Below the number of coefficients when some terms are aliased
    pub rank: usize,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub coefficients: Vec<CoefficientSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoefficientSummary {
    pub name: String,
    pub estimate: f64,
    pub std_err: f64,
    pub t: f64,
    pub p: f64,
    pub ci: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct CellMean {
    pub prompt_type: Difficulty,
    pub condition: Condition,
    pub mean: f64,
}

impl AnalysisSummary {
    pub fn new(
        input: &Path,
        policy: CleaningPolicy,
        cleaned: &CleanedTrials,
        report: &AnalysisReport,
    ) -> Self {
        let cells = cleaned
            .cell_counts()
            .counts
            .into_iter()
            .map(|((prompt_type, condition), trials)| CellCount {
                prompt_type,
                condition,
                trials,
            })
            .collect();

        Self {
            input: input.to_owned(),
            cleaning: policy.to_string(),
            rows: RowCounts {
                raw: cleaned.raw_count,
                incomplete: cleaned.incomplete_count,
                outliers: cleaned.outlier_count,
                kept: cleaned.trials.len(),
            },
            cells,
            comparisons: report
                .overall
                .iter()
                .chain(&report.within)
                .map(ComparisonSummary::from)
                .collect(),
            models: report.models.iter().map(ModelSummary::from).collect(),
        }
    }
}

impl From<&Comparison> for ComparisonSummary {
    fn from(comparison: &Comparison) -> Self {
        Self {
            metric: comparison.metric.column(),
            scope: match comparison.scope {
                Scope::Overall => "overall",
                Scope::Within(difficulty) => difficulty.as_str(),
            },
            test: comparison.test.as_ref().map(TestSummary::from),
        }
    }
}

impl From<&PairedTTest> for TestSummary {
    fn from(test: &PairedTTest) -> Self {
        Self {
            n: test.n,
            mean_auto: test.mean_a,
            mean_off: test.mean_b,
            mean_diff: test.mean_diff,
            t: test.t,
            p: test.p,
            dz: test.dz,
            ci: [test.ci.0, test.ci.1],
        }
    }
}

impl From<&Coefficient> for CoefficientSummary {
    fn from(coef: &Coefficient) -> Self {
        Self {
            name: coef.name.clone(),
            estimate: coef.estimate,
            std_err: coef.std_err,
            t: coef.t,
            p: coef.p,
            ci: [coef.ci.0, coef.ci.1],
        }
    }
}

impl From<&FactorialModel> for ModelSummary {
    fn from(model: &FactorialModel) -> Self {
        let (fit, note) = match &model.fit {
            Ok(fit) => (
                Some(FitSummary {
                    n_obs: fit.n_obs,
                    rank: fit.rank,
                    r_squared: fit.r_squared,
                    adj_r_squared: fit.adj_r_squared,
                    f_statistic: fit.f_statistic,
                    f_p_value: fit.f_p_value,
                    log_likelihood: fit.log_likelihood,
                    aic: fit.aic,
                    bic: fit.bic,
                    coefficients: fit.coefficients.iter().map(CoefficientSummary::from).collect(),
                }),
                None,
            ),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            metric: model.metric.column(),
            fit,
            note,
            cell_means: model
                .cell_means
                .iter()
                .map(|(&(prompt_type, condition), &mean)| CellMean {
                    prompt_type,
                    condition,
                    mean,
                })
                .collect(),
        }
    }
}
