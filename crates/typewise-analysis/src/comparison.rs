//! AUTO vs OFF comparisons for one metric within one scope

use std::fmt;

use typewise_stats::paired::PairedTTest;

use crate::{
    pair::PairedTable,
    trial::{Difficulty, Metric},
};

/// Subset of pairs a comparison is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Overall,
    Within(Difficulty),
}

impl Scope {
    #[must_use]
    pub fn difficulty(self) -> Option<Difficulty> {
        match self {
            Scope::Overall => None,
            Scope::Within(difficulty) => Some(difficulty),
        }
    }
}

/// Paired t-test of AUTO against OFF.
///
/// `test` is `None` when the scope has fewer than two pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub metric: Metric,
    pub scope: Scope,
    pub test: Option<PairedTTest>,
}

impl Comparison {
    #[must_use]
    pub fn new(table: &PairedTable, scope: Scope) -> Self {
        Self {
            metric: table.metric(),
            scope,
            test: PairedTTest::new(table.values(scope.difficulty())),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.metric.label();
        match (self.scope, &self.test) {
            (Scope::Overall, None) => write!(f, "== {label}: insufficient pairs =="),
            (Scope::Within(d), None) => write!(f, "== {label} {d}: insufficient pairs =="),
            (Scope::Overall, Some(test)) => {
                writeln!(f, "== {label} (AUTO - OFF) overall ==")?;
                writeln!(
                    f,
                    "n={}, mean_auto={:.3}, mean_off={:.3}",
                    test.n, test.mean_a, test.mean_b
                )?;
                write!(
                    f,
                    "mean_diff={:.3}, t={:.3}, p={:.4}, dz={:.3}, 95% CI [{:.3}, {:.3}]",
                    test.mean_diff, test.t, test.p, test.dz, test.ci.0, test.ci.1
                )
            }
            (Scope::Within(d), Some(test)) => {
                writeln!(f, "== {label} {d} (AUTO - OFF) ==")?;
                write!(
                    f,
                    "n={}, mean_diff={:.3}, t={:.3}, p={:.4}, dz={:.3}, CI [{:.3}, {:.3}]",
                    test.n, test.mean_diff, test.t, test.p, test.dz, test.ci.0, test.ci.1
                )
            }
        }
    }
}
