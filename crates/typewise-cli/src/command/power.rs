use std::path::PathBuf;

use anyhow::Context;
use typewise_stats::power::PairedTTestPower;

use crate::plot;

/// Assumed within-subject effect size (Cohen's dz).
pub(crate) const DEFAULT_EFFECT_SIZE: f64 = 0.25;
const DEFAULT_ALPHA: f64 = 0.05;
const DEFAULT_TARGET_POWER: f64 = 0.80;
const DEFAULT_OUTPUT: &str = "figures/power_curve.png";

const CURVE_START: u32 = 20;
const CURVE_END: u32 = 300;
const CURVE_STEP: usize = 5;

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub(crate) struct PowerArg {
    /// Assumed effect size (Cohen's dz)
    #[arg(long, default_value_t = DEFAULT_EFFECT_SIZE)]
    pub effect_size: f64,
    /// Two-sided significance level
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,
    /// Target power
    #[arg(long, default_value_t = DEFAULT_TARGET_POWER)]
    pub power: f64,
    /// Output path of the power curve figure
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
    /// Skip drawing the power curve figure
    #[arg(long)]
    pub no_plot: bool,
}

impl Default for PowerArg {
    fn default() -> Self {
        Self {
            effect_size: DEFAULT_EFFECT_SIZE,
            alpha: DEFAULT_ALPHA,
            power: DEFAULT_TARGET_POWER,
            output: PathBuf::from(DEFAULT_OUTPUT),
            no_plot: false,
        }
    }
}

/// Sample sizes swept for the power curve.
fn curve_sample_sizes() -> impl Iterator<Item = f64> {
    (CURVE_START..CURVE_END).step_by(CURVE_STEP).map(f64::from)
}

pub(crate) fn run(arg: &PowerArg) -> anyhow::Result<()> {
    let PowerArg {
        effect_size,
        alpha,
        power,
        output,
        no_plot,
    } = arg;

    let analysis = PairedTTestPower::new(*alpha)?;
    let n_required = analysis
        .solve_sample_size(*effect_size, *power)
        .context("Failed to solve for the required sample size")?;
    println!(
        "Assumed effect size dz={effect_size:.2} -> required paired prompts ≈ {n_required:.1} (≈ {:.0} trials total)",
        (n_required * 2.0).floor()
    );

    let curve = analysis.power_curve(*effect_size, curve_sample_sizes());
    println!();
    println!("{:>8}  {:>6}", "n_pairs", "power");
    for (n, p) in &curve {
        println!("{n:>8.0}  {p:>6.4}");
    }

    if !*no_plot {
        plot::power_curve(output, &curve, *effect_size, *power)
            .with_context(|| format!("Failed to draw power curve: {}", output.display()))?;
        eprintln!("[ok] Power curve saved -> {}", output.display());
    }

    Ok(())
}
