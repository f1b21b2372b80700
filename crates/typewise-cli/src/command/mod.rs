use clap::{Parser, Subcommand};

use self::{analyze::AnalyzeArg, power::PowerArg};

mod analyze;
mod power;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Clean the latest trial log, compare AUTO against OFF and draw figures
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Estimate the number of paired prompts needed for a target power
    Power(#[clap(flatten)] PowerArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Analyze(AnalyzeArg::default())) {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Power(arg) => power::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_subcommand_defaults() {
        let args = CommandArgs::try_parse_from(["typewise", "power"]).unwrap();
        let Some(Mode::Power(arg)) = args.mode else {
            panic!("expected power mode");
        };
        assert_eq!(arg, PowerArg::default());

        let args = CommandArgs::try_parse_from(["typewise", "analyze"]).unwrap();
        let Some(Mode::Analyze(arg)) = args.mode else {
            panic!("expected analyze mode");
        };
        assert_eq!(arg, AnalyzeArg::default());

        let args = CommandArgs::try_parse_from(["typewise"]).unwrap();
        assert!(args.mode.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = CommandArgs::try_parse_from([
            "typewise",
            "analyze",
            "--root",
            "study",
            "--cleaning",
            "zscore",
            "--z-threshold",
            "2.5",
        ])
        .unwrap();
        let Some(Mode::Analyze(arg)) = args.mode else {
            panic!("expected analyze mode");
        };
        assert_eq!(
            arg.cleaning_policy(),
            typewise_analysis::clean::CleaningPolicy::ZScore { threshold: 2.5 }
        );

        let args =
            CommandArgs::try_parse_from(["typewise", "power", "--effect-size", "0.27", "--no-plot"])
                .unwrap();
        let Some(Mode::Power(arg)) = args.mode else {
            panic!("expected power mode");
        };
        assert!((arg.effect_size - 0.27).abs() < f64::EPSILON);
        assert!(arg.no_plot);
    }
}
